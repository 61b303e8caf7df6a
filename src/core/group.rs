use crate::core::currency::CurrencyCode;
use crate::core::expense::Expense;
use crate::core::participant::{Participant, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A group of people sharing expenses.
///
/// The group is the sole owner of its participant and expense sequences.
/// Participants keep their insertion order (the equal-split remainder rule
/// depends on it); expenses accumulate append-only and are immutable once
/// recorded.
///
/// # Examples
///
/// ```
/// use split_engine::core::currency::CurrencyCode;
/// use split_engine::core::group::Group;
///
/// let mut group = Group::new("Trip to Plovdiv", CurrencyCode::new("BGN"));
/// let ivan = group.add_participant("Ivan");
/// let maria = group.add_participant("Maria");
/// assert_eq!(group.participants().len(), 2);
/// assert_ne!(ivan, maria);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    id: Uuid,
    name: String,
    participants: Vec<Participant>,
    expenses: Vec<Expense>,
    base_currency: CurrencyCode,
    created_at: DateTime<Utc>,
}

impl Group {
    /// Create an empty group.
    pub fn new(name: impl Into<String>, base_currency: CurrencyCode) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            participants: Vec::new(),
            expenses: Vec::new(),
            base_currency,
            created_at: Utc::now(),
        }
    }

    /// Add a new participant and return their generated id.
    pub fn add_participant(&mut self, name: impl Into<String>) -> ParticipantId {
        let participant = Participant::new(name);
        let id = participant.id().clone();
        self.participants.push(participant);
        id
    }

    /// Add a participant with a contact email.
    pub fn add_participant_with_email(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> ParticipantId {
        let participant = Participant::new(name).with_email(email);
        let id = participant.id().clone();
        self.participants.push(participant);
        id
    }

    /// Find a participant by id.
    pub fn participant_by_id(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id() == id)
    }

    /// Find a participant by display name (case-insensitive).
    pub fn participant_by_name(&self, name: &str) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Whether the given id belongs to this group.
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.participant_by_id(id).is_some()
    }

    /// Append an expense. Crate-internal: expenses enter the group only
    /// through the split allocators, which validate them first.
    pub(crate) fn push_expense(&mut self, expense: Expense) {
        self.expenses.push(expense);
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Participants in insertion order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Participant ids in insertion order.
    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id().clone()).collect()
    }

    /// Recorded expenses in insertion order.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn base_currency(&self) -> &CurrencyCode {
        &self.base_currency
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
