use crate::core::currency::CurrencyCode;
use crate::core::participant::ParticipantId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The rule used to divide an expense among its participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    Equal,
    Percentage,
    Shares,
    Custom,
}

impl fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SplitMethod::Equal => "equal",
            SplitMethod::Percentage => "percentage",
            SplitMethod::Shares => "shares",
            SplitMethod::Custom => "custom",
        };
        write!(f, "{}", s)
    }
}

/// Method-specific annotation attached to a single split.
///
/// Records how the amount was allocated (the percentage or share count
/// that produced it). Purely informational: downstream components read
/// `ExpenseSplit::amount` and never re-derive it from the annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitShare {
    Equal,
    Percentage(Decimal),
    Shares(u32),
    Custom,
}

/// One participant's owed portion of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    participant_id: ParticipantId,
    /// Owed amount, rounded to 2 decimal places.
    amount: Decimal,
    share: SplitShare,
}

impl ExpenseSplit {
    pub fn new(participant_id: ParticipantId, amount: Decimal, share: SplitShare) -> Self {
        Self {
            participant_id,
            amount: amount.round_dp(2),
            share,
        }
    }

    pub fn participant_id(&self) -> &ParticipantId {
        &self.participant_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn share(&self) -> SplitShare {
        self.share
    }
}

/// A single shared expense within a group.
///
/// Created once by a split allocator and immutable thereafter. The splits
/// cover every intended participant exactly once and sum to `total_amount`
/// within a 0.01 rounding tolerance (exactly, for equal and custom splits).
///
/// # Examples
///
/// ```
/// use split_engine::core::currency::CurrencyCode;
/// use split_engine::core::expense::{Expense, ExpenseSplit, SplitMethod, SplitShare};
/// use split_engine::core::participant::ParticipantId;
/// use rust_decimal_macros::dec;
///
/// let ivan = ParticipantId::new("ivan");
/// let maria = ParticipantId::new("maria");
/// let expense = Expense::new(
///     "Dinner",
///     dec!(60),
///     ivan.clone(),
///     CurrencyCode::new("BGN"),
///     SplitMethod::Equal,
///     vec![
///         ExpenseSplit::new(ivan, dec!(30), SplitShare::Equal),
///         ExpenseSplit::new(maria, dec!(30), SplitShare::Equal),
///     ],
/// );
/// assert_eq!(expense.total_amount(), dec!(60));
/// assert_eq!(expense.splits().len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier for this expense.
    id: Uuid,
    /// What the expense was for.
    description: String,
    /// Total cost. Must be positive.
    total_amount: Decimal,
    /// The participant who paid.
    paid_by: ParticipantId,
    /// Currency of denomination.
    currency: CurrencyCode,
    /// The rule that produced the splits.
    split_method: SplitMethod,
    /// Per-participant owed portions, in allocation order.
    splits: Vec<ExpenseSplit>,
    /// When this expense was recorded.
    date: DateTime<Utc>,
    /// Optional category label.
    category: Option<String>,
}

impl Expense {
    /// Create a new expense.
    ///
    /// # Panics
    ///
    /// Panics if `total_amount` is not positive.
    pub fn new(
        description: impl Into<String>,
        total_amount: Decimal,
        paid_by: ParticipantId,
        currency: CurrencyCode,
        split_method: SplitMethod,
        splits: Vec<ExpenseSplit>,
    ) -> Self {
        assert!(
            total_amount > Decimal::ZERO,
            "Expense total must be positive, got {}",
            total_amount
        );
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            total_amount,
            paid_by,
            currency,
            split_method,
            splits,
            date: Utc::now(),
            category: None,
        }
    }

    /// Set a category label.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn paid_by(&self) -> &ParticipantId {
        &self.paid_by
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn split_method(&self) -> SplitMethod {
        self.split_method
    }

    pub fn splits(&self) -> &[ExpenseSplit] {
        &self.splits
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Sum of all split amounts.
    pub fn split_total(&self) -> Decimal {
        self.splits.iter().map(|s| s.amount()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_expense() -> Expense {
        let ivan = ParticipantId::new("ivan");
        let maria = ParticipantId::new("maria");
        Expense::new(
            "Dinner",
            dec!(60),
            ivan.clone(),
            CurrencyCode::new("BGN"),
            SplitMethod::Equal,
            vec![
                ExpenseSplit::new(ivan, dec!(30), SplitShare::Equal),
                ExpenseSplit::new(maria, dec!(30), SplitShare::Equal),
            ],
        )
    }

    #[test]
    fn test_expense_creation() {
        let e = sample_expense();
        assert_eq!(e.description(), "Dinner");
        assert_eq!(e.total_amount(), dec!(60));
        assert_eq!(e.paid_by().as_str(), "ivan");
        assert_eq!(e.split_method(), SplitMethod::Equal);
        assert_eq!(e.split_total(), dec!(60));
        assert!(e.category().is_none());
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn test_expense_zero_total() {
        Expense::new(
            "Nothing",
            Decimal::ZERO,
            ParticipantId::new("ivan"),
            CurrencyCode::new("BGN"),
            SplitMethod::Equal,
            Vec::new(),
        );
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn test_expense_negative_total() {
        Expense::new(
            "Refund",
            dec!(-10),
            ParticipantId::new("ivan"),
            CurrencyCode::new("BGN"),
            SplitMethod::Equal,
            Vec::new(),
        );
    }

    #[test]
    fn test_split_amount_is_rounded() {
        let split = ExpenseSplit::new(ParticipantId::new("x"), dec!(33.333), SplitShare::Equal);
        assert_eq!(split.amount(), dec!(33.33));
    }

    #[test]
    fn test_category_builder() {
        let e = sample_expense().with_category("food");
        assert_eq!(e.category(), Some("food"));
    }

    #[test]
    fn test_split_method_wire_names() {
        let json = serde_json::to_string(&SplitMethod::Percentage).unwrap();
        assert_eq!(json, "\"percentage\"");
        let back: SplitMethod = serde_json::from_str("\"shares\"").unwrap();
        assert_eq!(back, SplitMethod::Shares);
    }
}
