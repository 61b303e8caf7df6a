use crate::core::group::Group;
use crate::core::participant::ParticipantId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Balances below this magnitude are treated as settled.
pub const BALANCE_EPSILON: Decimal = dec!(0.01);

/// Net position of every participant in a group, in the group's base
/// currency.
///
/// A positive balance means the participant is owed money by the group.
/// A negative balance means they owe.
///
/// Entries keep the group's participant insertion order: the settlement
/// planner's tie-break is "first in this order", so the order is part of
/// the contract, not an implementation detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    entries: Vec<(ParticipantId, Decimal)>,
}

impl BalanceSheet {
    /// Fold a group's full expense sequence into net balances.
    ///
    /// For each expense the payer is credited the full total, then every
    /// split participant is debited their split amount. A payer who is
    /// also a beneficiary is debited too and nets to their fair share.
    /// Expense order does not affect the result.
    pub fn from_group(group: &Group) -> Self {
        let mut entries: Vec<(ParticipantId, Decimal)> = group
            .participant_ids()
            .into_iter()
            .map(|id| (id, Decimal::ZERO))
            .collect();
        let index: HashMap<ParticipantId, usize> = entries
            .iter()
            .enumerate()
            .map(|(i, (id, _))| (id.clone(), i))
            .collect();

        for expense in group.expenses() {
            if let Some(&i) = index.get(expense.paid_by()) {
                entries[i].1 += expense.total_amount();
            }
            for split in expense.splits() {
                if let Some(&i) = index.get(split.participant_id()) {
                    entries[i].1 -= split.amount();
                }
            }
        }

        for (_, balance) in &mut entries {
            *balance = balance.round_dp(2);
        }
        Self { entries }
    }

    fn credit(&mut self, id: &ParticipantId, amount: Decimal) {
        match self.entries.iter_mut().find(|(p, _)| p == id) {
            Some((_, balance)) => *balance += amount,
            None => self.entries.push((id.clone(), amount)),
        }
    }

    /// The net balance of a participant (zero if unknown).
    pub fn balance(&self, id: &ParticipantId) -> Decimal {
        self.entries
            .iter()
            .find(|(p, _)| p == id)
            .map(|(_, b)| *b)
            .unwrap_or(Decimal::ZERO)
    }

    /// All entries in participant insertion order.
    pub fn entries(&self) -> &[(ParticipantId, Decimal)] {
        &self.entries
    }

    /// Whether credits and debits cancel: the sum of all balances is
    /// within the rounding tolerance of zero. Holds for every balance
    /// sheet built by [`BalanceSheet::from_group`]; callers constructing
    /// vectors by other means must check it before planning settlements.
    pub fn is_conserved(&self) -> bool {
        let sum: Decimal = self.entries.iter().map(|(_, b)| *b).sum();
        sum.abs() <= BALANCE_EPSILON
    }

    /// Total amount owed to creditors (sum of positive balances).
    pub fn total_owed(&self) -> Decimal {
        self.entries
            .iter()
            .map(|(_, b)| *b)
            .filter(|b| *b > Decimal::ZERO)
            .sum()
    }

    /// Number of participants with a balance of at least the epsilon in
    /// absolute value.
    pub fn open_positions(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, b)| b.abs() >= BALANCE_EPSILON)
            .count()
    }

    /// Move `amount` from debtor to creditor: the debtor's balance rises
    /// toward zero, the creditor's falls toward zero.
    pub fn apply_transfer(&mut self, from: &ParticipantId, to: &ParticipantId, amount: Decimal) {
        self.credit(from, amount);
        self.credit(to, -amount);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
