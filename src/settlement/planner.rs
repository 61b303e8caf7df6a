use crate::core::currency::CurrencyCode;
use crate::core::participant::ParticipantId;
use crate::settlement::balance::{BalanceSheet, BALANCE_EPSILON};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single peer-to-peer payment: `from` pays `to`.
///
/// A computed output, recomputed fresh from current balances on every
/// request — never stored, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Decimal,
    pub currency: CurrencyCode,
}

/// The ordered transfer sequence that settles a balance sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPlan {
    transfers: Vec<Settlement>,
    currency: CurrencyCode,
    /// Sum of all transfer amounts.
    total_transferred: Decimal,
}

impl SettlementPlan {
    /// The transfers, in the order they were matched.
    pub fn transfers(&self) -> &[Settlement] {
        &self.transfers
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// Total money moved by the plan.
    pub fn total_transferred(&self) -> Decimal {
        self.total_transferred
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }

    /// True when no payments are needed.
    pub fn is_settled(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Verify the plan against a balance sheet: applying every transfer
    /// must leave all balances within the rounding tolerance of zero.
    pub fn settles(&self, sheet: &BalanceSheet) -> bool {
        let mut working = sheet.clone();
        for t in &self.transfers {
            working.apply_transfer(&t.from, &t.to, t.amount);
        }
        working
            .entries()
            .iter()
            .all(|(_, b)| b.abs() < BALANCE_EPSILON)
    }
}

impl fmt::Display for SettlementPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.transfers.is_empty() {
            return writeln!(f, "All settled! No payments needed.");
        }
        writeln!(f, "Settlements needed:")?;
        writeln!(f)?;
        for (i, t) in self.transfers.iter().enumerate() {
            writeln!(
                f,
                "  {}. {} pays {}: {:.2} {}",
                i + 1,
                t.from,
                t.to,
                t.amount,
                t.currency
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Total transactions: {}", self.transfers.len())
    }
}

/// Greedy minimum-transaction settlement planner.
///
/// Repeatedly matches the largest creditor with the largest debtor until
/// every balance is within the rounding tolerance of zero.
pub struct SettlementPlanner;

impl SettlementPlanner {
    /// Compute the transfer plan for a balance sheet.
    ///
    /// # Algorithm
    ///
    /// 1. Find the maximum balance (largest creditor) and the minimum
    ///    balance (largest debtor). Ties go to the first participant in
    ///    balance-sheet order, so identical inputs produce identical plans.
    /// 2. Stop when both are within 0.01 of zero.
    /// 3. Transfer `min(credit, |debit|)` rounded to 2 decimals from the
    ///    debtor to the creditor; stop if the transfer rounds below 0.01
    ///    (residual dust cannot settle).
    /// 4. Repeat. Each round zeroes the smaller-magnitude side, so at
    ///    most n−1 transfers are emitted for n participants.
    ///
    /// Total over any balance vector whose sum is near zero. Conservation
    /// is the caller's obligation ([`BalanceSheet::is_conserved`]); the
    /// plan for a one-sided vector stops early rather than spinning.
    pub fn plan(sheet: &BalanceSheet, currency: &CurrencyCode) -> SettlementPlan {
        let mut balances: Vec<Decimal> = sheet.entries().iter().map(|(_, b)| *b).collect();
        let ids: Vec<&ParticipantId> = sheet.entries().iter().map(|(id, _)| id).collect();

        let mut transfers = Vec::new();
        let mut total_transferred = Decimal::ZERO;

        while !balances.is_empty() {
            let creditor = index_of_max(&balances);
            let debtor = index_of_min(&balances);
            let max_credit = balances[creditor];
            let max_debit = balances[debtor];

            if max_credit < BALANCE_EPSILON && max_debit.abs() < BALANCE_EPSILON {
                break;
            }
            // One-sided vector: nothing to match against.
            if creditor == debtor {
                break;
            }

            let amount = max_credit.min(max_debit.abs()).round_dp(2);
            if amount < BALANCE_EPSILON {
                break;
            }

            debug!(
                "matching {} (owes {}) -> {} (owed {}), transfer {}",
                ids[debtor], max_debit, ids[creditor], max_credit, amount
            );

            transfers.push(Settlement {
                from: ids[debtor].clone(),
                to: ids[creditor].clone(),
                amount,
                currency: currency.clone(),
            });
            total_transferred += amount;
            balances[creditor] -= amount;
            balances[debtor] += amount;
        }

        SettlementPlan {
            transfers,
            currency: currency.clone(),
            total_transferred,
        }
    }
}

/// Theoretical upper bound on transfers: at most one fewer than the
/// number of participants with a non-zero balance.
pub fn transaction_bound(sheet: &BalanceSheet) -> usize {
    sheet.open_positions().saturating_sub(1)
}

fn index_of_max(balances: &[Decimal]) -> usize {
    let mut best = 0;
    for (i, b) in balances.iter().enumerate() {
        if *b > balances[best] {
            best = i;
        }
    }
    best
}

fn index_of_min(balances: &[Decimal]) -> usize {
    let mut best = 0;
    for (i, b) in balances.iter().enumerate() {
        if *b < balances[best] {
            best = i;
        }
    }
    best
}
