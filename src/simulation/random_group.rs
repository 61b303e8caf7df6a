//! Random group generation for stress testing.
//!
//! Builds groups with randomized expenses across all four split methods
//! to exercise aggregation and planning at size.

use crate::core::currency::CurrencyCode;
use crate::core::group::Group;
use crate::split::allocator::ExpenseAllocator;
use rand::Rng;
use rust_decimal::Decimal;

/// Configuration for generating a random expense group.
#[derive(Debug, Clone)]
pub struct GroupConfig {
    /// Number of participants in the group.
    pub participant_count: usize,
    /// Number of expenses to record.
    pub expense_count: usize,
    /// Minimum expense total.
    pub min_amount: Decimal,
    /// Maximum expense total.
    pub max_amount: Decimal,
    /// Base currency for the group.
    pub base_currency: CurrencyCode,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            participant_count: 10,
            expense_count: 30,
            min_amount: Decimal::from(5),
            max_amount: Decimal::from(500),
            base_currency: CurrencyCode::new("BGN"),
        }
    }
}

/// Generate a random group for testing.
///
/// Expenses rotate through the four split methods so generated groups
/// exercise every allocator.
pub fn generate_random_group(config: &GroupConfig) -> Group {
    let mut rng = rand::thread_rng();
    let mut group = Group::new("RANDOM-GROUP", config.base_currency.clone());

    for i in 0..config.participant_count {
        group.add_participant(format!("MEMBER-{:03}", i));
    }
    let ids = group.participant_ids();

    for i in 0..config.expense_count {
        let payer = ids[rng.gen_range(0..ids.len())].clone();

        let min_f64: f64 = config.min_amount.to_string().parse().unwrap_or(5.0);
        let max_f64: f64 = config.max_amount.to_string().parse().unwrap_or(500.0);
        let total = Decimal::from_f64_retain(rng.gen_range(min_f64..max_f64))
            .unwrap_or(Decimal::from(10))
            .round_dp(2);
        if total <= Decimal::ZERO {
            continue;
        }

        let description = format!("EXPENSE-{:03}", i);
        // Two-party splits need at least two members.
        let method = if ids.len() < 2 { 0 } else { i % 4 };
        match method {
            0 => {
                ExpenseAllocator::equal(&mut group, description, total, payer, None, None)
            }
            1 => {
                let a = ids[rng.gen_range(0..ids.len())].clone();
                let mut b = ids[rng.gen_range(0..ids.len())].clone();
                while b == a && ids.len() > 1 {
                    b = ids[rng.gen_range(0..ids.len())].clone();
                }
                let pct = Decimal::from(rng.gen_range(1..100u32));
                let parts = vec![(a, pct), (b, Decimal::from(100) - pct)];
                ExpenseAllocator::percentage(&mut group, description, total, payer, &parts, None)
            }
            2 => {
                let parts: Vec<_> = ids
                    .iter()
                    .map(|id| (id.clone(), rng.gen_range(1..=5u32)))
                    .collect();
                ExpenseAllocator::shares(&mut group, description, total, payer, &parts, None)
            }
            _ => {
                let a = ids[rng.gen_range(0..ids.len())].clone();
                let mut b = ids[rng.gen_range(0..ids.len())].clone();
                while b == a && ids.len() > 1 {
                    b = ids[rng.gen_range(0..ids.len())].clone();
                }
                let first = (total * Decimal::from(rng.gen_range(1..100u32))
                    / Decimal::from(100))
                .round_dp(2);
                let parts = vec![(a, first), (b, total - first)];
                ExpenseAllocator::custom(&mut group, description, total, payer, &parts, None)
            }
        }
        .expect("generated expense inputs are valid");
    }

    group
}
