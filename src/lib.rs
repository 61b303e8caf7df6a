//! # split-engine
//!
//! Group expense splitting and minimal-transfer settlement engine.
//!
//! Given a group of participants and a sequence of shared expenses, this
//! engine allocates each expense under one of four split rules, folds the
//! expenses into net balances, and computes a minimal set of peer-to-peer
//! payments that settles all debts.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: participants, currencies, expenses, groups
//! - **split** — The four split allocators (equal, percentage, shares, custom)
//! - **settlement** — Balance aggregation and greedy settlement planning
//! - **simulation** — Random group generation for stress testing

pub mod core;
pub mod settlement;
pub mod simulation;
pub mod split;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::currency::{CurrencyCode, CurrencyConverter, RateTable};
    pub use crate::core::error::SplitError;
    pub use crate::core::expense::{Expense, ExpenseSplit, SplitMethod, SplitShare};
    pub use crate::core::group::Group;
    pub use crate::core::participant::{Participant, ParticipantId};
    pub use crate::settlement::balance::BalanceSheet;
    pub use crate::settlement::planner::{Settlement, SettlementPlan, SettlementPlanner};
    pub use crate::split::allocator::ExpenseAllocator;
}
