//! Balance aggregation and minimum-transaction settlement planning.

pub mod balance;
pub mod planner;
