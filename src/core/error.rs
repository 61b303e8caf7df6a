use crate::core::participant::ParticipantId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the split allocators.
///
/// Every variant is raised synchronously at allocation time, before any
/// expense is appended: a failed allocation leaves the group untouched.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("expense total must be positive, got {amount}")]
    NonPositiveTotal { amount: Decimal },

    #[error("an expense must be split among at least one participant")]
    EmptySplit,

    #[error("participant {id} is not a member of this group")]
    UnknownParticipant { id: ParticipantId },

    #[error("percentages must sum to 100, got {sum}")]
    PercentagesDoNotSum { sum: Decimal },

    #[error("custom amounts must sum to the expense total {expected}, got {actual}")]
    AmountsDoNotSum { expected: Decimal, actual: Decimal },

    #[error("share counts must sum to a positive number")]
    NoShares,

    /// Internal defect surface: the computed splits deviate from the total
    /// beyond the 0.01 tolerance. Should never be observed by callers.
    #[error("split amounts sum to {sum}, expected {total} within 0.01")]
    SumInvariantBroken { total: Decimal, sum: Decimal },
}
