use crate::core::error::SplitError;
use crate::core::expense::{Expense, ExpenseSplit, SplitMethod, SplitShare};
use crate::core::group::Group;
use crate::core::participant::ParticipantId;
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Tolerance for caller-supplied sums (percentages against 100, custom
/// amounts against the total).
const SUM_TOLERANCE: Decimal = dec!(0.000001);

/// Tolerance for the computed sum-of-splits invariant.
const ROUNDING_TOLERANCE: Decimal = dec!(0.01);

/// The split allocators.
///
/// Each operation validates its inputs against the group, constructs an
/// expense whose splits sum to the total within the rounding tolerance,
/// and appends it to the group. On failure nothing is appended.
///
/// Rule-specific inputs are ordered slices of pairs, not maps: split order
/// is the caller's order, so allocation output is reproducible.
pub struct ExpenseAllocator;

impl ExpenseAllocator {
    /// Split an expense equally among participants.
    ///
    /// `participants` defaults to the whole group in insertion order.
    ///
    /// Each share is the total divided by the participant count, rounded
    /// to 2 decimals. The rounded shares may not sum exactly to the total;
    /// the signed remainder is added entirely to the FIRST participant in
    /// the list. The recipient of the remainder depends only on list
    /// order, never on amounts, so the exact-sum invariant holds with a
    /// deterministic tie-break.
    pub fn equal(
        group: &mut Group,
        description: impl Into<String>,
        total_amount: Decimal,
        paid_by: ParticipantId,
        participants: Option<&[ParticipantId]>,
        category: Option<&str>,
    ) -> Result<Uuid, SplitError> {
        let ids: Vec<ParticipantId> = match participants {
            Some(ids) => ids.to_vec(),
            None => group.participant_ids(),
        };
        validate_membership(group, total_amount, &paid_by, ids.iter())?;

        let n = Decimal::from(ids.len());
        let per_share = (total_amount / n).round_dp(2);
        let remainder = total_amount - per_share * n;

        let splits: Vec<ExpenseSplit> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let amount = if i == 0 { per_share + remainder } else { per_share };
                ExpenseSplit::new(id.clone(), amount, SplitShare::Equal)
            })
            .collect();

        check_sum_invariant(total_amount, &splits)?;
        Ok(append(
            group,
            description,
            total_amount,
            paid_by,
            SplitMethod::Equal,
            splits,
            category,
        ))
    }

    /// Split an expense by percentages.
    ///
    /// Fails unless the percentages sum to 100 within a 1e-6 tolerance.
    /// Each amount is `total × pct/100` rounded to 2 decimals, with no
    /// remainder correction: the stated percentage is the contract, and
    /// the sum may drift from the total by a cent or so. Accepted, not
    /// corrected.
    pub fn percentage(
        group: &mut Group,
        description: impl Into<String>,
        total_amount: Decimal,
        paid_by: ParticipantId,
        parts: &[(ParticipantId, Decimal)],
        category: Option<&str>,
    ) -> Result<Uuid, SplitError> {
        validate_membership(group, total_amount, &paid_by, parts.iter().map(|(id, _)| id))?;

        let sum: Decimal = parts.iter().map(|(_, pct)| *pct).sum();
        if (sum - dec!(100)).abs() > SUM_TOLERANCE {
            return Err(SplitError::PercentagesDoNotSum { sum });
        }

        let splits: Vec<ExpenseSplit> = parts
            .iter()
            .map(|(id, pct)| {
                let amount = (total_amount * *pct / dec!(100)).round_dp(2);
                ExpenseSplit::new(id.clone(), amount, SplitShare::Percentage(*pct))
            })
            .collect();

        Ok(append(
            group,
            description,
            total_amount,
            paid_by,
            SplitMethod::Percentage,
            splits,
            category,
        ))
    }

    /// Split an expense by integer share counts.
    ///
    /// Each amount is `total × share/total_shares` rounded to 2 decimals.
    /// Same no-remainder-correction policy as percentage splits.
    pub fn shares(
        group: &mut Group,
        description: impl Into<String>,
        total_amount: Decimal,
        paid_by: ParticipantId,
        parts: &[(ParticipantId, u32)],
        category: Option<&str>,
    ) -> Result<Uuid, SplitError> {
        validate_membership(group, total_amount, &paid_by, parts.iter().map(|(id, _)| id))?;

        let total_shares: u32 = parts.iter().map(|(_, s)| *s).sum();
        if total_shares == 0 {
            return Err(SplitError::NoShares);
        }
        let denom = Decimal::from(total_shares);

        let splits: Vec<ExpenseSplit> = parts
            .iter()
            .map(|(id, share)| {
                let amount = (total_amount * Decimal::from(*share) / denom).round_dp(2);
                ExpenseSplit::new(id.clone(), amount, SplitShare::Shares(*share))
            })
            .collect();

        Ok(append(
            group,
            description,
            total_amount,
            paid_by,
            SplitMethod::Shares,
            splits,
            category,
        ))
    }

    /// Split an expense with caller-supplied exact amounts.
    ///
    /// Fails unless the amounts sum to the total within a 1e-6 tolerance:
    /// this is an exact partition stated by the caller, not a computed one.
    pub fn custom(
        group: &mut Group,
        description: impl Into<String>,
        total_amount: Decimal,
        paid_by: ParticipantId,
        parts: &[(ParticipantId, Decimal)],
        category: Option<&str>,
    ) -> Result<Uuid, SplitError> {
        validate_membership(group, total_amount, &paid_by, parts.iter().map(|(id, _)| id))?;

        let sum: Decimal = parts.iter().map(|(_, amt)| *amt).sum();
        if (sum - total_amount).abs() > SUM_TOLERANCE {
            return Err(SplitError::AmountsDoNotSum {
                expected: total_amount,
                actual: sum,
            });
        }

        let splits: Vec<ExpenseSplit> = parts
            .iter()
            .map(|(id, amt)| ExpenseSplit::new(id.clone(), *amt, SplitShare::Custom))
            .collect();

        check_sum_invariant(total_amount, &splits)?;
        Ok(append(
            group,
            description,
            total_amount,
            paid_by,
            SplitMethod::Custom,
            splits,
            category,
        ))
    }
}

/// Reject non-positive totals, empty splits, and ids unknown to the group.
fn validate_membership<'a>(
    group: &Group,
    total_amount: Decimal,
    paid_by: &ParticipantId,
    participants: impl Iterator<Item = &'a ParticipantId>,
) -> Result<(), SplitError> {
    if total_amount <= Decimal::ZERO {
        return Err(SplitError::NonPositiveTotal {
            amount: total_amount,
        });
    }
    if !group.contains(paid_by) {
        return Err(SplitError::UnknownParticipant {
            id: paid_by.clone(),
        });
    }
    let mut any = false;
    for id in participants {
        any = true;
        if !group.contains(id) {
            return Err(SplitError::UnknownParticipant { id: id.clone() });
        }
    }
    if !any {
        return Err(SplitError::EmptySplit);
    }
    Ok(())
}

/// Defense check for splits that must sum exactly: equal (after remainder
/// placement) and custom (after the caller's partition was accepted).
fn check_sum_invariant(total_amount: Decimal, splits: &[ExpenseSplit]) -> Result<(), SplitError> {
    let sum: Decimal = splits.iter().map(|s| s.amount()).sum();
    if (sum - total_amount).abs() > ROUNDING_TOLERANCE {
        return Err(SplitError::SumInvariantBroken {
            total: total_amount,
            sum,
        });
    }
    Ok(())
}

fn append(
    group: &mut Group,
    description: impl Into<String>,
    total_amount: Decimal,
    paid_by: ParticipantId,
    method: SplitMethod,
    splits: Vec<ExpenseSplit>,
    category: Option<&str>,
) -> Uuid {
    let mut expense = Expense::new(
        description,
        total_amount,
        paid_by,
        group.base_currency().clone(),
        method,
        splits,
    );
    if let Some(category) = category {
        expense = expense.with_category(category);
    }
    let id = expense.id();
    debug!(
        "recorded {} expense \"{}\" ({} {}) over {} splits",
        method,
        expense.description(),
        expense.total_amount(),
        expense.currency(),
        expense.splits().len()
    );
    group.push_expense(expense);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCode;
    use rust_decimal_macros::dec;

    fn trio() -> (Group, ParticipantId, ParticipantId, ParticipantId) {
        let mut g = Group::new("Test Group", CurrencyCode::new("BGN"));
        let p1 = g.add_participant("Ivan");
        let p2 = g.add_participant("Maria");
        let p3 = g.add_participant("Georgi");
        (g, p1, p2, p3)
    }

    #[test]
    fn test_equal_split_even_division() {
        let (mut g, p1, _, _) = trio();
        ExpenseAllocator::equal(&mut g, "Dinner", dec!(90), p1, None, None).unwrap();

        let expense = &g.expenses()[0];
        assert_eq!(expense.split_method(), SplitMethod::Equal);
        assert_eq!(expense.splits().len(), 3);
        for split in expense.splits() {
            assert_eq!(split.amount(), dec!(30));
        }
    }

    #[test]
    fn test_equal_split_remainder_goes_to_first() {
        let (mut g, p1, _, _) = trio();
        ExpenseAllocator::equal(&mut g, "Groceries", dec!(100), p1, None, None).unwrap();

        let amounts: Vec<Decimal> = g.expenses()[0].splits().iter().map(|s| s.amount()).collect();
        assert_eq!(amounts, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
        assert_eq!(g.expenses()[0].split_total(), dec!(100));
    }

    #[test]
    fn test_equal_split_single_participant() {
        let (mut g, p1, _, _) = trio();
        let subset = vec![p1.clone()];
        ExpenseAllocator::equal(&mut g, "Solo coffee", dec!(3.7), p1, Some(&subset), None)
            .unwrap();
        assert_eq!(g.expenses()[0].split_total(), dec!(3.7));
        assert_eq!(g.expenses()[0].splits().len(), 1);
    }

    #[test]
    fn test_equal_split_subset_of_group() {
        let (mut g, p1, p2, _) = trio();
        let subset = vec![p2.clone(), p1.clone()];
        ExpenseAllocator::equal(&mut g, "Taxi", dec!(25), p1, Some(&subset), None).unwrap();

        let expense = &g.expenses()[0];
        assert_eq!(expense.splits().len(), 2);
        // Remainder tie-break follows the caller's order: p2 listed first.
        assert_eq!(expense.splits()[0].participant_id(), &p2);
    }

    #[test]
    fn test_percentage_split() {
        let (mut g, p1, p2, p3) = trio();
        let parts = vec![
            (p1.clone(), dec!(50)),
            (p2.clone(), dec!(30)),
            (p3.clone(), dec!(20)),
        ];
        ExpenseAllocator::percentage(&mut g, "Hotel", dec!(100), p1, &parts, None).unwrap();

        let expense = &g.expenses()[0];
        assert_eq!(expense.split_method(), SplitMethod::Percentage);
        let amounts: Vec<Decimal> = expense.splits().iter().map(|s| s.amount()).collect();
        assert_eq!(amounts, vec![dec!(50.00), dec!(30.00), dec!(20.00)]);
        assert_eq!(expense.splits()[1].share(), SplitShare::Percentage(dec!(30)));
    }

    #[test]
    fn test_percentage_split_under_100_rejected() {
        let (mut g, p1, p2, _) = trio();
        let parts = vec![(p1.clone(), dec!(50)), (p2.clone(), dec!(30))];
        let err = ExpenseAllocator::percentage(&mut g, "Hotel", dec!(100), p1, &parts, None)
            .unwrap_err();
        assert!(matches!(err, SplitError::PercentagesDoNotSum { sum } if sum == dec!(80)));
        // Nothing appended on failure.
        assert!(g.expenses().is_empty());
    }

    #[test]
    fn test_percentage_split_99_99_and_100_01_rejected() {
        let (mut g, p1, p2, _) = trio();
        for (a, b) in [(dec!(49.99), dec!(50)), (dec!(50.01), dec!(50))] {
            let parts = vec![(p1.clone(), a), (p2.clone(), b)];
            let result =
                ExpenseAllocator::percentage(&mut g, "Hotel", dec!(100), p1.clone(), &parts, None);
            assert!(result.is_err());
        }
        assert!(g.expenses().is_empty());
    }

    #[test]
    fn test_percentage_drift_is_accepted() {
        let (mut g, p1, p2, p3) = trio();
        // Three thirds round down to 33.33 each: sums to 99.99, not 100.
        let third = Decimal::from(100) / Decimal::from(3);
        let parts = vec![
            (p1.clone(), third),
            (p2.clone(), third),
            (p3.clone(), third),
        ];
        ExpenseAllocator::percentage(&mut g, "Rent", dec!(100), p1, &parts, None).unwrap();
        assert_eq!(g.expenses()[0].split_total(), dec!(99.99));
    }

    #[test]
    fn test_shares_split() {
        let (mut g, p1, p2, p3) = trio();
        let parts = vec![(p1.clone(), 2u32), (p2.clone(), 1), (p3.clone(), 1)];
        ExpenseAllocator::shares(&mut g, "Pizza", dec!(40), p2, &parts, None).unwrap();

        let expense = &g.expenses()[0];
        assert_eq!(expense.split_method(), SplitMethod::Shares);
        let amounts: Vec<Decimal> = expense.splits().iter().map(|s| s.amount()).collect();
        assert_eq!(amounts, vec![dec!(20.00), dec!(10.00), dec!(10.00)]);
        assert_eq!(expense.splits()[0].share(), SplitShare::Shares(2));
    }

    #[test]
    fn test_shares_split_zero_total_shares_rejected() {
        let (mut g, p1, p2, _) = trio();
        let parts = vec![(p1.clone(), 0u32), (p2.clone(), 0)];
        let err = ExpenseAllocator::shares(&mut g, "Pizza", dec!(40), p1, &parts, None)
            .unwrap_err();
        assert!(matches!(err, SplitError::NoShares));
    }

    #[test]
    fn test_custom_split() {
        let (mut g, p1, p2, p3) = trio();
        let parts = vec![
            (p1.clone(), dec!(50)),
            (p2.clone(), dec!(30)),
            (p3.clone(), dec!(20)),
        ];
        ExpenseAllocator::custom(&mut g, "Tickets", dec!(100), p1, &parts, None).unwrap();
        assert_eq!(g.expenses()[0].split_total(), dec!(100));
        assert_eq!(g.expenses()[0].splits()[2].share(), SplitShare::Custom);
    }

    #[test]
    fn test_custom_split_wrong_total_rejected() {
        let (mut g, p1, p2, p3) = trio();
        // Declared total 90, amounts sum to 100.
        let parts = vec![
            (p1.clone(), dec!(50)),
            (p2.clone(), dec!(30)),
            (p3.clone(), dec!(20)),
        ];
        let err =
            ExpenseAllocator::custom(&mut g, "Tickets", dec!(90), p1, &parts, None).unwrap_err();
        assert!(matches!(
            err,
            SplitError::AmountsDoNotSum { expected, actual }
                if expected == dec!(90) && actual == dec!(100)
        ));
        assert!(g.expenses().is_empty());
    }

    #[test]
    fn test_unknown_payer_rejected() {
        let (mut g, _, _, _) = trio();
        let stranger = ParticipantId::new("stranger");
        let err =
            ExpenseAllocator::equal(&mut g, "Dinner", dec!(30), stranger.clone(), None, None)
                .unwrap_err();
        assert!(matches!(err, SplitError::UnknownParticipant { id } if id == stranger));
    }

    #[test]
    fn test_unknown_split_participant_rejected() {
        let (mut g, p1, _, _) = trio();
        let stranger = ParticipantId::new("stranger");
        let parts = vec![(p1.clone(), dec!(50)), (stranger.clone(), dec!(50))];
        let err = ExpenseAllocator::percentage(&mut g, "Hotel", dec!(100), p1, &parts, None)
            .unwrap_err();
        assert!(matches!(err, SplitError::UnknownParticipant { id } if id == stranger));
        assert!(g.expenses().is_empty());
    }

    #[test]
    fn test_non_positive_total_rejected() {
        let (mut g, p1, _, _) = trio();
        let err = ExpenseAllocator::equal(&mut g, "Nothing", Decimal::ZERO, p1, None, None)
            .unwrap_err();
        assert!(matches!(err, SplitError::NonPositiveTotal { .. }));
    }

    #[test]
    fn test_empty_participant_list_rejected() {
        let (mut g, p1, _, _) = trio();
        let err = ExpenseAllocator::equal(&mut g, "Dinner", dec!(30), p1, Some(&[]), None)
            .unwrap_err();
        assert!(matches!(err, SplitError::EmptySplit));
    }

    #[test]
    fn test_category_is_attached() {
        let (mut g, p1, _, _) = trio();
        ExpenseAllocator::equal(&mut g, "Dinner", dec!(90), p1, None, Some("food")).unwrap();
        assert_eq!(g.expenses()[0].category(), Some("food"));
    }
}
