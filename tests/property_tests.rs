use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use split_engine::core::currency::CurrencyCode;
use split_engine::core::group::Group;
use split_engine::core::participant::ParticipantId;
use split_engine::settlement::balance::BalanceSheet;
use split_engine::settlement::planner::{transaction_bound, SettlementPlanner};
use split_engine::split::allocator::ExpenseAllocator;

/// Build a group with `n` named participants.
fn make_group(n: usize) -> (Group, Vec<ParticipantId>) {
    let mut group = Group::new("prop-group", CurrencyCode::new("BGN"));
    let names = ["Ana", "Boris", "Christo", "Dara", "Elena", "Filip", "Gergana", "Hristo"];
    let ids = (0..n)
        .map(|i| group.add_participant(names[i % names.len()]))
        .collect();
    (group, ids)
}

/// Generate a positive 2-decimal amount (1.00 to 10,000.00).
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (100i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// One recorded expense: payer index, amount, and whether it is an
/// equal split over the whole group or a two-way custom partition.
fn arb_expense() -> impl Strategy<Value = (usize, Decimal, bool)> {
    (0usize..6, arb_amount(), any::<bool>())
}

/// Record a generated expense sequence into a 6-person group.
fn record_expenses(expenses: &[(usize, Decimal, bool)]) -> Group {
    let (mut group, ids) = make_group(6);
    for (i, (payer, amount, equal)) in expenses.iter().enumerate() {
        let payer = ids[*payer].clone();
        if *equal {
            ExpenseAllocator::equal(&mut group, format!("e{}", i), *amount, payer, None, None)
                .unwrap();
        } else {
            // Exact two-way partition: cents split down the middle.
            let half = (*amount / Decimal::from(2)).round_dp(2);
            let parts = vec![
                (ids[0].clone(), half),
                (ids[1].clone(), *amount - half),
            ];
            ExpenseAllocator::custom(&mut group, format!("e{}", i), *amount, payer, &parts, None)
                .unwrap();
        }
    }
    group
}

proptest! {
    // ===================================================================
    // INVARIANT 1: Equal splits sum exactly to the total.
    //
    // For any 2-decimal total and any group size, the rounded shares
    // plus the remainder assigned to the first participant reproduce
    // the total exactly.
    // ===================================================================
    #[test]
    fn equal_split_sums_exactly(total in arb_amount(), n in 1usize..8) {
        let (mut group, ids) = make_group(n);
        ExpenseAllocator::equal(&mut group, "e", total, ids[0].clone(), None, None).unwrap();
        prop_assert_eq!(group.expenses()[0].split_total(), total);
    }

    // ===================================================================
    // INVARIANT 2: Only the first participant absorbs the remainder.
    //
    // Every participant after the first receives exactly the rounded
    // per-share amount.
    // ===================================================================
    #[test]
    fn equal_split_remainder_lands_on_first(total in arb_amount(), n in 2usize..8) {
        let (mut group, ids) = make_group(n);
        ExpenseAllocator::equal(&mut group, "e", total, ids[0].clone(), None, None).unwrap();

        let splits = group.expenses()[0].splits();
        let per_share = (total / Decimal::from(n)).round_dp(2);
        for split in &splits[1..] {
            prop_assert_eq!(split.amount(), per_share);
        }
    }

    // ===================================================================
    // INVARIANT 3: Balances always conserve.
    //
    // For any sequence of exact-partition expenses, the payer credit
    // offsets the debited splits and all balances sum to zero.
    // ===================================================================
    #[test]
    fn balances_always_conserve(expenses in prop::collection::vec(arb_expense(), 1..20)) {
        let group = record_expenses(&expenses);
        let sheet = BalanceSheet::from_group(&group);
        let sum: Decimal = sheet.entries().iter().map(|(_, b)| *b).sum();
        prop_assert_eq!(sum, Decimal::ZERO);
        prop_assert!(sheet.is_conserved());
    }

    // ===================================================================
    // INVARIANT 4: Applying the plan zeroes every balance.
    //
    // After every emitted transfer is applied to the balance vector,
    // no participant is outside the 0.01 tolerance.
    // ===================================================================
    #[test]
    fn settlement_zeroes_all_balances(expenses in prop::collection::vec(arb_expense(), 1..20)) {
        let group = record_expenses(&expenses);
        let sheet = BalanceSheet::from_group(&group);
        let plan = SettlementPlanner::plan(&sheet, group.base_currency());
        prop_assert!(plan.settles(&sheet));
    }

    // ===================================================================
    // INVARIANT 5: The plan never exceeds the transaction bound.
    //
    // At most one fewer transfer than participants with a non-zero
    // balance.
    // ===================================================================
    #[test]
    fn settlement_is_minimal(expenses in prop::collection::vec(arb_expense(), 1..20)) {
        let group = record_expenses(&expenses);
        let sheet = BalanceSheet::from_group(&group);
        let plan = SettlementPlanner::plan(&sheet, group.base_currency());
        prop_assert!(plan.transfer_count() <= transaction_bound(&sheet));
    }

    // ===================================================================
    // INVARIANT 6: Planning is deterministic.
    //
    // The same balance sheet yields the identical transfer sequence
    // every time. No randomness, no hidden state.
    // ===================================================================
    #[test]
    fn planning_is_deterministic(expenses in prop::collection::vec(arb_expense(), 1..20)) {
        let group = record_expenses(&expenses);
        let sheet = BalanceSheet::from_group(&group);
        let first = SettlementPlanner::plan(&sheet, group.base_currency());
        let second = SettlementPlanner::plan(&sheet, group.base_currency());
        prop_assert_eq!(first, second);
    }

    // ===================================================================
    // INVARIANT 7: Percentages must sum to 100.
    //
    // A complementary pair is accepted; any shortfall is rejected.
    // ===================================================================
    #[test]
    fn percentage_sum_is_validated(total in arb_amount(), p in 1u32..99) {
        let (mut group, ids) = make_group(2);
        let pct = Decimal::from(p);

        let good = vec![
            (ids[0].clone(), pct),
            (ids[1].clone(), dec!(100) - pct),
        ];
        prop_assert!(ExpenseAllocator::percentage(
            &mut group, "ok", total, ids[0].clone(), &good, None
        ).is_ok());

        let bad = vec![
            (ids[0].clone(), pct),
            (ids[1].clone(), dec!(99) - pct),
        ];
        prop_assert!(ExpenseAllocator::percentage(
            &mut group, "bad", total, ids[0].clone(), &bad, None
        ).is_err());
    }

    // ===================================================================
    // INVARIANT 8: Custom partitions must match the declared total.
    // ===================================================================
    #[test]
    fn custom_partition_is_validated(a in 100i64..100_000, b in 100i64..100_000) {
        let (mut group, ids) = make_group(2);
        let a = Decimal::new(a, 2);
        let b = Decimal::new(b, 2);
        let parts = vec![(ids[0].clone(), a), (ids[1].clone(), b)];

        prop_assert!(ExpenseAllocator::custom(
            &mut group, "ok", a + b, ids[0].clone(), &parts, None
        ).is_ok());
        prop_assert!(ExpenseAllocator::custom(
            &mut group, "off", a + b + dec!(0.01), ids[0].clone(), &parts, None
        ).is_err());
    }

    // ===================================================================
    // INVARIANT 9: Share splits stay within the rounding tolerance.
    //
    // Two independently rounded shares can drift from the total by at
    // most one cent; the drift is accepted, never corrected.
    // ===================================================================
    #[test]
    fn shares_split_within_tolerance(total in arb_amount(), a in 1u32..10, b in 1u32..10) {
        let (mut group, ids) = make_group(2);
        let parts = vec![(ids[0].clone(), a), (ids[1].clone(), b)];
        ExpenseAllocator::shares(&mut group, "e", total, ids[0].clone(), &parts, None).unwrap();

        let drift = (group.expenses()[0].split_total() - total).abs();
        prop_assert!(drift <= dec!(0.01));
    }
}
