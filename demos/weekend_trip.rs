//! Weekend trip walkthrough.
//!
//! Records a group's expenses under all four split methods, then shows
//! the resulting balances and the minimal settlement plan.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use split_engine::core::currency::CurrencyCode;
use split_engine::core::group::Group;
use split_engine::settlement::balance::BalanceSheet;
use split_engine::settlement::planner::SettlementPlanner;
use split_engine::split::allocator::ExpenseAllocator;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  split-engine: Weekend Trip Walkthrough  ║");
    println!("╚══════════════════════════════════════════╝\n");

    let mut group = Group::new("Trip to Plovdiv", CurrencyCode::new("BGN"));
    let ivan = group.add_participant("Ivan");
    let maria = group.add_participant("Maria");
    let georgi = group.add_participant("Georgi");

    // --- Record expenses ---
    println!("━━━ Expenses ━━━\n");

    ExpenseAllocator::equal(&mut group, "Dinner", dec!(90), ivan.clone(), None, Some("food"))
        .unwrap();
    ExpenseAllocator::percentage(
        &mut group,
        "Hotel",
        dec!(200),
        maria.clone(),
        &[
            (ivan.clone(), dec!(50)),
            (maria.clone(), dec!(25)),
            (georgi.clone(), dec!(25)),
        ],
        Some("lodging"),
    )
    .unwrap();
    ExpenseAllocator::shares(
        &mut group,
        "Pizza",
        dec!(40),
        georgi.clone(),
        &[(ivan.clone(), 2), (maria.clone(), 1), (georgi.clone(), 1)],
        Some("food"),
    )
    .unwrap();
    ExpenseAllocator::custom(
        &mut group,
        "Museum tickets",
        dec!(45),
        ivan.clone(),
        &[
            (ivan.clone(), dec!(15)),
            (maria.clone(), dec!(15)),
            (georgi.clone(), dec!(15)),
        ],
        None,
    )
    .unwrap();

    for expense in group.expenses() {
        let payer = group.participant_by_id(expense.paid_by()).unwrap();
        println!(
            "  [{:<10}] {:<15} {:>8.2} {}  (paid by {})",
            expense.split_method(),
            expense.description(),
            expense.total_amount(),
            expense.currency(),
            payer.name()
        );
    }

    // --- Balances ---
    println!("\n━━━ Balances ━━━\n");

    let sheet = BalanceSheet::from_group(&group);
    for (id, balance) in sheet.entries() {
        let name = group.participant_by_id(id).unwrap().name();
        let status = if *balance > Decimal::ZERO {
            "CREDITOR"
        } else if *balance < Decimal::ZERO {
            "DEBTOR"
        } else {
            "FLAT"
        };
        println!("  {:<10} {:>8.2} {}  [{}]", name, balance, group.base_currency(), status);
    }

    // --- Settlement plan ---
    println!("\n━━━ Settlement Plan ━━━\n");

    let plan = SettlementPlanner::plan(&sheet, group.base_currency());
    if plan.is_settled() {
        println!("  All settled! No payments needed.");
    } else {
        for (i, t) in plan.transfers().iter().enumerate() {
            let from = group.participant_by_id(&t.from).unwrap().name();
            let to = group.participant_by_id(&t.to).unwrap().name();
            println!("  {}. {} pays {}: {:.2} {}", i + 1, from, to, t.amount, t.currency);
        }
        println!("\n  Total transactions: {}", plan.transfer_count());
        println!("  Total transferred:  {:.2} {}", plan.total_transferred(), plan.currency());
    }
}
