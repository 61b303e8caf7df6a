//! split-engine CLI
//!
//! Compute balances and settlement plans for an expense group.
//!
//! # Usage
//!
//! ```bash
//! # Show net balances from a group JSON file
//! split-engine balances --input group.json
//!
//! # Compute the settlement plan
//! split-engine settle --input group.json --format json
//!
//! # Generate a random group for testing
//! split-engine generate --participants 10 --expenses 30
//!
//! # Run the scripted walkthrough
//! split-engine demo
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use split_engine::core::currency::CurrencyCode;
use split_engine::core::expense::{SplitMethod, SplitShare};
use split_engine::core::group::Group;
use split_engine::core::participant::ParticipantId;
use split_engine::settlement::balance::BalanceSheet;
use split_engine::settlement::planner::{transaction_bound, SettlementPlanner};
use split_engine::simulation::random_group::{generate_random_group, GroupConfig};
use split_engine::split::allocator::ExpenseAllocator;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"split-engine — group expense splitting and settlement planning

USAGE:
    split-engine <COMMAND> [OPTIONS]

COMMANDS:
    balances    Show each participant's net balance
    settle      Compute the minimal settlement plan
    generate    Generate a random group file (for testing)
    demo        Run a scripted walkthrough
    help        Show this message

OPTIONS (balances, settle):
    --input <FILE>      Path to a group JSON file
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    --participants <N>  Number of participants (default: 10)
    --expenses <N>      Number of expenses (default: 30)
    --currency <CODE>   Base currency (default: BGN)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    split-engine balances --input trip.json
    split-engine settle --input trip.json --format json
    split-engine generate --participants 5 --expenses 20 --output test.json"#
    );
}

/// JSON schema for input groups.
#[derive(serde::Deserialize)]
struct GroupFile {
    group: String,
    #[serde(default = "default_currency")]
    base_currency: String,
    participants: Vec<String>,
    #[serde(default)]
    expenses: Vec<ExpenseInput>,
}

fn default_currency() -> String {
    "BGN".to_string()
}

#[derive(serde::Deserialize)]
struct ExpenseInput {
    description: String,
    amount: String,
    paid_by: String,
    #[serde(default)]
    category: Option<String>,
    split: SplitInput,
}

#[derive(serde::Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
enum SplitInput {
    Equal {
        #[serde(default)]
        participants: Option<Vec<String>>,
    },
    Percentage {
        parts: Vec<PercentPart>,
    },
    Shares {
        parts: Vec<SharePart>,
    },
    Custom {
        parts: Vec<AmountPart>,
    },
}

#[derive(serde::Deserialize)]
struct PercentPart {
    name: String,
    percent: String,
}

#[derive(serde::Deserialize)]
struct SharePart {
    name: String,
    shares: u32,
}

#[derive(serde::Deserialize)]
struct AmountPart {
    name: String,
    amount: String,
}

/// JSON output schema for balances.
#[derive(serde::Serialize)]
struct BalanceOutput {
    participant: String,
    name: String,
    balance: String,
    status: String,
}

/// JSON output schema for settlement plans.
#[derive(serde::Serialize)]
struct PlanOutput {
    transfers: Vec<TransferOutput>,
    total_transferred: String,
    transaction_count: usize,
    transaction_bound: usize,
}

#[derive(serde::Serialize)]
struct TransferOutput {
    from: String,
    to: String,
    amount: String,
    currency: String,
}

fn parse_amount(raw: &str) -> Decimal {
    raw.parse().unwrap_or_else(|e| {
        eprintln!("Invalid amount '{}': {}", raw, e);
        process::exit(1);
    })
}

fn load_group(path: &str) -> Group {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: GroupFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "group": "Trip",
  "base_currency": "BGN",
  "participants": ["Ivan", "Maria"],
  "expenses": [
    {{ "description": "Dinner", "amount": "90.00", "paid_by": "Ivan",
       "split": {{ "method": "equal" }} }}
  ]
}}"#
        );
        process::exit(1);
    });

    let mut group = Group::new(&file.group, CurrencyCode::new(&file.base_currency));
    for name in &file.participants {
        group.add_participant(name);
    }

    let resolve = |group: &Group, name: &str| -> ParticipantId {
        group
            .participant_by_name(name)
            .map(|p| p.id().clone())
            .unwrap_or_else(|| {
                eprintln!("Error: participant '{}' not found in group", name);
                process::exit(1);
            })
    };

    for expense in file.expenses {
        let amount = parse_amount(&expense.amount);
        let paid_by = resolve(&group, &expense.paid_by);
        let category = expense.category.as_deref();

        let result = match expense.split {
            SplitInput::Equal { participants } => {
                let ids = participants.map(|names| {
                    names
                        .iter()
                        .map(|n| resolve(&group, n))
                        .collect::<Vec<_>>()
                });
                ExpenseAllocator::equal(
                    &mut group,
                    &expense.description,
                    amount,
                    paid_by,
                    ids.as_deref(),
                    category,
                )
            }
            SplitInput::Percentage { parts } => {
                let parts: Vec<(ParticipantId, Decimal)> = parts
                    .iter()
                    .map(|p| (resolve(&group, &p.name), parse_amount(&p.percent)))
                    .collect();
                ExpenseAllocator::percentage(
                    &mut group,
                    &expense.description,
                    amount,
                    paid_by,
                    &parts,
                    category,
                )
            }
            SplitInput::Shares { parts } => {
                let parts: Vec<(ParticipantId, u32)> = parts
                    .iter()
                    .map(|p| (resolve(&group, &p.name), p.shares))
                    .collect();
                ExpenseAllocator::shares(
                    &mut group,
                    &expense.description,
                    amount,
                    paid_by,
                    &parts,
                    category,
                )
            }
            SplitInput::Custom { parts } => {
                let parts: Vec<(ParticipantId, Decimal)> = parts
                    .iter()
                    .map(|p| (resolve(&group, &p.name), parse_amount(&p.amount)))
                    .collect();
                ExpenseAllocator::custom(
                    &mut group,
                    &expense.description,
                    amount,
                    paid_by,
                    &parts,
                    category,
                )
            }
        };

        if let Err(e) = result {
            eprintln!("Error in expense \"{}\": {}", expense.description, e);
            process::exit(1);
        }
    }

    group
}

fn display_name(group: &Group, id: &ParticipantId) -> String {
    group
        .participant_by_id(id)
        .map(|p| p.name().to_string())
        .unwrap_or_else(|| id.to_string())
}

fn parse_io_options(args: &[String]) -> (String, String) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });
    (path, format)
}

fn cmd_balances(args: &[String]) {
    let (path, format) = parse_io_options(args);
    let group = load_group(&path);
    let sheet = BalanceSheet::from_group(&group);

    if format == "json" {
        let rows: Vec<BalanceOutput> = sheet
            .entries()
            .iter()
            .map(|(id, balance)| BalanceOutput {
                participant: id.to_string(),
                name: display_name(&group, id),
                balance: balance.to_string(),
                status: if *balance > Decimal::ZERO {
                    "CREDITOR".to_string()
                } else if *balance < Decimal::ZERO {
                    "DEBTOR".to_string()
                } else {
                    "SETTLED".to_string()
                },
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows).unwrap());
    } else {
        println!("--- Balances ({}) ---", group.base_currency());
        for (id, balance) in sheet.entries() {
            let status = if *balance < Decimal::ZERO {
                "owes"
            } else {
                "is owed"
            };
            println!(
                "  {}: {} {:.2}",
                display_name(&group, id),
                status,
                balance.abs()
            );
        }
    }
}

fn cmd_settle(args: &[String]) {
    let (path, format) = parse_io_options(args);
    let group = load_group(&path);
    let sheet = BalanceSheet::from_group(&group);
    let plan = SettlementPlanner::plan(&sheet, group.base_currency());

    if format == "json" {
        let output = PlanOutput {
            transfers: plan
                .transfers()
                .iter()
                .map(|t| TransferOutput {
                    from: display_name(&group, &t.from),
                    to: display_name(&group, &t.to),
                    amount: t.amount.to_string(),
                    currency: t.currency.to_string(),
                })
                .collect(),
            total_transferred: plan.total_transferred().to_string(),
            transaction_count: plan.transfer_count(),
            transaction_bound: transaction_bound(&sheet),
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else if plan.is_settled() {
        println!("All settled! No payments needed.");
    } else {
        println!("Settlements needed:");
        println!();
        for (i, t) in plan.transfers().iter().enumerate() {
            println!(
                "  {}. {} pays {}: {:.2} {}",
                i + 1,
                display_name(&group, &t.from),
                display_name(&group, &t.to),
                t.amount,
                t.currency
            );
        }
        println!();
        println!("Total transactions: {}", plan.transfer_count());
    }
}

fn cmd_generate(args: &[String]) {
    let mut participants = 10usize;
    let mut expenses = 30usize;
    let mut currency = "BGN".to_string();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--participants" => {
                i += 1;
                participants = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--participants requires a number");
                    process::exit(1);
                });
            }
            "--expenses" => {
                i += 1;
                expenses = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--expenses requires a number");
                    process::exit(1);
                });
            }
            "--currency" => {
                i += 1;
                currency = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--currency requires a currency code");
                    process::exit(1);
                });
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = GroupConfig {
        participant_count: participants,
        expense_count: expenses,
        base_currency: CurrencyCode::new(&currency),
        ..Default::default()
    };
    let group = generate_random_group(&config);

    #[derive(serde::Serialize)]
    struct OutputSplitPart {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        percent: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        shares: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        amount: Option<String>,
    }

    #[derive(serde::Serialize)]
    struct OutputSplit {
        method: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        parts: Option<Vec<OutputSplitPart>>,
    }

    #[derive(serde::Serialize)]
    struct OutputExpense {
        description: String,
        amount: String,
        paid_by: String,
        split: OutputSplit,
    }

    #[derive(serde::Serialize)]
    struct OutputFile {
        group: String,
        base_currency: String,
        participants: Vec<String>,
        expenses: Vec<OutputExpense>,
    }

    let expenses_out: Vec<OutputExpense> = group
        .expenses()
        .iter()
        .map(|e| {
            let parts = match e.split_method() {
                SplitMethod::Equal => None,
                _ => Some(
                    e.splits()
                        .iter()
                        .map(|s| {
                            let name = display_name(&group, s.participant_id());
                            match s.share() {
                                SplitShare::Percentage(pct) => OutputSplitPart {
                                    name,
                                    percent: Some(pct.to_string()),
                                    shares: None,
                                    amount: None,
                                },
                                SplitShare::Shares(count) => OutputSplitPart {
                                    name,
                                    percent: None,
                                    shares: Some(count),
                                    amount: None,
                                },
                                _ => OutputSplitPart {
                                    name,
                                    percent: None,
                                    shares: None,
                                    amount: Some(s.amount().to_string()),
                                },
                            }
                        })
                        .collect(),
                ),
            };
            OutputExpense {
                description: e.description().to_string(),
                amount: e.total_amount().to_string(),
                paid_by: display_name(&group, e.paid_by()),
                split: OutputSplit {
                    method: e.split_method().to_string(),
                    parts,
                },
            }
        })
        .collect();

    let output = OutputFile {
        group: group.name().to_string(),
        base_currency: group.base_currency().to_string(),
        participants: group.participants().iter().map(|p| p.name().to_string()).collect(),
        expenses: expenses_out,
    };

    let json = serde_json::to_string_pretty(&output).unwrap();

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} expenses across {} participants → {}",
            group.expenses().len(),
            participants,
            path
        );
    } else {
        println!("{}", json);
    }
}

fn cmd_demo() {
    let mut group = Group::new("Trip to Plovdiv", CurrencyCode::new("BGN"));
    let ivan = group.add_participant("Ivan");
    let maria = group.add_participant("Maria");
    let georgi = group.add_participant("Georgi");

    ExpenseAllocator::equal(&mut group, "Dinner", dec!(90.00), ivan.clone(), None, None)
        .unwrap();
    ExpenseAllocator::equal(&mut group, "Taxi", dec!(30.00), maria, None, None)
        .unwrap();
    ExpenseAllocator::equal(
        &mut group,
        "Museum tickets",
        dec!(45.00),
        georgi,
        None,
        None,
    )
    .unwrap();
    ExpenseAllocator::equal(&mut group, "Drinks", dec!(60.00), ivan, None, None)
        .unwrap();

    println!("--- Expenses ---");
    for e in group.expenses() {
        println!(
            "  [{}] {}: {:.2} (paid by {})",
            e.split_method(),
            e.description(),
            e.total_amount(),
            display_name(&group, e.paid_by())
        );
    }
    println!();

    let sheet = BalanceSheet::from_group(&group);
    println!("--- Balances ---");
    for (id, balance) in sheet.entries() {
        let status = if *balance < Decimal::ZERO {
            "owes"
        } else {
            "is owed"
        };
        println!("  {}: {} {:.2}", display_name(&group, id), status, balance.abs());
    }
    println!();

    let plan = SettlementPlanner::plan(&sheet, group.base_currency());
    if plan.is_settled() {
        println!("All settled! No payments needed.");
    } else {
        println!("Settlements needed:");
        println!();
        for (i, t) in plan.transfers().iter().enumerate() {
            println!(
                "  {}. {} pays {}: {:.2} {}",
                i + 1,
                display_name(&group, &t.from),
                display_name(&group, &t.to),
                t.amount,
                t.currency
            );
        }
        println!();
        println!("Total transactions: {}", plan.transfer_count());
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "balances" => cmd_balances(rest),
        "settle" => cmd_settle(rest),
        "generate" => cmd_generate(rest),
        "demo" => cmd_demo(),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
