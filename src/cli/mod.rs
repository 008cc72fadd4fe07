use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::{BankService, EvolutionReport, Session, Statement};
use crate::domain::{
    format_euros, parse_cents, AccountSelector, Cents, LedgerPolicy, TransferReceipt,
};

/// Guichet - bank-account ledger
#[derive(Parser)]
#[command(name = "guichet")]
#[command(about = "A single-user bank-account ledger with a Livret A savings account")]
#[command(version)]
pub struct Cli {
    /// Ledger file path
    #[arg(short, long, env = "GUICHET_LEDGER", default_value = "guichet.json", global = true)]
    pub ledger: PathBuf,

    /// Account number to log in with (9 digits)
    #[arg(short, long, env = "GUICHET_ACCOUNT", global = true)]
    pub account: Option<String>,

    /// Password (4 digits)
    #[arg(long, env = "GUICHET_PIN", hide_env_values = true, global = true)]
    pub pin: Option<String>,

    /// Operate on the Livret A instead of the current account
    #[arg(short, long, global = true)]
    pub savings: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new ledger file
    Init {
        /// Seed the ledger with the two demo customers
        #[arg(long)]
        demo: bool,

        /// Daily withdrawal limit (e.g., "1000")
        #[arg(long)]
        daily_limit: Option<String>,

        /// Fee charged on transfers to other customers (e.g., "0.50")
        #[arg(long)]
        external_fee: Option<String>,
    },

    /// Customer administration (no login needed)
    #[command(subcommand)]
    Account(AccountCommands),

    /// Show balances after logging in
    Overview,

    /// Livret A commands
    #[command(subcommand)]
    Livret(LivretCommands),

    /// Deposit money
    Deposit {
        /// Amount (e.g., "50.00" or "50")
        amount: String,
    },

    /// Withdraw money (subject to the daily limit)
    Withdraw {
        /// Amount (e.g., "50.00" or "50")
        amount: String,
    },

    /// Transfer money. Without --to, moves money between the current
    /// account and the Livret A.
    Transfer {
        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// Recipient account number for a transfer to another customer
        #[arg(long)]
        to: Option<String>,
    },

    /// Show balance and operation history
    History {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show how balances evolved, operation by operation
    Evolution {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Export operation history
    Export {
        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Open a new customer account
    Open {
        /// Holder name
        name: String,

        /// Account number (9 digits)
        #[arg(long)]
        number: String,

        /// Password (4 digits)
        #[arg(long = "new-pin")]
        new_pin: String,

        /// Opening balance
        #[arg(long, default_value = "0")]
        balance: String,
    },

    /// List all customer accounts
    List,
}

#[derive(Subcommand)]
pub enum LivretCommands {
    /// Open the Livret A of the logged-in holder
    Open,
}

/// Install the tracing subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "guichet=debug" } else { "guichet=error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

impl Cli {
    fn selector(&self) -> AccountSelector {
        if self.savings {
            AccountSelector::Savings
        } else {
            AccountSelector::Primary
        }
    }

    fn login(&self, service: &BankService) -> Result<Session> {
        let number = self
            .account
            .as_deref()
            .context("Login required: pass --account or set GUICHET_ACCOUNT")?;
        let pin = self
            .pin
            .as_deref()
            .context("Login required: pass --pin or set GUICHET_PIN")?;
        Ok(service.login(number, pin)?)
    }

    pub async fn run(self) -> Result<()> {
        match &self.command {
            Commands::Init {
                demo,
                daily_limit,
                external_fee,
            } => {
                run_init_command(
                    &self.ledger,
                    *demo,
                    daily_limit.as_deref(),
                    external_fee.as_deref(),
                )
                .await?
            }

            Commands::Account(cmd) => {
                let mut service = BankService::open(&self.ledger).await?;
                run_account_command(&mut service, cmd).await?
            }

            Commands::Overview => {
                let service = BankService::open(&self.ledger).await?;
                let session = self.login(&service)?;
                let overview = service.overview(&session, Utc::now())?;

                println!("Welcome {}", overview.name);
                println!("  Account no.:     {}", overview.number);
                println!("  Current account: {}", format_euros(overview.balance));
                match &overview.savings {
                    Some(savings) => {
                        println!("  Livret A:        {}", format_euros(savings.balance));
                        println!(
                            "  Total:           {}",
                            format_euros(overview.balance.saturating_add(savings.balance))
                        );
                    }
                    None => println!("  Livret A:        not opened"),
                }
                println!(
                    "  Withdrawn today: {} of {}",
                    format_euros(overview.withdrawn_today),
                    format_euros(overview.policy.daily_withdrawal_limit)
                );
            }

            Commands::Livret(LivretCommands::Open) => {
                let mut service = BankService::open(&self.ledger).await?;
                let session = self.login(&service)?;
                let livret = service.open_savings(&session).await?;
                println!("Opened {} ({})", livret.name, livret.number);
            }

            Commands::Deposit { amount } => {
                let mut service = BankService::open(&self.ledger).await?;
                let session = self.login(&service)?;
                let op = service
                    .deposit(&session, self.selector(), parse_amount(amount)?, Utc::now())
                    .await?;
                println!("{}. New balance: {}", op.label(), format_euros(op.balance_after));
            }

            Commands::Withdraw { amount } => {
                let mut service = BankService::open(&self.ledger).await?;
                let session = self.login(&service)?;
                let op = service
                    .withdraw(&session, self.selector(), parse_amount(amount)?, Utc::now())
                    .await?;
                println!("{}. New balance: {}", op.label(), format_euros(op.balance_after));
            }

            Commands::Transfer { amount, to } => {
                let mut service = BankService::open(&self.ledger).await?;
                let session = self.login(&service)?;
                let amount = parse_amount(amount)?;
                let receipt = match to {
                    Some(recipient) => {
                        service
                            .transfer_external(
                                &session,
                                self.selector(),
                                recipient,
                                amount,
                                Utc::now(),
                            )
                            .await?
                    }
                    None => {
                        service
                            .transfer_internal(&session, self.selector(), amount, Utc::now())
                            .await?
                    }
                };
                print_receipt(&receipt);
            }

            Commands::History { format } => {
                let service = BankService::open(&self.ledger).await?;
                let session = self.login(&service)?;
                let statement = service.statement(&session, self.selector())?;
                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&statement)?),
                    "table" => print_statement(&statement),
                    other => anyhow::bail!("Invalid format '{}'. Valid formats: table, json", other),
                }
            }

            Commands::Evolution { format } => {
                let service = BankService::open(&self.ledger).await?;
                let session = self.login(&service)?;
                run_evolution_command(&service, &session, format)?;
            }

            Commands::Export { format, output } => {
                let service = BankService::open(&self.ledger).await?;
                let session = self.login(&service)?;
                run_export_command(&service, &session, self.selector(), format, output.as_ref())?;
            }
        }

        Ok(())
    }
}

async fn run_init_command(
    path: &Path,
    demo: bool,
    daily_limit: Option<&str>,
    external_fee: Option<&str>,
) -> Result<()> {
    let mut policy = LedgerPolicy::default();
    if let Some(limit) = daily_limit {
        policy = policy.with_daily_withdrawal_limit(parse_amount(limit)?);
    }
    if let Some(fee) = external_fee {
        policy = policy.with_external_transfer_fee(parse_amount(fee)?);
    }

    let service = BankService::init(path, policy, demo).await?;
    println!("Ledger initialized: {}", path.display());
    if demo {
        for listing in service.list_accounts() {
            println!("  {} {}", listing.number, listing.name);
        }
    }
    Ok(())
}

fn parse_amount(input: &str) -> Result<Cents> {
    parse_cents(input)
        .with_context(|| format!("Invalid amount '{}'. Use '50.00' or '50'", input))
}

async fn run_account_command(service: &mut BankService, cmd: &AccountCommands) -> Result<()> {
    match cmd {
        AccountCommands::Open {
            name,
            number,
            new_pin,
            balance,
        } => {
            let opening = parse_amount(balance)?;
            let account = service.open_account(name, number, new_pin, opening).await?;
            println!(
                "Opened account {} for {} with {}",
                account.number,
                account.name,
                format_euros(account.balance)
            );
        }

        AccountCommands::List => {
            let accounts = service.list_accounts();
            if accounts.is_empty() {
                println!("No accounts found.");
                return Ok(());
            }

            println!(
                "{:<11} {:<20} {:>14} {:>14} {:>6}",
                "NUMBER", "NAME", "BALANCE", "LIVRET A", "OPS"
            );
            println!("{}", "-".repeat(69));
            for account in accounts {
                println!(
                    "{:<11} {:<20} {:>14} {:>14} {:>6}",
                    account.number,
                    truncate(&account.name, 20),
                    format_euros(account.balance),
                    account
                        .savings_balance
                        .map(format_euros)
                        .unwrap_or_else(|| "-".to_string()),
                    account.operation_count
                );
            }
        }
    }
    Ok(())
}

fn print_receipt(receipt: &TransferReceipt) {
    if receipt.external {
        println!(
            "External transfer of {} (+{} fee) sent to {}",
            format_euros(receipt.amount),
            format_euros(receipt.fee),
            receipt.to
        );
    } else {
        println!(
            "Transfer of {} sent to {}",
            format_euros(receipt.amount),
            receipt.to
        );
    }
    println!("  New balance: {}", format_euros(receipt.debit.balance_after));
}

fn print_statement(statement: &Statement) {
    println!(
        "{}, account no. {}, balance: {}",
        statement.name,
        statement.number,
        format_euros(statement.balance)
    );
    if statement.history.is_empty() {
        println!("No operations yet.");
        return;
    }

    println!();
    println!("{:>5} {:<16} {:>12}  {}", "#", "DATE", "BALANCE", "OPERATION");
    println!("{}", "-".repeat(80));
    for op in &statement.history {
        println!(
            "{:>5} {:<16} {:>12}  {}",
            op.sequence,
            op.timestamp.format("%Y-%m-%d %H:%M"),
            format_euros(op.balance_after),
            op.label()
        );
    }
}

fn run_evolution_command(service: &BankService, session: &Session, format: &str) -> Result<()> {
    match format {
        "json" => {
            let report = service.evolution(session)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "csv" => {
            use crate::io::Exporter;
            Exporter::new(service).export_evolution_csv(session, std::io::stdout())?;
        }
        "table" => {
            let report = service.evolution(session)?;
            print_evolution(&report);
        }
        other => anyhow::bail!("Invalid format '{}'. Valid formats: table, json, csv", other),
    }
    Ok(())
}

const BAR_WIDTH: usize = 30;

fn print_evolution(report: &EvolutionReport) {
    println!("Balance evolution for account no. {}", report.number);
    println!();
    println!(
        "{:<14} {:>12} {:>12} {:>12}  {}",
        "OPERATION", "CURRENT", "LIVRET A", "TOTAL", ""
    );
    println!("{}", "-".repeat(84));

    let max_total = report.points.iter().map(|p| p.total).max().unwrap_or(0);
    for (i, point) in report.points.iter().enumerate() {
        println!(
            "{:<14} {:>12} {:>12} {:>12}  {}",
            format!("Operation {}", i + 1),
            format_euros(point.primary),
            format_euros(point.savings),
            format_euros(point.total),
            bar(point.total, max_total, BAR_WIDTH)
        );
    }
}

/// Horizontal bar proportional to `value / max`.
fn bar(value: Cents, max: Cents, width: usize) -> String {
    if max <= 0 || value <= 0 {
        return String::new();
    }
    let filled = ((value as f64 / max as f64) * width as f64).round() as usize;
    "#".repeat(filled.clamp(1, width))
}

fn run_export_command(
    service: &BankService,
    session: &Session,
    which: AccountSelector,
    format: &str,
    output: Option<&PathBuf>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match format {
        "csv" => exporter.export_history_csv(session, which, writer)?,
        "json" => exporter
            .export_history_json(session, which, writer)?
            .operations
            .len(),
        other => anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", other),
    };

    if output.is_some() {
        eprintln!("Exported {} operations", count);
    }
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{}...", cut)
    }
}
