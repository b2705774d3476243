use allbanks::core::log::init_logging;
use allbanks::{
    AccountCommand, AppCommand, BankCommand, CategoryCommand, LoanCommand, TransactionCommand,
};
use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch and display current exchange rates
    Rates,
    /// Convert an amount between two currencies
    Convert {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        from: String,
        to: String,
    },
    /// Display all accounts and their total in one currency
    Total {
        /// Target currency, defaults to the configured one
        #[arg(long)]
        currency: Option<String>,
    },
    /// List supported currencies
    Currencies,
    /// Manage banks
    #[command(subcommand)]
    Bank(BankCommands),
    /// Manage accounts
    #[command(subcommand)]
    Account(AccountCommands),
    /// Manage loans
    #[command(subcommand)]
    Loan(LoanCommands),
    /// Manage transaction categories
    #[command(subcommand)]
    Category(CategoryCommands),
    /// Record and list transactions
    #[command(subcommand)]
    Transaction(TransactionCommands),
}

#[derive(Subcommand)]
enum LoanCommands {
    /// Add a loan
    Add {
        name: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        currency: String,
        /// Bank name or id
        #[arg(long)]
        bank: Option<String>,
        /// Monthly payment
        #[arg(long, default_value_t = 0.0)]
        payment: f64,
        #[arg(long)]
        duration_days: Option<u32>,
    },
    /// List loans with amounts and payments in one currency
    List {
        /// Target currency, defaults to the configured one
        #[arg(long)]
        currency: Option<String>,
    },
    /// Delete a loan
    Delete { id: String },
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// Add a category
    Add {
        name: String,
        #[arg(long, default_value = "")]
        icon: String,
    },
    /// List categories
    List,
}

#[derive(Subcommand)]
enum TransactionCommands {
    /// Record a transaction on an account
    Add {
        /// Account id or id prefix
        #[arg(long)]
        account: String,
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        /// Defaults to the account currency
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        note: Option<String>,
        /// Category name or id
        #[arg(long)]
        category: Option<String>,
    },
    /// List transactions
    List,
}

#[derive(Subcommand)]
enum BankCommands {
    /// Add a bank
    Add { name: String },
    /// List banks
    List,
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Add an account to a bank
    Add {
        name: String,
        /// Bank name or id
        #[arg(long)]
        bank: String,
        #[arg(long)]
        currency: String,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        balance: f64,
    },
    /// List accounts
    List {
        /// Include archived accounts
        #[arg(long)]
        all: bool,
    },
    /// Hide an account from totals
    Archive { id: String },
    /// Delete an account
    Delete { id: String },
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Rates => AppCommand::Rates,
            Commands::Convert { amount, from, to } => AppCommand::Convert { amount, from, to },
            Commands::Total { currency } => AppCommand::Total { currency },
            Commands::Currencies => AppCommand::Currencies,
            Commands::Bank(BankCommands::Add { name }) => {
                AppCommand::Bank(BankCommand::Add { name })
            }
            Commands::Bank(BankCommands::List) => AppCommand::Bank(BankCommand::List),
            Commands::Account(AccountCommands::Add {
                name,
                bank,
                currency,
                balance,
            }) => AppCommand::Account(AccountCommand::Add {
                name,
                bank,
                currency,
                balance,
            }),
            Commands::Account(AccountCommands::List { all }) => {
                AppCommand::Account(AccountCommand::List { all })
            }
            Commands::Account(AccountCommands::Archive { id }) => {
                AppCommand::Account(AccountCommand::Archive { id })
            }
            Commands::Account(AccountCommands::Delete { id }) => {
                AppCommand::Account(AccountCommand::Delete { id })
            }
            Commands::Loan(LoanCommands::Add {
                name,
                amount,
                currency,
                bank,
                payment,
                duration_days,
            }) => AppCommand::Loan(LoanCommand::Add {
                name,
                amount,
                currency,
                bank,
                payment,
                duration_days,
            }),
            Commands::Loan(LoanCommands::List { currency }) => {
                AppCommand::Loan(LoanCommand::List { currency })
            }
            Commands::Loan(LoanCommands::Delete { id }) => {
                AppCommand::Loan(LoanCommand::Delete { id })
            }
            Commands::Category(CategoryCommands::Add { name, icon }) => {
                AppCommand::Category(CategoryCommand::Add { name, icon })
            }
            Commands::Category(CategoryCommands::List) => {
                AppCommand::Category(CategoryCommand::List)
            }
            Commands::Transaction(TransactionCommands::Add {
                account,
                amount,
                currency,
                name,
                note,
                category,
            }) => AppCommand::Transaction(TransactionCommand::Add {
                account,
                amount,
                currency,
                name,
                note,
                category,
            }),
            Commands::Transaction(TransactionCommands::List) => {
                AppCommand::Transaction(TransactionCommand::List)
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => allbanks::cli::setup::setup_at_path(path),
            None => allbanks::cli::setup::setup(),
        },
        Some(cmd) => allbanks::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
