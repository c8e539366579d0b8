use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tripfx::core::log::init_logging;

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

impl From<Commands> for tripfx::AppCommand {
    fn from(cmd: Commands) -> tripfx::AppCommand {
        match cmd {
            Commands::Rates => tripfx::AppCommand::Rates,
            Commands::Price { amounts, currency } => {
                tripfx::AppCommand::Price { amounts, currency }
            }
            Commands::Select { code } => tripfx::AppCommand::Select { code },
            Commands::Currencies => tripfx::AppCommand::Currencies,
            Commands::Ads { live } => tripfx::AppCommand::Ads { live },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display current exchange rates
    Rates,
    /// Format USD prices in the display currency
    Price {
        /// Amounts in USD
        #[arg(required = true, allow_negative_numbers = true)]
        amounts: Vec<f64>,

        /// Format in this currency instead of the saved selection
        #[arg(long)]
        currency: Option<String>,
    },
    /// Change the display currency
    Select {
        /// Currency code, e.g. EUR
        code: String,
    },
    /// List selectable currencies
    Currencies,
    /// Check the ad frequency cap and pick a strategy if allowed
    Ads {
        /// Load the chosen script instead of only logging it
        #[arg(long)]
        live: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => tripfx::cli::setup::setup(),
        Some(cmd) => tripfx::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
