use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use wb_export::api::CardsQuery;
use wb_export::cli;
use wb_export::config::{Overrides, Settings};

#[derive(Parser)]
#[command(name = "wb-export")]
#[command(about = "Fetch Wildberries supplier data into an Excel workbook.")]
#[command(long_about = "wb-export - Wildberries supplier API → Excel

Fetches catalog, orders, sales and cards from the supplier API and writes
each collection into a named sheet of one .xlsx workbook. Row 1 holds the
field names; nested values are stored as JSON text.

CONFIGURATION:
  Credentials come from flags, the environment (WB_TOKEN, WB_KEY) or a TOML
  file (--config, default ./wb-export.toml):

  [api]
  token = \"...\"
  key = \"...\"
  timeout_secs = 30

  [workbook]
  path = \"test.xlsx\"

EXAMPLES:
  wb-export info                              # Nomenclatures → sheet 'nomenclature'
  wb-export orders --date-from 2023-01-01     # Orders → sheet 'orders'
  wb-export cards --limit 50 --print          # Count cards only
  wb-export show orders                       # Sheet → JSON")]
#[command(version)]
struct Cli {
    /// Path to TOML config file
    #[arg(long, global = true, env = "WB_CONFIG")]
    config: Option<PathBuf>,

    /// API token (Authorization header)
    #[arg(long, global = true, env = "WB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// API key (`key` query parameter)
    #[arg(long, global = true, env = "WB_KEY", hide_env_values = true)]
    key: Option<String>,

    /// API base address
    #[arg(long, global = true, env = "WB_BASE_URL")]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Workbook (.xlsx) to write to and read from
    #[arg(short, long, global = true, env = "WB_WORKBOOK")]
    workbook: Option<PathBuf>,

    /// Show verbose output and debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch nomenclatures with prices and discounts
    Info {
        /// Target sheet
        #[arg(long, default_value = "nomenclature")]
        sheet: String,
    },

    /// Fetch orders since a date
    Orders {
        /// First date (YYYY-MM-DD)
        #[arg(short, long)]
        date_from: chrono::NaiveDate,

        /// 0 = changed since date_from, 1 = only that day
        #[arg(short, long, default_value = "0")]
        flag: u8,

        /// Target sheet
        #[arg(long, default_value = "orders")]
        sheet: String,
    },

    /// Fetch sales since a date
    Sales {
        /// First date (YYYY-MM-DD)
        #[arg(short, long)]
        date_from: chrono::NaiveDate,

        /// 0 = changed since date_from, 1 = only that day
        #[arg(short, long, default_value = "0")]
        flag: u8,

        /// Target sheet
        #[arg(long, default_value = "sales")]
        sheet: String,
    },

    /// Fetch one page of supplier cards
    Cards {
        #[arg(long, default_value = "100")]
        limit: u32,

        #[arg(long, default_value = "0")]
        offset: u32,

        /// Text search
        #[arg(long, default_value = "")]
        search: String,

        #[arg(long, default_value = "updateAt")]
        sort_column: String,

        /// Sort descending
        #[arg(long)]
        descending: bool,

        /// Target sheet
        #[arg(long, default_value = "cards")]
        sheet: String,

        /// Only print the number of cards, do not write the workbook
        #[arg(long)]
        print: bool,
    },

    /// Print the card of an imt (group) id
    Card {
        imt_id: i64,
    },

    /// Generate new barcodes
    Barcodes {
        quantity: u32,
    },

    /// Delete one nomenclature from its card
    Delete {
        nomenclature_id: i64,
    },

    /// Read a sheet from the workbook and print it as JSON
    Show {
        sheet: String,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "wb_export=debug"
    } else {
        "wb_export=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let overrides = Overrides {
        token: cli.token,
        key: cli.key,
        base_url: cli.base_url,
        timeout_secs: cli.timeout,
        workbook: cli.workbook,
    };
    let settings = Settings::load(cli.config.as_deref(), overrides)?;
    let verbose = cli.verbose;

    match cli.command {
        Commands::Info { sheet } => cli::info(&settings, &sheet, verbose)?,

        Commands::Orders {
            date_from,
            flag,
            sheet,
        } => cli::orders(&settings, date_from, flag, &sheet, verbose)?,

        Commands::Sales {
            date_from,
            flag,
            sheet,
        } => cli::sales(&settings, date_from, flag, &sheet, verbose)?,

        Commands::Cards {
            limit,
            offset,
            search,
            sort_column,
            descending,
            sheet,
            print,
        } => {
            let query = CardsQuery {
                limit,
                offset,
                search_value: search,
                sort_column,
                ascending: !descending,
            };
            let sheet = (!print).then_some(sheet.as_str());
            cli::cards(&settings, &query, sheet, verbose)?
        }

        Commands::Card { imt_id } => cli::card(&settings, imt_id)?,

        Commands::Barcodes { quantity } => cli::barcodes(&settings, quantity)?,

        Commands::Delete { nomenclature_id } => cli::delete(&settings, nomenclature_id)?,

        Commands::Show { sheet } => cli::show(&settings, &sheet)?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "❌ Error:".bold().red(), err);
            ExitCode::FAILURE
        }
    }
}
