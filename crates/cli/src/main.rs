// vbook - supplier and prospect register on the command line

mod exit_codes;
mod export;
mod import;
mod records;
mod stats;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use vendorbook_config::{ConfigError, Settings};
use vendorbook_io::{ExportError, ImportError};
use vendorbook_recon::ReconError;
use vendorbook_store::{Store, StoreError};

use exit_codes::{
    EXIT_CONFIG, EXIT_ERROR, EXIT_FORMAT, EXIT_NOT_FOUND, EXIT_STORAGE, EXIT_SUCCESS, EXIT_USAGE,
    EXIT_VALIDATION,
};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VBOOK_GIT_HASH"),
    ", ",
    env!("VBOOK_TARGET"),
    ")"
);

#[derive(Parser)]
#[command(name = "vbook")]
#[command(about = "Supplier and prospect register, with spreadsheet import review")]
#[command(version, long_version = LONG_VERSION)]
struct Cli {
    /// Database file (overrides the settings file)
    #[arg(long, global = true, env = "VENDORBOOK_DB", value_name = "PATH")]
    db: Option<PathBuf>,

    /// Settings file (default: $VENDORBOOK_CONFIG, then the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More diagnostics on stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a supplier
    #[command(after_help = "\
Examples:
  vbook add 'Acme SA' --external-id 100 --address '1 rue du Rhône, Genève'
  vbook add 'Acme Services' --prefill 'Acme SA' --region vaud --tag critical
  vbook add 'Globex' --prospect --status pending --json")]
    Add(records::AddArgs),

    /// Show one supplier
    Show {
        id: i64,

        #[arg(long)]
        json: bool,
    },

    /// Change fields of a supplier; unspecified fields are kept
    #[command(after_help = "\
Examples:
  vbook edit 12 --address '2 avenue de France'
  vbook edit 12 --external-id ''          # clear the external id
  vbook edit 12 --tag critical --tag csr-plus
  vbook edit 12 --clear-tags --prospect false")]
    Edit(records::EditArgs),

    /// Delete suppliers by id (absent ids are ignored)
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Delete every supplier (asks for the current count as confirmation)
    #[command(after_help = "\
Examples:
  vbook delete-all               # prints the count to confirm with
  vbook delete-all --confirm 42")]
    DeleteAll {
        /// Current number of suppliers, as printed by a first run without it
        #[arg(long, value_name = "COUNT")]
        confirm: Option<u64>,
    },

    /// List suppliers, one page at a time
    #[command(after_help = "\
Examples:
  vbook list
  vbook list --page 2 --page-size 25
  vbook list --filter acm --sort name
  vbook list --sort updated-at --desc --json")]
    List(records::ListArgs),

    /// Legal names with their external id and address
    Names {
        #[arg(long)]
        json: bool,
    },

    /// Review and apply an uploaded supplier list
    #[command(subcommand)]
    Import(import::ImportCommands),

    /// Write the (optionally filtered) supplier list to CSV or XLSX
    #[command(after_help = "\
Examples:
  vbook export suppliers.xlsx
  vbook export view.csv --filter acme --sort name
  vbook export out --format xlsx")]
    Export(export::ExportArgs),

    /// Dashboard indicators
    #[command(after_help = "\
Examples:
  vbook stats
  vbook stats --quick critical --region geneva --region vaud
  vbook stats --status pending --json")]
    Stats(stats::StatsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = Context::load(cli.config, cli.db).and_then(|ctx| match cli.command {
        Commands::Add(args) => records::cmd_add(&ctx, args),
        Commands::Show { id, json } => records::cmd_show(&ctx, id, json),
        Commands::Edit(args) => records::cmd_edit(&ctx, args),
        Commands::Delete { ids } => records::cmd_delete(&ctx, ids),
        Commands::DeleteAll { confirm } => records::cmd_delete_all(&ctx, confirm),
        Commands::List(args) => records::cmd_list(&ctx, args),
        Commands::Names { json } => records::cmd_names(&ctx, json),
        Commands::Import(cmd) => import::cmd_import(&ctx, cmd),
        Commands::Export(args) => export::cmd_export(&ctx, args),
        Commands::Stats(args) => stats::cmd_stats(&ctx, args),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

/// Settings plus the database they resolve to. Built once per invocation.
pub struct Context {
    pub settings: Settings,
    pub db_path: PathBuf,
}

impl Context {
    fn load(config: Option<PathBuf>, db: Option<PathBuf>) -> Result<Self, CliError> {
        let settings = match config {
            Some(path) => Settings::load_from(&path)?,
            None => Settings::load()?,
        };
        let db_path = db.unwrap_or_else(|| settings.database_path());
        log::debug!("database: {}", db_path.display());
        Ok(Self { settings, db_path })
    }

    pub fn open_store(&self) -> Result<Store, CliError> {
        Store::open(&self.db_path).map_err(|e| {
            CliError::from(e).with_hint(format!("database path: {}", self.db_path.display()))
        })
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self { code: EXIT_NOT_FOUND, message: msg.into(), hint: None }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self { code: EXIT_FORMAT, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        let code = match &err {
            StoreError::Validation(_) => EXIT_VALIDATION,
            StoreError::NotFound(_) => EXIT_NOT_FOUND,
            StoreError::Storage(_) => EXIT_STORAGE,
        };
        let hint = match &err {
            StoreError::NotFound(_) => Some("run `vbook list` to see existing ids".to_string()),
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}

impl From<ImportError> for CliError {
    fn from(err: ImportError) -> Self {
        match &err {
            ImportError::MissingColumns(_) => CliError::format(err.to_string()).with_hint(format!(
                "the first row must name the columns {}",
                vendorbook_io::REQUIRED_HEADERS.join(", ")
            )),
            ImportError::UnsupportedFormat(_) => CliError::format(err.to_string())
                .with_hint("upload a .csv, .xlsx, .xls, .xlsb or .ods file"),
            ImportError::Io(_) => CliError::usage(err.to_string()),
            ImportError::Empty | ImportError::Parse(_) => CliError::format(err.to_string()),
        }
    }
}

impl From<ExportError> for CliError {
    fn from(err: ExportError) -> Self {
        match &err {
            ExportError::UnsupportedFormat(_) => {
                CliError::usage(err.to_string()).with_hint("pass --format csv or --format xlsx")
            }
            ExportError::Write(_) => CliError::general(err.to_string()),
        }
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::Store(e) => e.into(),
            ReconError::PlanParse(_) => CliError::format(err.to_string())
                .with_hint("re-run `vbook import analyze` to produce a fresh plan"),
            ReconError::Io(_) => CliError::usage(err.to_string()),
            ReconError::AlreadyApplied(_) => CliError::usage(err.to_string())
                .with_hint("run `vbook import analyze` again for a fresh plan"),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::Invalid(_) => Some(
                "see `page_size`, `apply_mode` and `export_format` in the settings file"
                    .to_string(),
            ),
            _ => None,
        };
        Self { code: EXIT_CONFIG, message: err.to_string(), hint }
    }
}
