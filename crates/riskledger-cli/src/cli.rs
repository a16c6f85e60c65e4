use clap::{Parser, Subcommand};

/// Extended help shown after `riskledger analyze --help`.
pub const ANALYZE_AFTER_HELP: &str = "\
Accepted input:
  CSV  - one header row; comma, semicolon or tab separated
  JSON - one top-level array of flat objects

  <path> is a local file path. Use `-` to read stdin explicitly.
  Example: cat statement.csv | riskledger analyze -

Column Detection:
  Headers are matched to fields by keyword, in this order:
    date, amount, debit, credit, description, category, transactionId
  A header is used for at most one field; earlier fields win ties.
  Required: a date column, plus an amount column or debit/credit columns.
  Run `riskledger columns <path>` to check detection before analyzing.

Rows:
  Rows with an unparseable date (or a year outside 1990-2100) are skipped.
  Rows whose amount resolves to zero are skipped.
  Both counts are reported in the summary.

Risk scoring (risk/v1):
  +40  amount more than 3 standard deviations from the batch mean
  +25  amount between 2 and 3 standard deviations from the batch mean
  +30  amount above 2x the batch mean
  +15  transaction hour outside the batch peak hours
  +20  category total above 1.4x the average category total
  +20  latest week count above 1.3x the weekly average
  Score 60+ is High, 30-59 is Medium, below 30 is Normal.
  Batches with fewer than two retained rows are not scored.
";

#[derive(Debug, Parser)]
#[command(
    name = "riskledger",
    version,
    about = "transaction batch anomaly scoring",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Log pipeline diagnostics to stderr (overrides RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Detect columns, normalize rows and score every transaction for risk
    #[command(after_long_help = ANALYZE_AFTER_HELP)]
    Analyze {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
        /// Path to a CSV or JSON export (use `-` for stdin)
        path: Option<String>,
    },
    /// Show how the export's headers map to transaction fields
    Columns {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
        /// Path to a CSV or JSON export (use `-` for stdin)
        path: Option<String>,
    },
}

impl Commands {
    pub fn json(&self) -> bool {
        match self {
            Self::Analyze { json, .. } | Self::Columns { json, .. } => *json,
        }
    }
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}
