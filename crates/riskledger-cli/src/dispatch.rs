use riskledger_client::commands::analyze::{self, AnalyzeRunOptions};
use riskledger_client::commands::columns::{self, ColumnsRunOptions};
use riskledger_client::{ClientResult, SuccessEnvelope};

use crate::cli::{Cli, Commands};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    dispatch_with_stdin(cli, None)
}

/// `stdin_override` replaces the process stdin; `None` reads it when piped.
pub fn dispatch_with_stdin(
    cli: &Cli,
    stdin_override: Option<String>,
) -> ClientResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Analyze { path, .. } => analyze::run_with_options(AnalyzeRunOptions {
            path: path.clone(),
            stdin_override,
        }),
        Commands::Columns { path, .. } => columns::run_with_options(ColumnsRunOptions {
            path: path.clone(),
            stdin_override,
        }),
    }
}
