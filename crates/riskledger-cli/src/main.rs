mod cli;
mod dispatch;
mod output;
mod stdout_io;

use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use log::LevelFilter;
use riskledger_client::ClientError;
use stdout_io::write_stdout_text;

const ROOT_HELP: &str = "riskledger - transaction batch anomaly scoring

Usage:
  riskledger <command>

Start here:
  riskledger columns <path>
  riskledger analyze <path>
  riskledger analyze --help
";

const TOP_LEVEL_HELP: &str = "riskledger - transaction batch anomaly scoring

USAGE: riskledger <command> [--json] [--verbose]

Score a bank or card export:
  1. riskledger columns <path>          Check which headers map to date, amount, debit/credit
  2. riskledger analyze <path>          Normalize rows and score every transaction for risk

  <path> is a CSV or JSON array file. Use `-` (or pipe input) to read stdin.
  Add --json for machine-readable output.
  Add --verbose (or set RUST_LOG=debug) to log pipeline diagnostics to stderr.

Having issues or errors?
  Run `riskledger analyze --help` for accepted inputs, column detection and scoring rules.
";

const DEFAULT_LOG_FILTER: &str = "warn";

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if write_stdout_text(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let parsed = cli::Cli::try_parse();
    let cli = match parsed {
        Ok(value) => value,
        Err(err) => return handle_parse_error(&err, &raw_args),
    };
    init_logging(cli.verbose);
    let mode = output::mode_for_command(&cli.command);

    let dispatched = dispatch::dispatch(&cli);
    match dispatched {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            log::debug!("{} failed: {}", error.code, error.message);
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER),
    );
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp(None).target(env_logger::Target::Stderr);
    let _ = builder.try_init();
}

fn handle_parse_error(err: &clap::Error, raw_args: &[String]) -> Result<ExitCode, ExitCode> {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let body = if is_top_level_help_request(raw_args) {
                TOP_LEVEL_HELP.to_string()
            } else {
                err.to_string()
            };
            if write_stdout_text(&body).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        ErrorKind::DisplayVersion => {
            if write_stdout_text(&err.to_string()).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            let clean_message = strip_clap_boilerplate(&err.to_string());
            let parse_error = ClientError::invalid_argument_for_command(
                &clean_message,
                command_path_from_args(raw_args),
            );
            let mode = infer_requested_output_mode(raw_args);
            if output::print_failure(&parse_error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(ExitCode::from(1))
        }
    }
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Drops clap's trailing usage and "For more information" lines; recovery
/// steps carry the guidance instead.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_end().to_string()
}

fn command_path_from_args(raw_args: &[String]) -> Option<&'static str> {
    raw_args
        .iter()
        .skip(1)
        .find(|value| !value.starts_with('-'))
        .and_then(|value| match value.as_str() {
            "analyze" => Some("analyze"),
            "columns" => Some("columns"),
            _ => None,
        })
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}

fn exit_code_for_error(error: &ClientError) -> ExitCode {
    if error.code.starts_with("internal_") {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

#[cfg(test)]
mod tests {
    use super::{command_path_from_args, strip_clap_boilerplate};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn strips_usage_and_more_information_lines() {
        let message = "error: unexpected argument 'b.csv' found\n\nUsage: riskledger analyze [OPTIONS] [PATH]\n\nFor more information, try '--help'.\n";
        assert_eq!(
            strip_clap_boilerplate(message),
            "error: unexpected argument 'b.csv' found"
        );
    }

    #[test]
    fn command_hint_uses_first_positional() {
        assert_eq!(
            command_path_from_args(&args(&["riskledger", "--json", "analyze", "x"])),
            Some("analyze")
        );
        assert_eq!(
            command_path_from_args(&args(&["riskledger", "columns"])),
            Some("columns")
        );
        assert_eq!(command_path_from_args(&args(&["riskledger", "import"])), None);
    }
}
