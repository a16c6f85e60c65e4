use std::fs;
use std::io::{IsTerminal, Read};

use crate::import::invalid_input_error;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum SourceKind {
    File,
    Stdin,
}

impl SourceKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Stdin => "stdin",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ResolvedSource {
    pub(crate) source_kind: SourceKind,
    pub(crate) source_ref: Option<String>,
    pub(crate) content: String,
}

/// Picks exactly one input: a file path, `-` for stdin, or piped stdin when no
/// path is given. A path plus non-empty piped stdin is rejected as ambiguous.
pub(crate) fn resolve_source(
    path: Option<String>,
    stdin_override: Option<String>,
    command: &str,
) -> ClientResult<ResolvedSource> {
    let stdin_body = read_stdin(stdin_override)?;

    if let Some(path_value) = path {
        if path_value == "-" {
            if let Some(stdin_value) = stdin_body {
                return Ok(stdin_source(stdin_value));
            }

            return Err(invalid_input_error(
                "Path `-` means stdin input, but stdin was empty. Pipe CSV/JSON input or pass a file path.",
            ));
        }

        let file_body = fs::read_to_string(&path_value).map_err(|error| {
            ClientError::invalid_argument_with_recovery(
                &format!("Could not read input file `{path_value}`: {error}"),
                vec![
                    "Verify the path exists and is readable.".to_string(),
                    format!("Rerun `riskledger {command} <path>`."),
                ],
            )
        })?;

        if stdin_body.is_some() {
            return Err(invalid_input_error(
                "Both stdin and file input were provided. Pass exactly one source: either a file path or piped stdin.",
            ));
        }

        log::debug!("read {} bytes from {path_value}", file_body.len());
        return Ok(ResolvedSource {
            source_kind: SourceKind::File,
            source_ref: Some(path_value),
            content: file_body,
        });
    }

    if let Some(stdin_value) = stdin_body {
        return Ok(stdin_source(stdin_value));
    }

    Err(invalid_input_error(
        "No input source provided. Pass a file path or pipe input via stdin.",
    ))
}

fn stdin_source(content: String) -> ResolvedSource {
    log::debug!("read {} bytes from stdin", content.len());
    ResolvedSource {
        source_kind: SourceKind::Stdin,
        source_ref: None,
        content,
    }
}

fn read_stdin(stdin_override: Option<String>) -> ClientResult<Option<String>> {
    if let Some(value) = stdin_override {
        if value.trim().is_empty() {
            return Ok(None);
        }
        return Ok(Some(value));
    }

    if std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|error| {
            ClientError::invalid_argument_with_recovery(
                &format!("Could not read stdin: {error}"),
                vec![
                    "Retry with an explicit file path argument.".to_string(),
                    "Or rerun with valid stdin content.".to_string(),
                ],
            )
        })?;

    if buffer.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(buffer))
}
