use crate::ClientResult;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::AnalyzeData;
use crate::import::input::resolve_source;
use crate::import::parse::parse_source;
use crate::intelligence::pipeline::analyze_batch;
use crate::intelligence::policy::RISK_POLICY_VERSION;

#[derive(Debug, Default)]
pub struct AnalyzeRunOptions {
    pub path: Option<String>,
    pub stdin_override: Option<String>,
}

pub fn run_with_options(options: AnalyzeRunOptions) -> ClientResult<SuccessEnvelope> {
    let source = resolve_source(options.path, options.stdin_override, "analyze")?;
    let batch = parse_source(&source.content)?;
    let outcome = analyze_batch(&batch.headers, &batch.rows)?;

    let data = AnalyzeData {
        path: source.source_ref,
        source_used: source.source_kind.as_str().to_string(),
        policy_version: RISK_POLICY_VERSION.to_string(),
        columns: outcome.columns,
        summary: outcome.summary,
        statistics: outcome.statistics,
        transactions: outcome.transactions,
    };

    success("analyze", data)
}
