use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::Result;
use crate::snapshot::AggregationOutcome;

/// JSON document written by `siteprogress report --format json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEnvelope<'a> {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: &'a AggregationOutcome,
}

pub fn render_json(outcome: &AggregationOutcome) -> Result<String> {
    render_json_at(outcome, Utc::now())
}

pub fn render_json_at(outcome: &AggregationOutcome, generated_at: DateTime<Utc>) -> Result<String> {
    let envelope = ReportEnvelope {
        generated_at,
        outcome,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}
