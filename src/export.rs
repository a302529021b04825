//! Snapshot export
//!
//! CSV with one row per label (`Date,<kw1>,<kw2>,...`) and JSON of the
//! whole snapshot. Both require a dataset.

use std::fmt::Write as _;

use crate::error::Result;
use crate::models::QuerySnapshot;
use crate::utils::error::PipelineError;
use crate::utils::round_to;

/// Output format of the `search` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Render the dataset of `snapshot` as CSV
///
/// # Errors
///
/// Returns `PipelineError::EmptyDataset` when the snapshot carries no dataset.
pub fn to_csv(snapshot: &QuerySnapshot) -> Result<String> {
    let dataset = snapshot
        .dataset
        .as_ref()
        .ok_or(PipelineError::EmptyDataset)?;

    let mut out = String::new();
    let header: Vec<String> = std::iter::once("Date")
        .chain(dataset.series.iter().map(|s| s.name.as_str()))
        .map(csv_field)
        .collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for (index, label) in dataset.labels.iter().enumerate() {
        out.push_str(&csv_field(label));
        for series in &dataset.series {
            let value = series.values.get(index).copied().unwrap_or(0.0);
            // Writing to a String cannot fail
            let _ = write!(out, ",{}", round_to(value, 2));
        }
        out.push('\n');
    }

    Ok(out)
}

/// Render `snapshot` as pretty-printed JSON
///
/// # Errors
///
/// Returns `PipelineError::EmptyDataset` when the snapshot carries no
/// dataset, or a JSON error if serialization fails.
pub fn to_json(snapshot: &QuerySnapshot) -> Result<String> {
    if snapshot.dataset.is_none() {
        return Err(PipelineError::EmptyDataset.into());
    }
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Quote a field when it contains a separator, a quote or a line break
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
