use crate::core::PlotMetadata;
use crate::utils::error::{ProjectionError, Result};
use serde_json::Value;

pub const INVALID_SERIES_FORMAT: &str = "Invalid response format: missing or invalid series data";

/// Checks the `POST /data` envelope. Points are left for the transformer.
pub fn validate_envelope(raw: &Value) -> Result<Vec<PlotMetadata>> {
    let entries = series_array(raw)?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let identifier = entry
                .get("identifier")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ProjectionError::schema(format!(
                        "Invalid response format: series entry {} has no identifier",
                        index
                    ))
                })?;

            Ok(PlotMetadata {
                identifier: identifier.to_string(),
                points: entry.get("points").cloned().unwrap_or(Value::Null),
            })
        })
        .collect()
}

/// Checks the `GET /data` envelope, whose `series` is a flat point list.
pub fn validate_legacy_envelope(raw: &Value) -> Result<Vec<Value>> {
    series_array(raw).map(|points| points.to_vec())
}

fn series_array(raw: &Value) -> Result<&[Value]> {
    if let Some(message) = raw.get("error").and_then(Value::as_str) {
        if !message.is_empty() {
            return Err(ProjectionError::ServerReported(message.to_string()));
        }
    }

    raw.get("series")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| ProjectionError::schema(INVALID_SERIES_FORMAT))
}
