use crate::core::{NamedSeries, PlotMetadata, Point, SeriesKind};
use crate::utils::error::{ProjectionError, Result};
use serde_json::Value;
use std::cmp::Ordering;

pub const NO_SERIES_FOUND: &str = "No valid series data found in response";

/// Display label for a backend identifier. Unknown identifiers are split on
/// `_` and title-cased.
pub fn resolve_label(identifier: &str) -> String {
    match identifier.to_lowercase().as_str() {
        "investment_value" => "Investment Growth".to_string(),
        "property_value" => "Property Value".to_string(),
        "mortgage_remaining" => "Remaining Mortgage".to_string(),
        "equity_value" => "Home Equity".to_string(),
        "realestatepricegrowth" => "Real Estate Price Growth".to_string(),
        _ => identifier
            .split('_')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Maps validated metadata into chart series.
///
/// The backend puts the value on `x` and the time on `y`; output points
/// carry time on `x` and are sorted ascending by it, keeping input order
/// for equal times. Malformed points are dropped, but a series left with no
/// points fails the whole transform.
pub fn transform(metadata: Vec<PlotMetadata>) -> Result<Vec<NamedSeries>> {
    let series = metadata
        .into_iter()
        .map(|entry| {
            let name = resolve_label(&entry.identifier);

            let Value::Array(raw_points) = &entry.points else {
                return Err(ProjectionError::schema(format!(
                    "Invalid points data for series \"{}\"",
                    name
                )));
            };

            let data = sanitize_points(raw_points, |p| Point::new(p.y, p.x));
            if data.is_empty() {
                return Err(ProjectionError::schema(format!(
                    "No valid points found for series \"{}\"",
                    name
                )));
            }

            tracing::debug!("Series \"{}\": {} of {} points kept", name, data.len(), raw_points.len());

            Ok(NamedSeries {
                name,
                kind: SeriesKind::Scatter,
                data,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if series.is_empty() {
        return Err(ProjectionError::schema(NO_SERIES_FOUND));
    }

    Ok(series)
}

/// Legacy `GET /data` points already carry time on `x`; they are sanitized
/// and sorted but not swapped, and the series has no name.
pub fn transform_unlabeled(points: Vec<Value>) -> Result<NamedSeries> {
    let data = sanitize_points(&points, |p| p);
    if data.is_empty() {
        return Err(ProjectionError::schema("No valid points found in series data"));
    }

    Ok(NamedSeries {
        name: String::new(),
        kind: SeriesKind::Scatter,
        data,
    })
}

fn sanitize_points(raw: &[Value], remap: impl Fn(Point) -> Point) -> Vec<Point> {
    let mut points: Vec<Point> = raw
        .iter()
        .filter_map(parse_point)
        .map(remap)
        .collect();
    points.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
    points
}

fn parse_point(raw: &Value) -> Option<Point> {
    let x = raw.get("x")?.as_f64()?;
    let y = raw.get("y")?.as_f64()?;
    Some(Point::new(x, y))
}
