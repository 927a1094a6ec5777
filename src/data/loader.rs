use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value as JsonValue};

use super::model::{FieldValue, Fields, MatchRecord, MatchupParams, MatchupRecord, MatchupResults};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one stored matchup execution from a JSON file.
pub fn load_results(path: &Path) -> Result<MatchupResults> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_results(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Parse a stored matchup execution.
///
/// Expected schema:
///
/// ```json
/// {
///   "params": { "primary": "MUR", "matchup": ["ICOADS", "SAMOS"], ... },
///   "stats":  { "numPrimaryMatched": 10, ... },
///   "data": [
///     {
///       "sea_water_temperature": 18.2,
///       "matches": [
///         { "source": "ICOADS", "sea_water_temperature": 17.9 },
///         ...
///       ],
///       ...other fields
///     },
///     ...
///   ]
/// }
/// ```
///
/// `matchup` may also be a comma-separated string, the form it takes in the
/// incoming request.
pub fn parse_results(text: &str) -> Result<MatchupResults> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let obj = root.as_object().context("Expected top-level JSON object")?;

    let params = parse_params(obj.get("params").context("missing 'params'")?)?;
    let stats = obj.get("stats").cloned().unwrap_or(JsonValue::Null);

    let data = obj
        .get("data")
        .and_then(|v| v.as_array())
        .context("missing or invalid 'data' array")?;

    let records = data
        .iter()
        .enumerate()
        .map(|(i, rec)| parse_record(rec).with_context(|| format!("data[{i}]")))
        .collect::<Result<Vec<_>>>()?;

    Ok(MatchupResults {
        params,
        stats,
        records,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_params(val: &JsonValue) -> Result<MatchupParams> {
    let obj = val.as_object().context("'params' is not a JSON object")?;

    let primary = obj
        .get("primary")
        .and_then(|v| v.as_str())
        .context("params: missing or invalid 'primary'")?
        .to_string();

    let matchup = match obj.get("matchup") {
        Some(JsonValue::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(j, v)| {
                v.as_str()
                    .map(str::to_string)
                    .with_context(|| format!("params.matchup[{j}]: not a string"))
            })
            .collect::<Result<Vec<_>>>()?,
        Some(JsonValue::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(other) => bail!("params.matchup: expected array or string, got {other}"),
        None => bail!("params: missing 'matchup'"),
    };

    Ok(MatchupParams {
        primary,
        matchup,
        raw: val.clone(),
    })
}

fn parse_record(val: &JsonValue) -> Result<MatchupRecord> {
    let obj = val.as_object().context("not a JSON object")?;

    let matches = match obj.get("matches") {
        Some(JsonValue::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(j, m)| parse_match(m).with_context(|| format!("matches[{j}]")))
            .collect::<Result<Vec<_>>>()?,
        Some(JsonValue::Null) | None => Vec::new(),
        Some(_) => bail!("'matches' is not an array"),
    };

    Ok(MatchupRecord {
        fields: fields_of(obj, &["matches"]),
        matches,
    })
}

fn parse_match(val: &JsonValue) -> Result<MatchRecord> {
    let obj = val.as_object().context("not a JSON object")?;
    let source = obj
        .get("source")
        .and_then(|v| v.as_str())
        .context("missing or invalid 'source'")?
        .to_string();

    Ok(MatchRecord {
        source,
        fields: fields_of(obj, &["source"]),
    })
}

fn fields_of(obj: &Map<String, JsonValue>, skip: &[&str]) -> Fields {
    obj.iter()
        .filter(|(key, _)| !skip.contains(&key.as_str()))
        .map(|(key, val)| (key.clone(), json_to_field(val)))
        .collect()
}

fn json_to_field(val: &JsonValue) -> FieldValue {
    match val {
        JsonValue::String(s) => FieldValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                FieldValue::Float(f)
            } else {
                FieldValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => FieldValue::Bool(*b),
        JsonValue::Null => FieldValue::Null,
        other => FieldValue::String(other.to_string()),
    }
}
