//! Reshaping of upstream `data` payloads into tool results.

use serde_json::{Map, Value, json};

use crate::ToolError;

/// Keeps `resultType` and `result` of a query response.
pub(crate) fn query_result(data: Value) -> Result<Value, ToolError> {
    let mut data = match data {
        Value::Object(data) => data,
        other => return Err(unexpected("query data", &other)),
    };

    let (Some(result_type), Some(result)) = (data.remove("resultType"), data.remove("result")) else {
        return Err(ToolError::UnexpectedResponse(
            "query data is missing resultType or result".to_string(),
        ));
    };

    Ok(json!({ "resultType": result_type, "result": result }))
}

/// Expects a JSON array, as returned by the label, label values and series endpoints.
pub(crate) fn list(data: Value) -> Result<Vec<Value>, ToolError> {
    match data {
        Value::Array(items) => Ok(items),
        other => Err(unexpected("list data", &other)),
    }
}

/// Flattens `{metric: [{type, help, unit}]}` into `[{metric, type, help, unit}]`, keeping upstream order.
///
/// Some backends already answer with a list of entries; those are passed through.
pub(crate) fn metadata(data: Value) -> Result<Vec<Value>, ToolError> {
    let by_metric = match data {
        Value::Array(items) => return Ok(items),
        Value::Object(by_metric) => by_metric,
        other => return Err(unexpected("metadata", &other)),
    };

    let mut entries = Vec::new();

    for (metric, metric_entries) in by_metric {
        let metric_entries = match metric_entries {
            Value::Array(metric_entries) => metric_entries,
            other => return Err(unexpected("metadata entries", &other)),
        };

        for entry in metric_entries {
            let mut flattened = Map::new();
            flattened.insert("metric".to_string(), Value::String(metric.clone()));

            match entry {
                Value::Object(fields) => flattened.extend(fields),
                other => return Err(unexpected("metadata entry", &other)),
            }

            entries.push(Value::Object(flattened));
        }
    }

    Ok(entries)
}

/// Keeps the active and dropped target lists, defaulting either to empty.
pub(crate) fn targets(data: Value) -> Result<Value, ToolError> {
    let mut data = match data {
        Value::Object(data) => data,
        other => return Err(unexpected("targets data", &other)),
    };

    let mut take = |key: &str| match data.remove(key) {
        None | Some(Value::Null) => Ok(Value::Array(Vec::new())),
        Some(Value::Array(items)) => Ok(Value::Array(items)),
        Some(other) => Err(unexpected(key, &other)),
    };

    let active = take("activeTargets")?;
    let dropped = take("droppedTargets")?;

    Ok(json!({ "activeTargets": active, "droppedTargets": dropped }))
}

fn unexpected(what: &str, value: &Value) -> ToolError {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };

    ToolError::UnexpectedResponse(format!("{what} is {kind}"))
}
