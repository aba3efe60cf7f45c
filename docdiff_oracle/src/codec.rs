use docdiff_diff::{ChangeBlock, ChangeStatus, OracleError};
use serde_json::{Map, Value};

/// Decode a `{"change_blocks": [...]}` document into blocks.
///
/// Blocks are returned as the service wrote them. Status/field consistency is
/// corrected later by the reconciler, which also records the warnings.
pub fn parse_change_blocks(raw: &str) -> Result<Vec<ChangeBlock>, OracleError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| OracleError::InvalidJson(err.to_string()))?;

    let root = value.as_object().ok_or_else(|| {
        OracleError::SchemaViolation("response root is not a JSON object".to_string())
    })?;
    let items = root
        .get("change_blocks")
        .ok_or_else(|| {
            OracleError::SchemaViolation("response is missing the 'change_blocks' key".to_string())
        })?
        .as_array()
        .ok_or_else(|| {
            OracleError::SchemaViolation("'change_blocks' is not a JSON array".to_string())
        })?;

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| decode_block(idx, item))
        .collect()
}

fn decode_block(idx: usize, item: &Value) -> Result<ChangeBlock, OracleError> {
    let obj = item.as_object().ok_or_else(|| {
        OracleError::SchemaViolation(format!("block {idx} is not a JSON object"))
    })?;

    let status = match obj.get("status").and_then(Value::as_str) {
        Some("equal") => ChangeStatus::Equal,
        Some("added") => ChangeStatus::Added,
        Some("deleted") => ChangeStatus::Deleted,
        Some("modified") => ChangeStatus::Modified,
        Some(other) => {
            return Err(OracleError::SchemaViolation(format!(
                "block {idx} has invalid status '{other}'"
            )));
        }
        None => {
            return Err(OracleError::SchemaViolation(format!(
                "block {idx} has no string 'status'"
            )));
        }
    };

    Ok(ChangeBlock {
        status,
        text_a: text_field(obj, "text1", idx)?,
        text_b: text_field(obj, "text2", idx)?,
    })
}

fn text_field(obj: &Map<String, Value>, key: &str, idx: usize) -> Result<String, OracleError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(OracleError::SchemaViolation(format!(
            "block {idx} '{key}' is not a string"
        ))),
    }
}
