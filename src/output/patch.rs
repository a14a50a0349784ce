//! RFC 6902 JSON Patch rendering of a diff result.

use serde::Serialize;
use serde_json::Value;

use crate::diff::DiffResult;
use crate::error::{Result, SbomDriftError};

/// A single JSON Patch operation.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPatchOp {
    pub op: &'static str,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Build JSON Patch operations from a diff result.
pub fn generate_patch(diff: &DiffResult) -> Result<Vec<JsonPatchOp>> {
    let mut ops = Vec::new();

    for (i, c) in diff.added.iter().enumerate() {
        ops.push(JsonPatchOp {
            op: "add",
            path: format!("/components/{i}"),
            value: Some(to_value(c)?),
        });
    }

    for c in &diff.removed {
        ops.push(JsonPatchOp {
            op: "remove",
            path: format!("/components/{}", escape_pointer(&c.id)),
            value: None,
        });
    }

    for c in &diff.changed {
        let pointer = escape_pointer(&c.id);
        if c.before.version != c.after.version {
            ops.push(JsonPatchOp {
                op: "replace",
                path: format!("/components/{pointer}/version"),
                value: Some(Value::String(c.after.version.clone())),
            });
        }
        if c.before.licenses != c.after.licenses {
            ops.push(JsonPatchOp {
                op: "replace",
                path: format!("/components/{pointer}/licenses"),
                value: Some(to_value(&c.after.licenses)?),
            });
        }
        if c.before.hashes != c.after.hashes {
            ops.push(JsonPatchOp {
                op: "replace",
                path: format!("/components/{pointer}/hashes"),
                value: Some(to_value(&c.after.hashes)?),
            });
        }
    }

    Ok(ops)
}

/// Render the patch operations as pretty-printed JSON.
pub fn render_patch(diff: &DiffResult) -> Result<String> {
    let ops = generate_patch(diff)?;
    serde_json::to_string_pretty(&ops).map_err(|e| SbomDriftError::Render(e.to_string()))
}

fn to_value<T: Serialize>(v: &T) -> Result<Value> {
    serde_json::to_value(v).map_err(|e| SbomDriftError::Render(e.to_string()))
}

/// Escape a string for use as a JSON Pointer segment (RFC 6901).
fn escape_pointer(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}
