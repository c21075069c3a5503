//! Loading a VM inventory export from disk.

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{AppError, Result};

/// Top-level fields of an inventory export. Anything else in the file is
/// ignored. Both fields stay loosely typed because real exports are messy;
/// the extractor decides what shapes it accepts.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    #[serde(rename = "RequestID")]
    pub request_id: Option<Value>,
    #[serde(rename = "VirtualMachines", default, deserialize_with = "present_value")]
    pub virtual_machines: Option<Value>,
}

impl Document {
    /// `RequestID` rendered for display: strings as-is, anything else
    /// (numbers, null, a missing key) as JSON text.
    pub fn request_id_display(&self) -> String {
        match &self.request_id {
            None => "null".to_string(),
            Some(value) => scalar_text(value),
        }
    }
}

/// Keeps a stored `null` distinguishable from a missing key: the field is
/// `None` only when the key is absent, the way a map lookup reads. Plain
/// `Option` would fold both into `None` and extraction could no longer
/// call out a present-but-wrong shape.
fn present_value<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Scalar rendered the way it reads in the source JSON, except strings,
/// which drop their quotes.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read and parse an inventory file.
///
/// A missing file and malformed JSON (including a non-object root) map to
/// distinct errors so the caller can word its reports; both are expected
/// conditions, never panics.
pub fn load_document(path: &Path) -> Result<Document> {
    let display = path.display().to_string();
    let file = File::open(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            AppError::FileNotFound {
                path: display.clone(),
            }
        } else {
            AppError::Io(e)
        }
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| AppError::ParseError {
        path: display,
        source,
    })
}
