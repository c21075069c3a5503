//! Pulling VM names and owners out of a loaded document.

use serde_json::Value;

use super::document::{scalar_text, Document};

/// Stand-in when a VM entry has no `Name` key.
pub const DEFAULT_VM_NAME: &str = "Unknown VM";

/// Stand-in when a VM entry has no `Tags.Owner`.
pub const DEFAULT_OWNER: &str = "No Owner Tag";

/// One VM entry as surfaced during extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct VmRecord {
    pub name: String,
    pub owner: String,
}

/// Collect every VM name in document order, duplicates included.
///
/// `on_record` fires once per entry with its name and owner so the report
/// can print as it goes. A document without a `VirtualMachines` key yields
/// an empty list. A `VirtualMachines` value that is not a list (a stored
/// `null` included) is logged and treated the same; malformed entries
/// inside the list degrade to the defaults instead of failing the whole
/// extraction.
pub fn extract_vm_names(document: &Document, mut on_record: impl FnMut(&VmRecord)) -> Vec<String> {
    let machines = match &document.virtual_machines {
        None => return Vec::new(),
        Some(Value::Array(machines)) => machines,
        Some(other) => {
            tracing::error!(
                found = json_type_name(other),
                "'VirtualMachines' key is not a list as expected"
            );
            return Vec::new();
        }
    };

    let mut names = Vec::with_capacity(machines.len());
    for machine in machines {
        let record = VmRecord {
            name: machine
                .get("Name")
                .map(scalar_text)
                .unwrap_or_else(|| DEFAULT_VM_NAME.to_string()),
            owner: machine
                .get("Tags")
                .and_then(Value::as_object)
                .and_then(|tags| tags.get("Owner"))
                .map(scalar_text)
                .unwrap_or_else(|| DEFAULT_OWNER.to_string()),
        };
        on_record(&record);
        names.push(record.name);
    }
    names
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
