//! Reading VM inventory exports and extracting their VM records.

mod document;
mod extract;

pub use document::{load_document, Document};
pub use extract::{extract_vm_names, VmRecord, DEFAULT_OWNER, DEFAULT_VM_NAME};
