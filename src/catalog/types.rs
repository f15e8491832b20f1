// Catalog API response types.
// Program documents are cached exactly as returned; fields are read on demand.

use serde_json::Value;

/// Statuses the refresh job asks the catalog for.
pub const IN_SCOPE_STATUSES: [&str; 2] = ["active", "retired"];

/// A program detail document, unmodified from the catalog response.
pub type ProgramDocument = Value;

/// The program's title, if the document carries a string one.
pub fn program_title(document: &ProgramDocument) -> Option<&str> {
    document.get("title").and_then(Value::as_str)
}

/// The program's status, if the document carries a string one.
pub fn program_status(document: &ProgramDocument) -> Option<&str> {
    document.get("status").and_then(Value::as_str)
}
