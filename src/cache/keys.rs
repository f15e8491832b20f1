// Cache key scheme for program data.
// Keys are pure functions of the program UUID, tenancy mode, and site name.

use std::fmt::Write;

use crate::sites::TenancyMode;

/// Prefix shared by every per-program entry.
const PROGRAM_KEY_PREFIX: &str = "program-";

/// Key holding the list of all cached program UUIDs.
const PROGRAM_UUIDS_KEY: &str = "program-uuids";

/// Cache key for a single program's detail document.
///
/// The UUID is used exactly as the catalog listed it.
pub fn record_key(uuid: &str) -> String {
    format!("{}{}", PROGRAM_KEY_PREFIX, uuid)
}

/// Cache key for the program UUID index.
///
/// Single-tenant mode always uses one global key. Multi-tenant mode scopes the
/// key by site name; without a site it falls back to the global key.
pub fn index_key(mode: TenancyMode, site: Option<&str>) -> String {
    match (mode, site) {
        (TenancyMode::Multi, Some(site_name)) => format!("{}-{}", PROGRAM_UUIDS_KEY, site_name),
        _ => PROGRAM_UUIDS_KEY.to_string(),
    }
}

/// Map a cache key to a file name that is safe on common filesystems.
///
/// Path-hostile bytes and `%` itself are percent-encoded, so distinct keys
/// always map to distinct file names.
pub fn file_name_for(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len() + 5);
    for c in key.chars() {
        match c {
            '%' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' => {
                let _ = write!(encoded, "%{:02X}", c as u32);
            }
            c if c.is_control() => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    let _ = write!(encoded, "%{:02X}", byte);
                }
            }
            c => encoded.push(c),
        }
    }
    encoded.push_str(".json");
    encoded
}
