use serde::{Deserialize, Serialize};

pub mod store;

pub use store::SessionStore;

pub const SCHEMA_VERSION: u32 = 1;

/// On-disk shape of the persisted session identifier. The identifier itself
/// is server-issued and opaque; it is stored as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub schema_version: u32,
    pub session_id: String,
}
