pub mod ledger_state;

pub use ledger_state::{default_buckets, LedgerState};

/// Generate a new entity ID in the form `"<kind>::<uuid>"`
pub fn generate_id(kind: &str) -> String {
    format!("{}::{}", kind, uuid::Uuid::new_v4())
}
