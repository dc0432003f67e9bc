//! Storage module for saving and loading run snapshots
//!
//! Snapshots are serialized as JSON so save files stay human-readable.

use crate::runtime::Snapshot;

/// Save a snapshot to bytes using JSON serialization
pub fn save(snapshot: &Snapshot) -> anyhow::Result<Vec<u8>> {
    let json = serde_json::to_string_pretty(snapshot)?;
    Ok(json.into_bytes())
}

/// Load a snapshot from bytes using JSON deserialization
pub fn load(bytes: &[u8]) -> anyhow::Result<Snapshot> {
    let json = std::str::from_utf8(bytes)?;
    let snapshot = serde_json::from_str(json)?;
    Ok(snapshot)
}
