//! Address Roster
//!
//! Persisted record of every address seen, which groups it was sighted in,
//! and the latest aggregated metadata. The file is a JSON array keyed by
//! address and rewritten in full on every update; entries are never
//! deleted.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::record::{ChainKind, TokenRecord};

/// Default roster file name
pub const DEFAULT_ROSTER_FILE: &str = "addresses.json";

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Failed to serialize roster: {0}")]
    SerializationError(String),

    #[error("Failed to write roster file: {0}")]
    WriteError(String),
}

/// Best-effort group member count; the transport may not be allowed to see it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParticipantCount {
    Known(u64),
    /// Serialized as the string "unknown"
    Unknown(UnknownMarker),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnknownMarker {
    #[serde(rename = "unknown")]
    Unknown,
}

impl ParticipantCount {
    pub fn unknown() -> Self {
        ParticipantCount::Unknown(UnknownMarker::Unknown)
    }
}

/// The fact that an address was observed in one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSighting {
    pub group_name: String,
    pub num_participants: ParticipantCount,
}

/// One address with all of its sightings and the latest metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub address: String,
    pub chain: ChainKind,
    pub number_groups: usize,
    pub groups: Vec<GroupSighting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TokenRecord>,
}

/// File-backed roster with read-modify-write-truncate updates
#[derive(Debug, Clone)]
pub struct Roster {
    path: PathBuf,
}

impl Roster {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all entries; unreadable or corrupted files become an empty
    /// roster (fail-open)
    pub fn load(&self) -> Vec<RosterEntry> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read roster {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Roster {:?} is corrupted, treating as empty: {}", self.path, e);
                Vec::new()
            }
        }
    }

    /// Record one sighting: create the entry on first sight, otherwise
    /// append the group (unique by name) and overwrite the stored metadata
    /// with the latest enrichment
    pub fn record_sighting(
        &self,
        address: &str,
        chain: ChainKind,
        group_name: &str,
        num_participants: ParticipantCount,
        metadata: Option<&TokenRecord>,
    ) -> Result<(), RosterError> {
        let mut entries = self.load();

        match entries.iter_mut().find(|e| e.address == address) {
            Some(entry) => {
                if !entry.groups.iter().any(|g| g.group_name == group_name) {
                    entry.groups.push(GroupSighting {
                        group_name: group_name.to_string(),
                        num_participants,
                    });
                }
                entry.number_groups = entry.groups.len();
                if let Some(record) = metadata {
                    entry.metadata = Some(record.clone());
                }
            }
            None => {
                entries.push(RosterEntry {
                    address: address.to_string(),
                    chain,
                    number_groups: 1,
                    groups: vec![GroupSighting {
                        group_name: group_name.to_string(),
                        num_participants,
                    }],
                    metadata: metadata.cloned(),
                });
            }
        }

        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| RosterError::SerializationError(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| RosterError::WriteError(e.to_string()))?;

        tracing::debug!("Roster updated for {} via group {:?}", address, group_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn roster_in(dir: &TempDir) -> Roster {
        Roster::new(dir.path().join(DEFAULT_ROSTER_FILE))
    }

    #[test]
    fn test_first_sighting_creates_entry() {
        let dir = TempDir::new().unwrap();
        let roster = roster_in(&dir);

        roster
            .record_sighting(
                "MintA",
                ChainKind::Solana,
                "alpha calls",
                ParticipantCount::Known(250),
                None,
            )
            .unwrap();

        let entries = roster.load();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].address, "MintA");
        assert_eq!(entries[0].number_groups, 1);
        assert_eq!(entries[0].groups[0].group_name, "alpha calls");
        assert!(entries[0].metadata.is_none());
    }

    #[test]
    fn test_repeat_sighting_same_group_is_not_duplicated() {
        let dir = TempDir::new().unwrap();
        let roster = roster_in(&dir);

        for _ in 0..3 {
            roster
                .record_sighting(
                    "MintA",
                    ChainKind::Solana,
                    "alpha calls",
                    ParticipantCount::Known(250),
                    None,
                )
                .unwrap();
        }

        let entries = roster.load();
        assert_eq!(entries[0].groups.len(), 1);
        assert_eq!(entries[0].number_groups, 1);
    }

    #[test]
    fn test_new_group_appends_and_counts() {
        let dir = TempDir::new().unwrap();
        let roster = roster_in(&dir);

        roster
            .record_sighting(
                "MintA",
                ChainKind::Solana,
                "alpha calls",
                ParticipantCount::Known(250),
                None,
            )
            .unwrap();
        roster
            .record_sighting(
                "MintA",
                ChainKind::Solana,
                "degen lounge",
                ParticipantCount::unknown(),
                None,
            )
            .unwrap();

        let entries = roster.load();
        assert_eq!(entries[0].number_groups, 2);
        assert_eq!(
            entries[0].groups[1].num_participants,
            ParticipantCount::unknown()
        );
    }

    #[test]
    fn test_metadata_overwritten_by_latest() {
        let dir = TempDir::new().unwrap();
        let roster = roster_in(&dir);

        let mut first = TokenRecord::bare("MintA", ChainKind::Solana);
        first.name = Some("Old Name".to_string());
        roster
            .record_sighting(
                "MintA",
                ChainKind::Solana,
                "alpha calls",
                ParticipantCount::Known(1),
                Some(&first),
            )
            .unwrap();

        let mut second = TokenRecord::bare("MintA", ChainKind::Solana);
        second.name = Some("New Name".to_string());
        roster
            .record_sighting(
                "MintA",
                ChainKind::Solana,
                "alpha calls",
                ParticipantCount::Known(1),
                Some(&second),
            )
            .unwrap();

        let entries = roster.load();
        assert_eq!(
            entries[0].metadata.as_ref().unwrap().name.as_deref(),
            Some("New Name")
        );
    }

    #[test]
    fn test_participant_count_serialization() {
        let known = serde_json::to_value(ParticipantCount::Known(42)).unwrap();
        assert_eq!(known, serde_json::json!(42));
        let unknown = serde_json::to_value(ParticipantCount::unknown()).unwrap();
        assert_eq!(unknown, serde_json::json!("unknown"));

        let back: ParticipantCount = serde_json::from_value(serde_json::json!("unknown")).unwrap();
        assert_eq!(back, ParticipantCount::unknown());
    }
}
