// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
//! Reading of the event list baked into a sound bank, from its JSON metadata.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::error::BuildError;
use crate::config::{EVENT_FILE_EXTENSION, PROJECT_FILE_EXTENSION, SOUND_BANK_FILE_EXTENSION};

/// The field of the bank metadata listing the bank's events.
const EVENTS_KEY: &str = "events";

/// The set of event names contained in one sound bank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankEventIndex {
    bank: String,
    events: BTreeSet<String>,
}

impl BankEventIndex {
    /// The bank name this index was built for.
    pub fn bank(&self) -> &str {
        &self.bank
    }

    /// The event names, without their file extension.
    pub fn events(&self) -> &BTreeSet<String> {
        &self.events
    }

    /// Returns true if the bank contains the given event.
    pub fn contains(&self, event: &str) -> bool {
        self.events.contains(event)
    }
}

/// Returns the bank name without its sound bank extension, if it has one.
pub fn bank_stem(bank: &str) -> &str {
    bank.strip_suffix(SOUND_BANK_FILE_EXTENSION).unwrap_or(bank)
}

/// Returns the metadata sidecar path of a bank inside the given project sound banks folder.
pub fn bank_metadata_path(soundbanks_folder: &Path, bank: &str) -> PathBuf {
    soundbanks_folder.join(format!("{}{}", bank_stem(bank), PROJECT_FILE_EXTENSION))
}

/// Reads the metadata file of a bank and indexes its events.
pub fn read_bank_events(bank: &str, metadata_path: &Path) -> Result<BankEventIndex, BuildError> {
    let metadata = fs::metadata(metadata_path)
        .map_err(|_| BuildError::BankNotFound(metadata_path.to_path_buf()))?;
    if metadata.len() == 0 {
        return Err(BuildError::BankEmpty(metadata_path.to_path_buf()));
    }

    let contents = fs::read(metadata_path).map_err(|e| BuildError::BankUnreadable {
        path: metadata_path.to_path_buf(),
        source: e,
    })?;
    let document: Value =
        serde_json::from_slice(&contents).map_err(|e| BuildError::BankInvalidJson {
            path: metadata_path.to_path_buf(),
            source: e,
        })?;

    let events = events_from_bank_source(&document, metadata_path)?;
    debug!(bank, events = events.len(), "Indexed bank events");

    Ok(BankEventIndex {
        bank: bank.to_string(),
        events,
    })
}

/// Extracts the event names of a parsed bank metadata document. A document without
/// an events field describes a bank without events.
pub fn events_from_bank_source(
    document: &Value,
    metadata_path: &Path,
) -> Result<BTreeSet<String>, BuildError> {
    let Some(root) = document.as_object() else {
        return Err(BuildError::BankRootNotObject(metadata_path.to_path_buf()));
    };

    let Some(events) = root.get(EVENTS_KEY) else {
        return Ok(BTreeSet::new());
    };

    let Some(events) = events.as_array() else {
        return Err(BuildError::BankEventsNotArray(metadata_path.to_path_buf()));
    };

    events
        .iter()
        .enumerate()
        .map(|(index, event)| match event.as_str() {
            Some(name) => Ok(name
                .strip_suffix(EVENT_FILE_EXTENSION)
                .unwrap_or(name)
                .to_string()),
            None => Err(BuildError::BankEventNotString {
                path: metadata_path.to_path_buf(),
                index,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_event_suffix_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        fs::write(&path, r#"{"name": "a", "events": ["foo.amevent", "bar.amevent"]}"#).unwrap();

        let index = read_bank_events("a", &path).unwrap();
        assert_eq!(index.bank(), "a");
        assert!(index.contains("foo"));
        assert!(index.contains("bar"));
        assert!(!index.contains("foo.amevent"));
        assert_eq!(index.events().len(), 2);
    }

    #[test]
    fn test_missing_events_field_is_empty() {
        let events = events_from_bank_source(&json!({"name": "a"}), Path::new("a.json")).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_invalid_documents() {
        let path = Path::new("a.json");
        assert!(matches!(
            events_from_bank_source(&json!([1, 2]), path),
            Err(BuildError::BankRootNotObject(_))
        ));
        assert!(matches!(
            events_from_bank_source(&json!({"events": "foo.amevent"}), path),
            Err(BuildError::BankEventsNotArray(_))
        ));
        assert!(matches!(
            events_from_bank_source(&json!({"events": ["foo.amevent", 3]}), path),
            Err(BuildError::BankEventNotString { index: 1, .. })
        ));
    }

    #[test]
    fn test_missing_and_empty_files_are_distinct() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            read_bank_events("missing", &missing),
            Err(BuildError::BankNotFound(_))
        ));

        let empty = dir.path().join("empty.json");
        fs::write(&empty, "").unwrap();
        assert!(matches!(
            read_bank_events("empty", &empty),
            Err(BuildError::BankEmpty(_))
        ));

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "{ not json").unwrap();
        assert!(matches!(
            read_bank_events("garbage", &garbage),
            Err(BuildError::BankInvalidJson { .. })
        ));
    }

    #[test]
    fn test_metadata_path_with_and_without_extension() {
        let folder = Path::new("project/soundbanks");
        assert_eq!(
            bank_metadata_path(folder, "a"),
            PathBuf::from("project/soundbanks/a.json")
        );
        assert_eq!(
            bank_metadata_path(folder, "a.ambank"),
            PathBuf::from("project/soundbanks/a.json")
        );
    }
}
