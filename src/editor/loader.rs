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
//! Loads the controls of an Amplitude project folder into a [`ControlRegistry`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, span, warn, Level};

use super::control::{ControlId, ControlType};
use super::registry::{ControlDefinition, ControlRegistry};
use crate::config::{
    BUSES_CONFIG_FILE, EFFECTS_FOLDER, EVENTS_FOLDER, RTPC_FOLDER, SOUND_BANKS_FOLDER,
    SOUND_BANK_FILE_EXTENSION, SWITCHES_FOLDER,
};

/// Failures reading project files. The loader logs them and moves on to the next file.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse {path}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
}

/// A control as stored in a project JSON file.
#[derive(Debug, Deserialize)]
struct ControlEntry {
    name: String,
    #[serde(default)]
    id: u64,
    #[serde(default)]
    states: Vec<ControlEntry>,
}

#[derive(Debug, Deserialize)]
struct BusesEntry {
    #[serde(default)]
    buses: Vec<ControlEntry>,
}

/// Reads the events, rtpc, switches, effects, sound banks and buses of a project.
pub struct ControlLoader {
    project_path: PathBuf,
}

impl ControlLoader {
    pub fn new(project_path: &Path) -> ControlLoader {
        ControlLoader {
            project_path: project_path.to_path_buf(),
        }
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    /// Loads every control of the project, returning the number of controls loaded.
    pub fn load(&self, registry: &mut ControlRegistry) -> usize {
        let span = span!(Level::INFO, "load controls", project = ?self.project_path);
        let _enter = span.enter();

        let mut count = 0;
        for (folder, kind) in [
            (EVENTS_FOLDER, ControlType::Event),
            (RTPC_FOLDER, ControlType::Rtpc),
            (SWITCHES_FOLDER, ControlType::Switch),
            (EFFECTS_FOLDER, ControlType::Effect),
        ] {
            count += self.load_folder(registry, &self.project_path.join(folder), kind);
        }
        count += self.load_sound_banks(registry);
        count += self.load_buses(registry);

        info!(count, "Loaded controls");
        count
    }

    /// Loads the controls of every file below the folder, descending into subfolders.
    fn load_folder(
        &self,
        registry: &mut ControlRegistry,
        folder: &Path,
        kind: ControlType,
    ) -> usize {
        let mut count = 0;
        for path in sorted_entries(folder) {
            if path.is_dir() {
                count += self.load_folder(registry, &path, kind);
                continue;
            }

            debug!(path = ?path, "Loading controls");
            match read_json::<ControlEntry>(&path) {
                Ok(entry) => count += load_control(registry, &entry, kind, None),
                Err(e) => warn!(err = %e, "Skipping control file"),
            }
        }
        count
    }

    fn load_sound_banks(&self, registry: &mut ControlRegistry) -> usize {
        let mut count = 0;
        for path in sorted_entries(&self.project_path.join(SOUND_BANKS_FOLDER)) {
            if path.is_dir() {
                continue;
            }

            match read_json::<ControlEntry>(&path) {
                Ok(entry) => count += load_control(registry, &entry, ControlType::SoundBank, None),
                Err(e) => warn!(err = %e, "Skipping sound bank file"),
            }
        }
        count
    }

    fn load_buses(&self, registry: &mut ControlRegistry) -> usize {
        let path = self.project_path.join(BUSES_CONFIG_FILE);
        if !path.exists() {
            debug!(path = ?path, "Project has no buses file");
            return 0;
        }

        match read_json::<BusesEntry>(&path) {
            Ok(buses) => buses
                .buses
                .iter()
                .map(|bus| load_control(registry, bus, ControlType::Bus, None))
                .sum(),
            Err(e) => {
                warn!(err = %e, "Skipping buses file");
                0
            }
        }
    }
}

/// Creates the control for an entry, and the states of a switch. Returns the number
/// of controls created or refreshed.
fn load_control(
    registry: &mut ControlRegistry,
    entry: &ControlEntry,
    kind: ControlType,
    parent: Option<ControlId>,
) -> usize {
    let mut name = entry.name.clone();
    if kind == ControlType::SoundBank {
        name.push_str(SOUND_BANK_FILE_EXTENSION);
    }

    let mut definition = ControlDefinition::new(&name, kind);
    definition.parent = parent;
    let id = registry.create_control(definition);
    registry.set_amplitude_id(id, entry.id);
    registry.set_placeholder(id, false);

    let mut count = 1;
    if kind == ControlType::Switch {
        for state in &entry.states {
            count += load_control(registry, state, ControlType::SwitchState, Some(id));
        }
    }
    count
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, EditorError> {
    let data = fs::read(path).map_err(|source| EditorError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&data).map_err(|source| EditorError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Lists a folder in name order. Missing folders are empty.
fn sorted_entries(folder: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(folder = ?folder, err = %e, "Unable to list folder");
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    paths.sort();
    paths
}
