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
//! Fixture writers shared by the builder and editor tests.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;

use crate::config::BuilderConfig;
use crate::xml::{tags, XmlElement};

/// Builds the XML text of an audio control file.
pub struct ControlFileBuilder {
    preloads: Vec<XmlElement>,
    triggers: Vec<XmlElement>,
}

impl ControlFileBuilder {
    pub fn new() -> ControlFileBuilder {
        ControlFileBuilder {
            preloads: Vec::new(),
            triggers: Vec::new(),
        }
    }

    /// Adds a preload request referencing the given banks.
    pub fn preload(mut self, name: &str, banks: &[&str]) -> ControlFileBuilder {
        let mut request = XmlElement::new(tags::ATL_PRELOAD_REQUEST_TAG)
            .with_attribute(tags::ATL_NAME_ATTRIBUTE, name);
        for bank in banks {
            request.push_child(
                XmlElement::new(tags::FILE_TAG).with_attribute(tags::NAME_ATTRIBUTE, bank),
            );
        }
        self.preloads.push(request);
        self
    }

    /// Adds a trigger, optionally connected to an event.
    pub fn trigger(mut self, name: &str, event: Option<&str>) -> ControlFileBuilder {
        let mut trigger =
            XmlElement::new(tags::ATL_TRIGGER_TAG).with_attribute(tags::ATL_NAME_ATTRIBUTE, name);
        if let Some(event) = event {
            trigger.push_child(
                XmlElement::new(tags::EVENT_TAG).with_attribute(tags::NAME_ATTRIBUTE, event),
            );
        }
        self.triggers.push(trigger);
        self
    }

    pub fn build(self) -> String {
        let mut root = XmlElement::new("ATLConfig");
        if !self.preloads.is_empty() {
            let mut preloads = XmlElement::new(tags::PRELOADS_NODE_TAG);
            for preload in self.preloads {
                preloads.push_child(preload);
            }
            root.push_child(preloads);
        }
        if !self.triggers.is_empty() {
            let mut triggers = XmlElement::new(tags::TRIGGERS_NODE_TAG);
            for trigger in self.triggers {
                triggers.push_child(trigger);
            }
            root.push_child(triggers);
        }
        root.to_xml_string().unwrap()
    }
}

/// Writes a control file below the watch folder and returns its full path.
pub fn write_control(watch_folder: &Path, source_file: &str, contents: &str) -> PathBuf {
    let path = watch_folder.join(source_file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// Writes the metadata of a bank into the project below the watch folder.
pub fn write_bank_metadata(
    watch_folder: &Path,
    config: &BuilderConfig,
    bank: &str,
    events: &[&str],
) -> PathBuf {
    let folder = watch_folder
        .join(config.project_path())
        .join(config.soundbanks_folder());
    fs::create_dir_all(&folder).unwrap();
    let path = folder.join(format!("{}.json", bank));
    fs::write(
        &path,
        serde_json::to_vec_pretty(&json!({ "name": bank, "events": events })).unwrap(),
    )
    .unwrap();
    path
}

/// Writes a JSON file, creating its parent folders.
pub fn write_json(path: &Path, value: &serde_json::Value) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}
