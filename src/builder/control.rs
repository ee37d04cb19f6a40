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
//! Extraction of bank and event references from audio control files.

use tracing::debug;

use super::error::BuildError;
use crate::xml::tags;
use crate::xml::XmlElement;

/// Outcome of reading one section of a control file.
#[derive(Debug)]
pub enum Section {
    /// The section is not present in the document.
    Absent,
    /// The names referenced by the section, in order of appearance.
    Names(Vec<String>),
    /// The section is present but could not be read.
    Malformed(BuildError),
}

impl Section {
    fn from_result(result: Result<Vec<String>, BuildError>) -> Section {
        match result {
            Ok(names) => Section::Names(names),
            Err(e) => Section::Malformed(e),
        }
    }

    /// Returns the names read, or nothing when absent or malformed.
    pub fn names(&self) -> &[String] {
        match self {
            Section::Names(names) => names,
            Section::Absent | Section::Malformed(_) => &[],
        }
    }
}

/// The references found in one audio control file. Immutable once parsed.
#[derive(Debug)]
pub struct ControlDescriptor {
    source_file: String,
    preloads: Section,
    triggers: Section,
}

impl ControlDescriptor {
    /// Reads the preload and trigger sections of a control document. Each section
    /// is read independently: a malformed preload group does not prevent the
    /// triggers from being read.
    pub fn parse(source_file: &str, root: &XmlElement) -> ControlDescriptor {
        let preloads = match root.first_child(tags::PRELOADS_NODE_TAG) {
            Some(node) => Section::from_result(banks_from_preloads(node)),
            None => Section::Absent,
        };
        let triggers = match root.first_child(tags::TRIGGERS_NODE_TAG) {
            Some(node) => Section::from_result(events_from_triggers(node)),
            None => Section::Absent,
        };

        debug!(
            source = source_file,
            banks = preloads.names().len(),
            events = triggers.names().len(),
            "Parsed audio control file"
        );

        ControlDescriptor {
            source_file: source_file.to_string(),
            preloads,
            triggers,
        }
    }

    /// The source file this descriptor was read from.
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// The preload section: referenced bank names.
    pub fn preloads(&self) -> &Section {
        &self.preloads
    }

    /// The trigger section: referenced event names.
    pub fn triggers(&self) -> &Section {
        &self.triggers
    }
}

/// Collects the bank names referenced by every preload request, duplicates included.
pub fn banks_from_preloads(preloads: &XmlElement) -> Result<Vec<String>, BuildError> {
    let mut requests = preloads
        .children_named(tags::ATL_PRELOAD_REQUEST_TAG)
        .peekable();
    if requests.peek().is_none() {
        return Err(BuildError::MissingNode {
            tag: tags::ATL_PRELOAD_REQUEST_TAG,
            what: "preload request",
        });
    }

    let mut banks = Vec::new();
    for request in requests {
        let mut files = request.children_named(tags::FILE_TAG).peekable();
        if files.peek().is_none() {
            return Err(BuildError::MissingNode {
                tag: tags::FILE_TAG,
                what: "bank file",
            });
        }

        for file in files {
            match file.attribute(tags::NAME_ATTRIBUTE) {
                Some(name) => banks.push(name.to_string()),
                None => {
                    return Err(BuildError::MissingAttribute {
                        tag: tags::FILE_TAG,
                        attribute: tags::NAME_ATTRIBUTE,
                    })
                }
            }
        }
    }

    Ok(banks)
}

/// Collects the event names referenced by triggers. A trigger without an event is valid.
pub fn events_from_triggers(triggers: &XmlElement) -> Result<Vec<String>, BuildError> {
    let mut events = Vec::new();
    for trigger in triggers.children_named(tags::ATL_TRIGGER_TAG) {
        let Some(event) = trigger.first_child(tags::EVENT_TAG) else {
            continue;
        };

        match event.attribute(tags::NAME_ATTRIBUTE) {
            Some(name) => events.push(name.to_string()),
            None => {
                return Err(BuildError::MissingAttribute {
                    tag: tags::EVENT_TAG,
                    attribute: tags::NAME_ATTRIBUTE,
                })
            }
        }
    }

    Ok(events)
}
