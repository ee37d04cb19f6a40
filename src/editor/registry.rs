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
//! The controls of an Amplitude project and their connections to translation layer controls.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use super::control::{AtlControlType, ControlId, ControlType, SystemControl};
use crate::xml::{tags, XmlElement};

/// Describes a control to create.
#[derive(Debug, Clone)]
pub struct ControlDefinition {
    pub name: String,
    pub kind: ControlType,
    pub localized: bool,
    pub parent: Option<ControlId>,
    pub path: Option<String>,
}

impl ControlDefinition {
    pub fn new(name: &str, kind: ControlType) -> ControlDefinition {
        ControlDefinition {
            name: name.to_string(),
            kind,
            localized: false,
            parent: None,
            path: None,
        }
    }

    pub fn with_parent(mut self, parent: ControlId) -> ControlDefinition {
        self.parent = Some(parent);
        self
    }
}

/// A connection between a translation layer control and a middleware control.
#[derive(Debug, Clone, PartialEq)]
pub enum Connection {
    Plain { control: ControlId },
    Rtpc { control: ControlId, mult: f32, shift: f32 },
    SwitchState { control: ControlId, state: u64 },
    Effect { control: ControlId, effect: u64 },
}

impl Connection {
    pub fn control(&self) -> ControlId {
        match self {
            Connection::Plain { control }
            | Connection::Rtpc { control, .. }
            | Connection::SwitchState { control, .. }
            | Connection::Effect { control, .. } => *control,
        }
    }
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), name)
    }
}

fn parse_attribute<T: std::str::FromStr>(node: &XmlElement, attribute: &str, default: T) -> T {
    match node.attribute_ignore_case(attribute) {
        Some(value) => value.trim().parse::<T>().unwrap_or_else(|_| {
            warn!(tag = node.name(), attribute, value, "Invalid attribute value");
            default
        }),
        None => default,
    }
}

/// Every known control, keyed by id. Names map to ids for the lifetime of the
/// registry, so a reloaded control keeps its id.
#[derive(Debug, Default)]
pub struct ControlRegistry {
    controls: BTreeMap<ControlId, SystemControl>,
    ids: HashMap<String, ControlId>,
    roots: Vec<ControlId>,
    connections: HashMap<ControlId, usize>,
    localization_folder: String,
}

impl ControlRegistry {
    pub const NAME: &'static str = "Amplitude";

    pub fn new() -> ControlRegistry {
        ControlRegistry::default()
    }

    /// Returns the id of a full control name, assigning a new one for unknown names.
    fn id(&mut self, full_name: &str) -> ControlId {
        let next = self.ids.len() as ControlId + 1;
        *self.ids.entry(full_name.to_string()).or_insert(next)
    }

    /// Creates a control, or returns the existing control with the same full name
    /// after clearing its placeholder state.
    pub fn create_control(&mut self, definition: ControlDefinition) -> ControlId {
        let mut full_name = definition.name.clone();
        if let Some(parent) = definition.parent.and_then(|id| self.controls.get(&id)) {
            full_name = join(parent.name(), &full_name);
        }
        if let Some(path) = definition.path.as_deref() {
            full_name = join(path, &full_name);
        }

        let id = self.id(&full_name);
        if let Some(control) = self.controls.get_mut(&id) {
            if control.is_placeholder() {
                control.set_placeholder(false);
                if let Some(parent) = definition.parent.and_then(|p| self.controls.get_mut(&p)) {
                    parent.set_placeholder(false);
                }
            }
            return id;
        }

        let mut control =
            SystemControl::new(id, &definition.name, definition.kind, definition.parent);
        control.set_localized(definition.localized);
        match definition.parent.and_then(|p| self.controls.get_mut(&p)) {
            Some(parent) => parent.add_child(id),
            None => self.roots.push(id),
        }
        self.controls.insert(id, control);
        debug!(id, name = full_name, kind = ?definition.kind, "Created control");
        id
    }

    pub fn control(&self, id: ControlId) -> Option<&SystemControl> {
        self.controls.get(&id)
    }

    /// Finds a control by name, optionally below a parent or inside the localization folder.
    pub fn control_by_name(
        &self,
        name: &str,
        localized: bool,
        parent: Option<ControlId>,
    ) -> Option<ControlId> {
        let mut full_name = name.to_string();
        if let Some(parent) = parent.and_then(|id| self.controls.get(&id)) {
            full_name = join(parent.name(), &full_name);
        }
        if localized {
            full_name = join(&self.localization_folder, &full_name);
        }

        self.ids
            .get(&full_name)
            .copied()
            .filter(|id| self.controls.contains_key(id))
    }

    /// The controls without a parent, in creation order.
    pub fn roots(&self) -> &[ControlId] {
        &self.roots
    }

    pub fn controls(&self) -> impl Iterator<Item = &SystemControl> {
        self.controls.values()
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub(super) fn set_amplitude_id(&mut self, id: ControlId, amplitude_id: u64) {
        if let Some(control) = self.controls.get_mut(&id) {
            control.set_amplitude_id(amplitude_id);
        }
    }

    pub(super) fn set_placeholder(&mut self, id: ControlId, placeholder: bool) {
        if let Some(control) = self.controls.get_mut(&id) {
            control.set_placeholder(placeholder);
        }
    }

    pub(super) fn set_localized(&mut self, id: ControlId, localized: bool) {
        if let Some(control) = self.controls.get_mut(&id) {
            control.set_localized(localized);
        }
    }

    /// Marks every control as a placeholder and runs the given load. Controls the load
    /// does not find again stay placeholders.
    pub fn reload<F>(&mut self, load: F)
    where
        F: FnOnce(&mut ControlRegistry),
    {
        for control in self.controls.values_mut() {
            control.set_placeholder(true);
        }

        load(self);

        self.connections.clear();
        self.update_connected_status();
    }

    fn connect(&mut self, id: ControlId) {
        if let Some(control) = self.controls.get_mut(&id) {
            control.set_connected(true);
        }
        *self.connections.entry(id).or_default() += 1;
    }

    /// Connects a translation layer control to a middleware control.
    pub fn create_connection_to_control(
        &mut self,
        atl_type: AtlControlType,
        id: ControlId,
    ) -> Option<Connection> {
        let kind = self.controls.get(&id)?.kind();
        self.connect(id);

        if kind == ControlType::Rtpc {
            match atl_type {
                AtlControlType::Rtpc => {
                    return Some(Connection::Rtpc {
                        control: id,
                        mult: 1.0,
                        shift: 0.0,
                    })
                }
                AtlControlType::SwitchState => {
                    return Some(Connection::SwitchState {
                        control: id,
                        state: 0,
                    })
                }
                AtlControlType::Environment => {
                    return Some(Connection::Effect {
                        control: id,
                        effect: 0,
                    })
                }
                _ => {}
            }
        }

        Some(Connection::Plain { control: id })
    }

    /// Reads a connection from a control file node. Controls missing from the project
    /// are created as placeholders so the connection stays visible.
    pub fn create_connection_from_xml(
        &mut self,
        node: &XmlElement,
        atl_type: AtlControlType,
    ) -> Option<Connection> {
        let kind = ControlType::from_tag(node.name())?;

        let name = node.attribute_ignore_case(tags::NAME_ATTRIBUTE).unwrap_or("");
        let localized = node
            .attribute_ignore_case(tags::LOCALIZED_ATTRIBUTE)
            .map(|value| value == "true")
            .unwrap_or(false);

        let mut id = match self.control_by_name(name, localized, None) {
            Some(id) => id,
            None => {
                let id = self.create_control(ControlDefinition::new(name, kind));
                self.set_placeholder(id, true);
                self.set_localized(id, localized);
                id
            }
        };

        if kind == ControlType::Switch {
            if let Some(state) = node.first_element() {
                let state_name = state.attribute_ignore_case(tags::NAME_ATTRIBUTE).unwrap_or("");
                id = match self.control_by_name(state_name, false, Some(id)) {
                    Some(state_id) => state_id,
                    None => self.create_control(
                        ControlDefinition::new(state_name, ControlType::SwitchState)
                            .with_parent(id),
                    ),
                };
            }
        }

        self.connect(id);

        let connection = match (kind, atl_type) {
            (ControlType::Rtpc, AtlControlType::Rtpc) => Connection::Rtpc {
                control: id,
                mult: parse_attribute(node, tags::MULTIPLIER_ATTRIBUTE, 1.0),
                shift: parse_attribute(node, tags::SHIFT_ATTRIBUTE, 0.0),
            },
            (ControlType::Rtpc, AtlControlType::SwitchState) => Connection::SwitchState {
                control: id,
                state: parse_attribute(node, tags::VALUE_ATTRIBUTE, 0),
            },
            (ControlType::Effect, _) => Connection::Effect {
                control: id,
                effect: parse_attribute(node, tags::VALUE_ATTRIBUTE, 0),
            },
            _ => Connection::Plain { control: id },
        };
        Some(connection)
    }

    /// Writes a connection as a control file node.
    pub fn create_xml_node_from_connection(
        &self,
        connection: &Connection,
        atl_type: AtlControlType,
    ) -> Option<XmlElement> {
        let control = self.controls.get(&connection.control())?;
        let id = control.amplitude_id().to_string();

        match control.kind() {
            ControlType::Switch | ControlType::SwitchState => {
                let parent = control.parent().and_then(|p| self.controls.get(&p))?;
                let state = XmlElement::new(tags::SWITCH_STATE_TAG)
                    .with_attribute(tags::NAME_ATTRIBUTE, control.name())
                    .with_attribute(tags::ID_ATTRIBUTE, &id);
                Some(
                    XmlElement::new(parent.kind().tag())
                        .with_attribute(tags::ID_ATTRIBUTE, &parent.amplitude_id().to_string())
                        .with_attribute(tags::NAME_ATTRIBUTE, parent.name())
                        .with_child(state),
                )
            }
            ControlType::Rtpc => {
                let mut node = XmlElement::new(control.kind().tag())
                    .with_attribute(tags::ID_ATTRIBUTE, &id)
                    .with_attribute(tags::NAME_ATTRIBUTE, control.name());
                match (atl_type, connection) {
                    (AtlControlType::Rtpc, Connection::Rtpc { mult, shift, .. }) => {
                        if *mult != 1.0 {
                            node = node
                                .with_attribute(tags::MULTIPLIER_ATTRIBUTE, &mult.to_string());
                        }
                        if *shift != 0.0 {
                            node = node.with_attribute(tags::SHIFT_ATTRIBUTE, &shift.to_string());
                        }
                    }
                    (AtlControlType::SwitchState, Connection::SwitchState { state, .. }) => {
                        node = node.with_attribute(tags::VALUE_ATTRIBUTE, &state.to_string());
                    }
                    _ => {}
                }
                Some(node)
            }
            ControlType::Event | ControlType::Bus => Some(
                XmlElement::new(control.kind().tag())
                    .with_attribute(tags::ID_ATTRIBUTE, &id)
                    .with_attribute(tags::NAME_ATTRIBUTE, control.name()),
            ),
            ControlType::Effect => {
                let effect = match connection {
                    Connection::Effect { effect, .. } => *effect,
                    _ => 0,
                };
                Some(
                    XmlElement::new(control.kind().tag())
                        .with_attribute(tags::ID_ATTRIBUTE, &id)
                        .with_attribute(tags::VALUE_ATTRIBUTE, &effect.to_string())
                        .with_attribute(tags::NAME_ATTRIBUTE, control.name()),
                )
            }
            ControlType::SoundBank => {
                let mut node = XmlElement::new(control.kind().tag())
                    .with_attribute(tags::ID_ATTRIBUTE, &id)
                    .with_attribute(tags::NAME_ATTRIBUTE, control.name());
                if control.is_localized() {
                    node = node.with_attribute(tags::LOCALIZED_ATTRIBUTE, "true");
                }
                Some(node)
            }
        }
    }

    /// Records that a connection to the control was removed.
    pub fn connection_removed(&mut self, id: ControlId) {
        let count = self.connections.entry(id).or_default();
        *count = count.saturating_sub(1);
        if *count == 0 {
            if let Some(control) = self.controls.get_mut(&id) {
                control.set_connected(false);
            }
        }
    }

    /// Marks every control with at least one connection as connected.
    pub fn update_connected_status(&mut self) {
        for (id, count) in self.connections.iter() {
            if *count > 0 {
                if let Some(control) = self.controls.get_mut(id) {
                    control.set_connected(true);
                }
            }
        }
    }
}
