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
//! Middleware controls shown by the audio controls editor.

use crate::xml::tags;

/// Identifies a control inside the registry. Never zero.
pub type ControlId = u64;

/// The kind of an Amplitude control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlType {
    Event,
    Rtpc,
    SoundBank,
    Switch,
    SwitchState,
    Bus,
    Effect,
}

impl ControlType {
    /// Maps an XML tag to a control type. States map to their switch.
    pub fn from_tag(tag: &str) -> Option<ControlType> {
        match tag {
            tags::EVENT_TAG => Some(ControlType::Event),
            tags::RTPC_TAG => Some(ControlType::Rtpc),
            tags::BUS_TAG => Some(ControlType::Bus),
            tags::FILE_TAG => Some(ControlType::SoundBank),
            tags::SWITCH_TAG | tags::STATE_TAG => Some(ControlType::Switch),
            tags::ENVIRONMENT_TAG => Some(ControlType::Effect),
            _ => None,
        }
    }

    /// The XML tag written for connections to this type.
    pub fn tag(&self) -> &'static str {
        match self {
            ControlType::Event => tags::EVENT_TAG,
            ControlType::Rtpc => tags::RTPC_TAG,
            ControlType::Switch => tags::SWITCH_TAG,
            ControlType::Bus => tags::BUS_TAG,
            ControlType::SoundBank => tags::FILE_TAG,
            ControlType::SwitchState => tags::SWITCH_STATE_TAG,
            ControlType::Effect => tags::ENVIRONMENT_TAG,
        }
    }

    /// The translation layer control this type is connected to.
    pub fn atl_type(&self) -> AtlControlType {
        match self {
            ControlType::Event => AtlControlType::Trigger,
            ControlType::Rtpc => AtlControlType::Rtpc,
            ControlType::SwitchState => AtlControlType::SwitchState,
            ControlType::Effect | ControlType::Bus => AtlControlType::Environment,
            ControlType::SoundBank => AtlControlType::Preload,
            ControlType::Switch => AtlControlType::Switch,
        }
    }
}

/// The kinds of translation layer controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtlControlType {
    Trigger,
    Rtpc,
    Switch,
    SwitchState,
    Environment,
    Preload,
}

impl AtlControlType {
    /// The middleware control types that can be connected to this control.
    pub fn compatible_types(&self) -> &'static [ControlType] {
        match self {
            AtlControlType::Trigger => &[ControlType::Event],
            AtlControlType::Rtpc => &[ControlType::Rtpc],
            AtlControlType::Switch => &[ControlType::Switch],
            AtlControlType::SwitchState => &[ControlType::SwitchState],
            AtlControlType::Environment => &[
                ControlType::Bus,
                ControlType::SwitchState,
                ControlType::Effect,
            ],
            AtlControlType::Preload => &[ControlType::SoundBank],
        }
    }
}

/// A control of the Amplitude project.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemControl {
    id: ControlId,
    name: String,
    kind: ControlType,
    amplitude_id: u64,
    parent: Option<ControlId>,
    children: Vec<ControlId>,
    localized: bool,
    placeholder: bool,
    connected: bool,
}

impl SystemControl {
    pub(super) fn new(
        id: ControlId,
        name: &str,
        kind: ControlType,
        parent: Option<ControlId>,
    ) -> SystemControl {
        SystemControl {
            id,
            name: name.to_string(),
            kind,
            amplitude_id: 0,
            parent,
            children: Vec::new(),
            localized: false,
            placeholder: false,
            connected: false,
        }
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ControlType {
        self.kind
    }

    /// The identifier of the object inside the Amplitude project.
    pub fn amplitude_id(&self) -> u64 {
        self.amplitude_id
    }

    pub fn parent(&self) -> Option<ControlId> {
        self.parent
    }

    pub fn children(&self) -> &[ControlId] {
        &self.children
    }

    pub fn is_localized(&self) -> bool {
        self.localized
    }

    /// True if the control is referenced by a connection but absent from the project.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub(super) fn set_amplitude_id(&mut self, id: u64) {
        self.amplitude_id = id;
    }

    pub(super) fn add_child(&mut self, child: ControlId) {
        self.children.push(child);
    }

    pub(super) fn set_localized(&mut self, localized: bool) {
        self.localized = localized;
    }

    pub(super) fn set_placeholder(&mut self, placeholder: bool) {
        self.placeholder = placeholder;
    }

    pub(super) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}
