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
//! Implementation data the adapter attaches to translation layer objects.

use std::collections::BTreeMap;

use super::engine::{
    BankId, BusId, EffectId, EntityId, EnvironmentId, EventCanceler, EventId, ListenerId, RtpcId,
    SwitchId, SwitchStateId,
};
use super::error::AdapterError;

/// Identifier of an audio object on the translation layer side.
pub type AudioObjectId = u64;

/// Identifier of an event instance on the translation layer side.
pub type AudioEventId = u64;

/// Identifier of an external audio source.
pub type AudioSourceId = u64;

/// Binds a translation layer audio object to an engine entity.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioObjectBinding {
    entity_id: EntityId,
    has_position: bool,
    environment_amounts: BTreeMap<EnvironmentId, f32>,
    needs_environment_update: bool,
}

impl AudioObjectBinding {
    pub fn new(entity_id: EntityId, has_position: bool) -> AudioObjectBinding {
        AudioObjectBinding {
            entity_id,
            has_position,
            environment_amounts: BTreeMap::new(),
            needs_environment_update: false,
        }
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// True if the object carries a 3D position. Fixed for the binding's lifetime.
    pub fn has_position(&self) -> bool {
        self.has_position
    }

    pub fn environment_amounts(&self) -> &BTreeMap<EnvironmentId, f32> {
        &self.environment_amounts
    }

    pub fn needs_environment_update(&self) -> bool {
        self.needs_environment_update
    }

    pub(super) fn set_environment_amount(&mut self, environment: EnvironmentId, amount: f32) {
        self.environment_amounts.insert(environment, amount);
        self.needs_environment_update = true;
    }

    pub(super) fn reset(&mut self) {
        self.environment_amounts.clear();
        self.needs_environment_update = false;
    }

    pub(super) fn environments_updated(&mut self) {
        self.needs_environment_update = false;
    }
}

/// A listener registered with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerData {
    pub listener_id: ListenerId,
}

/// The engine event a trigger plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerImplData {
    pub event_id: EventId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtpcImplData {
    pub rtpc_id: RtpcId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchStateImplData {
    pub switch_id: SwitchId,
    pub state_id: SwitchStateId,
}

/// What an environment amount applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentImplData {
    /// A bus send.
    Bus { bus_id: BusId },
    /// A switch set to a state while the amount is positive.
    Switch {
        switch_id: SwitchId,
        state_id: SwitchStateId,
    },
    /// An environment effect applied with a per entity factor.
    Effect {
        environment_id: EnvironmentId,
        effect_id: EffectId,
    },
}

/// State of one trigger activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioEventState {
    #[default]
    None,
    Playing,
    Unloading,
}

/// One in-flight playback started by a trigger activation. A `Playing` activation
/// always went through a successful trigger and holds the canceler it returned.
#[derive(Debug, Clone)]
pub struct EventData {
    atl_id: AudioEventId,
    state: AudioEventState,
    canceler: EventCanceler,
    source_id: Option<AudioSourceId>,
}

impl EventData {
    pub fn new(atl_id: AudioEventId) -> EventData {
        EventData {
            atl_id,
            state: AudioEventState::None,
            canceler: EventCanceler::empty(),
            source_id: None,
        }
    }

    pub fn atl_id(&self) -> AudioEventId {
        self.atl_id
    }

    pub fn state(&self) -> AudioEventState {
        self.state
    }

    pub fn canceler(&self) -> &EventCanceler {
        &self.canceler
    }

    pub fn source_id(&self) -> Option<AudioSourceId> {
        self.source_id
    }

    pub(super) fn start(&mut self, canceler: EventCanceler) {
        self.state = AudioEventState::Playing;
        self.canceler = canceler;
    }

    /// Cancels a playing activation and resets it. An activation whose canceler is no
    /// longer valid stays playing.
    pub(super) fn stop(&mut self) -> Result<(), AdapterError> {
        match self.state {
            AudioEventState::Playing => {
                if !self.canceler.cancel() {
                    return Err(AdapterError::InvalidCanceler(self.atl_id));
                }
                self.reset();
                Ok(())
            }
            state => Err(AdapterError::StopUnsupported(state)),
        }
    }

    pub(super) fn reset(&mut self) {
        self.state = AudioEventState::None;
        self.canceler = EventCanceler::empty();
        self.source_id = None;
    }

    #[cfg(test)]
    pub(super) fn set_state(&mut self, state: AudioEventState) {
        self.state = state;
    }
}

/// Engine data of a bank file entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileEntryData {
    pub bank_id: Option<BankId>,
}

/// A bank file entry read from a preload request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileEntryInfo {
    pub file_name: String,
    pub localized: bool,
    pub memory_block_alignment: usize,
    pub impl_data: Option<FileEntryData>,
}
