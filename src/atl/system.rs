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
//! The Amplitude implementation of the audio translation layer. Maps audio objects to
//! engine entities and tracks the lifecycle of the events triggers start.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, error, info, span, warn, Level};

use super::engine::{AudioEngine, BankId, EntityId, ListenerId, WorldPosition};
use super::entities::{
    AudioEventId, AudioObjectBinding, AudioObjectId, EnvironmentImplData, EventData,
    FileEntryData, FileEntryInfo, ListenerData, RtpcImplData, SwitchStateImplData,
    TriggerImplData,
};
use super::error::{AdapterError, EngineError, Severity};
use crate::config::SystemConfig;
use crate::xml::{tags, XmlElement};

/// Alignment of in-memory bank data expected by the engine.
const MEMORY_BLOCK_ALIGNMENT: usize = 16;

/// Outcome of a translation layer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Success,
    Failure,
}

impl RequestStatus {
    pub fn is_success(&self) -> bool {
        *self == RequestStatus::Success
    }
}

impl From<bool> for RequestStatus {
    fn from(success: bool) -> Self {
        if success {
            RequestStatus::Success
        } else {
            RequestStatus::Failure
        }
    }
}

/// How the engine pans its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanningMode {
    Speakers,
    Headphones,
}

/// Logs a failed request at its severity and converts the result into a status.
fn report(operation: &'static str, result: Result<(), AdapterError>) -> RequestStatus {
    match result {
        Ok(()) => RequestStatus::Success,
        Err(e) => {
            match e.severity() {
                Severity::Warning => warn!(operation, err = %e, "Amplitude request failed"),
                Severity::Error => error!(operation, err = %e, "Amplitude request failed"),
            }
            RequestStatus::Failure
        }
    }
}

/// Parses a numeric identifier attribute.
fn id_attribute(node: &XmlElement, attribute: &str) -> Option<u64> {
    let value = node.attribute_ignore_case(attribute)?;
    match value.trim().parse::<u64>() {
        Ok(id) => Some(id),
        Err(_) => {
            warn!(tag = node.name(), attribute, value, "Invalid identifier");
            None
        }
    }
}

/// The Amplitude audio system. Single threaded: the host serializes every request
/// with the per-frame update.
pub struct AmplitudeAudioSystem<E: AudioEngine> {
    engine: E,
    config: SystemConfig,
    objects: HashMap<AudioObjectId, AudioObjectBinding>,
    global_entity: EntityId,
    default_listener: Option<ListenerId>,
    init_bank: Option<BankId>,
    sound_bank_folder: String,
    localized_sound_bank_folder: String,
    language: Option<String>,
}

impl<E: AudioEngine> AmplitudeAudioSystem<E> {
    /// Creates the system around an engine handle. The engine is not initialized yet.
    pub fn new(engine: E, config: SystemConfig) -> AmplitudeAudioSystem<E> {
        let sound_bank_folder = config.banks_path();
        AmplitudeAudioSystem {
            engine,
            global_entity: config.global_object_id(),
            config,
            objects: HashMap::new(),
            default_listener: None,
            init_bank: None,
            localized_sound_bank_folder: sound_bank_folder.clone(),
            sound_bank_folder,
            language: None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Initializes the engine, registers the global entity and loads the init bank.
    pub fn initialize(&mut self) -> RequestStatus {
        let span = span!(Level::INFO, "initialize amplitude");
        let _enter = span.enter();

        if let Err(e) = self.engine.initialize(self.config.engine_config_file()) {
            error!(err = %e, "Amplitude engine has failed to initialize");
            self.shut_down();
            return RequestStatus::Failure;
        }

        if let Err(e) = self.engine.add_entity(self.global_entity) {
            warn!(err = %e, entity = self.global_entity, "Failed to add the global entity");
        }

        self.load_init_bank();
        info!(version = self.engine.version(), "Amplitude engine initialized");
        RequestStatus::Success
    }

    fn load_init_bank(&mut self) {
        let init_bank = self.config.init_bank_file().to_string();
        match self.engine.load_sound_bank(&init_bank) {
            Ok(id) => self.init_bank = Some(id),
            Err(e) => {
                error!(bank = init_bank, err = %e, "Amplitude failed to load the init bank");
                self.init_bank = None;
            }
        }
    }

    /// Releases every engine resource and deinitializes the engine.
    pub fn shut_down(&mut self) -> RequestStatus {
        if self.engine.is_initialized() {
            self.engine.remove_entity(self.global_entity);
            if self.engine.has_entity(self.global_entity) {
                warn!(entity = self.global_entity, "Failed to remove the global entity");
            }
            self.engine.unload_sound_banks();
            self.engine.deinitialize();
        }
        self.init_bank = None;
        self.default_listener = None;
        RequestStatus::Success
    }

    /// Nothing to release: the engine is dropped with the system.
    pub fn release(&mut self) -> RequestStatus {
        RequestStatus::Success
    }

    /// Advances the engine by one host frame.
    pub fn update(&mut self, interval: Duration) {
        if self.engine.is_initialized() {
            self.engine.advance_frame(interval);
        }
    }

    pub fn on_lose_focus(&mut self) {
        if self.engine.is_initialized() {
            self.engine.pause(true);
        }
    }

    pub fn on_get_focus(&mut self) {
        if self.engine.is_initialized() {
            self.engine.pause(false);
        }
    }

    pub fn on_mute_all(&mut self) {
        if self.engine.is_initialized() {
            self.engine.set_mute(true);
        }
    }

    pub fn on_unmute_all(&mut self) {
        if self.engine.is_initialized() {
            self.engine.set_mute(false);
        }
    }

    /// Reloads the init bank, or initializes the engine if it is not yet.
    pub fn on_refresh(&mut self) {
        if !self.engine.is_initialized() {
            self.initialize();
            return;
        }

        if let Some(bank) = self.init_bank.take() {
            self.engine.unload_sound_bank(bank);
        }
        self.load_init_bank();
    }

    pub fn stop_all_sounds(&mut self) -> RequestStatus {
        if !self.engine.is_initialized() {
            return report("stop all sounds", Err(AdapterError::NotInitialized));
        }
        self.engine.stop_all();
        RequestStatus::Success
    }

    /// Creates the data of a positional audio object.
    pub fn new_audio_object_data(&mut self, object_id: AudioObjectId) -> &AudioObjectBinding {
        self.objects
            .entry(object_id)
            .or_insert_with(|| AudioObjectBinding::new(object_id, true))
    }

    /// Creates the data of the global audio object, which has no position.
    pub fn new_global_audio_object_data(
        &mut self,
        object_id: AudioObjectId,
    ) -> &AudioObjectBinding {
        self.objects
            .entry(object_id)
            .or_insert_with(|| AudioObjectBinding::new(object_id, false))
    }

    pub fn delete_audio_object_data(
        &mut self,
        object_id: AudioObjectId,
    ) -> Option<AudioObjectBinding> {
        self.objects.remove(&object_id)
    }

    pub fn audio_object(&self, object_id: AudioObjectId) -> Option<&AudioObjectBinding> {
        self.objects.get(&object_id)
    }

    fn binding(&self, object_id: AudioObjectId) -> Result<&AudioObjectBinding, AdapterError> {
        self.objects
            .get(&object_id)
            .ok_or(AdapterError::MissingObject(object_id))
    }

    fn binding_mut(
        &mut self,
        object_id: AudioObjectId,
    ) -> Result<&mut AudioObjectBinding, AdapterError> {
        self.objects
            .get_mut(&object_id)
            .ok_or(AdapterError::MissingObject(object_id))
    }

    /// Adds the entity of an audio object to the engine.
    pub fn register_audio_object(&mut self, object_id: AudioObjectId, name: &str) -> RequestStatus {
        let result = self.try_register_audio_object(object_id);
        if result.is_ok() {
            debug!(object = object_id, name, "Registered audio object");
        }
        report("register audio object", result)
    }

    fn try_register_audio_object(&mut self, object_id: AudioObjectId) -> Result<(), AdapterError> {
        if !self.engine.is_initialized() {
            return Err(AdapterError::NotInitialized);
        }
        let entity = self.binding(object_id)?.entity_id();
        self.engine.add_entity(entity)?;
        Ok(())
    }

    /// Removes the entity of an audio object from the engine.
    pub fn unregister_audio_object(&mut self, object_id: AudioObjectId) -> RequestStatus {
        let result = self.try_unregister_audio_object(object_id);
        report("unregister audio object", result)
    }

    fn try_unregister_audio_object(
        &mut self,
        object_id: AudioObjectId,
    ) -> Result<(), AdapterError> {
        if !self.engine.is_initialized() {
            return Err(AdapterError::NotInitialized);
        }
        let entity = self.binding(object_id)?.entity_id();
        self.engine.remove_entity(entity);
        if self.engine.has_entity(entity) {
            return Err(AdapterError::EntityNotRemoved(entity));
        }
        Ok(())
    }

    /// Clears the environment amounts of an audio object.
    pub fn reset_audio_object(&mut self, object_id: AudioObjectId) -> RequestStatus {
        let result = self.binding_mut(object_id).map(|binding| binding.reset());
        report("reset audio object", result)
    }

    /// Posts the pending environment amounts of an audio object to its entity.
    pub fn update_audio_object(&mut self, object_id: AudioObjectId) -> RequestStatus {
        let result = self.try_update_audio_object(object_id);
        report("update audio object", result)
    }

    fn try_update_audio_object(&mut self, object_id: AudioObjectId) -> Result<(), AdapterError> {
        let binding = self.binding(object_id)?;
        if !binding.needs_environment_update() {
            return Ok(());
        }

        let entity = binding.entity_id();
        let amounts = binding
            .environment_amounts()
            .iter()
            .map(|(environment, amount)| (*environment, *amount))
            .collect::<Vec<_>>();
        for (environment, amount) in amounts {
            self.engine.set_entity_environment_factor(entity, environment, amount)?;
        }
        self.binding_mut(object_id)?.environments_updated();
        Ok(())
    }

    pub fn prepare_trigger_sync(
        &mut self,
        object_id: AudioObjectId,
        _: &TriggerImplData,
    ) -> RequestStatus {
        debug!(object = object_id, "Prepare trigger sync");
        RequestStatus::Success
    }

    pub fn unprepare_trigger_sync(
        &mut self,
        object_id: AudioObjectId,
        _: &TriggerImplData,
    ) -> RequestStatus {
        debug!(object = object_id, "Unprepare trigger sync");
        RequestStatus::Success
    }

    pub fn prepare_trigger_async(
        &mut self,
        object_id: AudioObjectId,
        _: &TriggerImplData,
        _: &mut EventData,
    ) -> RequestStatus {
        debug!(object = object_id, "Prepare trigger async");
        RequestStatus::Success
    }

    pub fn unprepare_trigger_async(
        &mut self,
        object_id: AudioObjectId,
        _: &TriggerImplData,
        _: &mut EventData,
    ) -> RequestStatus {
        debug!(object = object_id, "Unprepare trigger async");
        RequestStatus::Success
    }

    /// Starts the event of a trigger. Positional objects play on their own entity;
    /// every other object plays on the global entity.
    pub fn activate_trigger(
        &mut self,
        object_id: AudioObjectId,
        trigger: &TriggerImplData,
        event: &mut EventData,
    ) -> RequestStatus {
        let result = self.try_activate_trigger(object_id, trigger, event);
        report("activate trigger", result)
    }

    fn try_activate_trigger(
        &mut self,
        object_id: AudioObjectId,
        trigger: &TriggerImplData,
        event: &mut EventData,
    ) -> Result<(), AdapterError> {
        let binding = self.binding(object_id)?;
        let entity_id = if binding.has_position() {
            binding.entity_id()
        } else {
            self.global_entity
        };

        if !self.engine.has_event(trigger.event_id) {
            return Err(AdapterError::EventNotFound(trigger.event_id));
        }

        let entity = if self.engine.has_entity(entity_id) {
            Some(entity_id)
        } else {
            debug!(entity = entity_id, "Unable to find an entity, playing without one");
            None
        };

        let canceler = self
            .engine
            .trigger(trigger.event_id, entity)
            .map_err(|e| match e {
                EngineError::UnknownEvent(id) => AdapterError::EventNotFound(id),
                _ => AdapterError::TriggerDeclined(trigger.event_id),
            })?;
        if !canceler.is_valid() {
            return Err(AdapterError::TriggerDeclined(trigger.event_id));
        }

        event.start(canceler);
        debug!(
            object = object_id,
            event = trigger.event_id,
            entity = ?entity,
            "Activated trigger"
        );
        Ok(())
    }

    /// Stops a playing event and resets its activation.
    pub fn stop_event(&mut self, object_id: AudioObjectId, event: &mut EventData) -> RequestStatus {
        let result = event.stop();
        if result.is_ok() {
            debug!(object = object_id, event = event.atl_id(), "Stopped event");
        }
        report("stop event", result)
    }

    /// The host owns the activations of an object and stops them one by one.
    pub fn stop_all_events(&mut self, object_id: AudioObjectId) -> RequestStatus {
        debug!(object = object_id, "Stop all events");
        RequestStatus::Success
    }

    /// Moves and orients the entity of an audio object.
    pub fn set_position(
        &mut self,
        object_id: AudioObjectId,
        position: &WorldPosition,
    ) -> RequestStatus {
        let result = self.try_set_position(object_id, position);
        report("set position", result)
    }

    fn try_set_position(
        &mut self,
        object_id: AudioObjectId,
        position: &WorldPosition,
    ) -> Result<(), AdapterError> {
        let entity = self.binding(object_id)?.entity_id();
        self.engine.set_entity_location(entity, position.position)?;
        self.engine.set_entity_orientation(
            entity,
            position.forward.normalized(),
            position.up.normalized(),
        )?;
        Ok(())
    }

    /// Multiple positions per object are not supported by the engine.
    pub fn set_multiple_positions(
        &mut self,
        object_id: AudioObjectId,
        positions: &[WorldPosition],
    ) -> RequestStatus {
        debug!(object = object_id, positions = positions.len(), "Ignoring multiple positions");
        RequestStatus::Success
    }

    /// Applies an environment amount to an audio object.
    pub fn set_environment(
        &mut self,
        object_id: AudioObjectId,
        environment: &EnvironmentImplData,
        amount: f32,
    ) -> RequestStatus {
        let result = self.try_set_environment(object_id, environment, amount);
        report("set environment", result)
    }

    fn try_set_environment(
        &mut self,
        object_id: AudioObjectId,
        environment: &EnvironmentImplData,
        amount: f32,
    ) -> Result<(), AdapterError> {
        let entity = self.binding(object_id)?.entity_id();
        match *environment {
            EnvironmentImplData::Bus { bus_id } => {
                if !self.engine.has_bus(bus_id) {
                    debug!(bus = bus_id, "Bus environment not found");
                }
                Ok(())
            }
            EnvironmentImplData::Switch {
                switch_id,
                state_id,
            } => {
                if amount > 0.0 {
                    self.engine.set_switch_state(switch_id, state_id)?;
                }
                Ok(())
            }
            EnvironmentImplData::Effect { environment_id, .. } => {
                if !self.engine.has_environment(environment_id) {
                    return Err(EngineError::UnknownEnvironment(environment_id).into());
                }
                self.engine
                    .set_entity_environment_factor(entity, environment_id, amount)?;
                let binding = self.binding_mut(object_id)?;
                binding.set_environment_amount(environment_id, amount);
                binding.environments_updated();
                Ok(())
            }
        }
    }

    pub fn set_rtpc(
        &mut self,
        object_id: AudioObjectId,
        rtpc: &RtpcImplData,
        value: f32,
    ) -> RequestStatus {
        debug!(object = object_id, rtpc = rtpc.rtpc_id, value, "Set rtpc");
        let result = self
            .engine
            .set_rtpc_value(rtpc.rtpc_id, f64::from(value))
            .map_err(AdapterError::from);
        report("set rtpc", result)
    }

    pub fn reset_rtpc(&mut self, object_id: AudioObjectId, rtpc: &RtpcImplData) -> RequestStatus {
        debug!(object = object_id, rtpc = rtpc.rtpc_id, "Reset rtpc");
        let result = self
            .engine
            .reset_rtpc(rtpc.rtpc_id)
            .map_err(|_| AdapterError::RtpcNotFound(rtpc.rtpc_id));
        report("reset rtpc", result)
    }

    pub fn set_switch_state(
        &mut self,
        object_id: AudioObjectId,
        switch_state: &SwitchStateImplData,
    ) -> RequestStatus {
        debug!(
            object = object_id,
            switch = switch_state.switch_id,
            state = switch_state.state_id,
            "Set switch state"
        );
        let result = self
            .engine
            .set_switch_state(switch_state.switch_id, switch_state.state_id)
            .map_err(AdapterError::from);
        report("set switch state", result)
    }

    pub fn set_obstruction_occlusion(
        &mut self,
        object_id: AudioObjectId,
        obstruction: f32,
        occlusion: f32,
    ) -> RequestStatus {
        let result = self.try_set_obstruction_occlusion(object_id, obstruction, occlusion);
        report("set obstruction and occlusion", result)
    }

    fn try_set_obstruction_occlusion(
        &mut self,
        object_id: AudioObjectId,
        obstruction: f32,
        occlusion: f32,
    ) -> Result<(), AdapterError> {
        let entity = self.binding(object_id)?.entity_id();
        self.engine.set_entity_obstruction(entity, obstruction)?;
        self.engine.set_entity_occlusion(entity, occlusion)?;
        Ok(())
    }

    /// Creates the default listener, which the engine renders from.
    pub fn new_default_listener_data(&mut self, listener_id: ListenerId) -> ListenerData {
        let listener = ListenerData { listener_id };
        let result = self
            .engine
            .add_listener(listener_id)
            .and_then(|_| self.engine.set_default_listener(listener_id));
        match result {
            Ok(()) => self.default_listener = Some(listener_id),
            Err(e) => warn!(
                listener = listener_id,
                err = %e,
                "Failed to register the default listener"
            ),
        }
        listener
    }

    pub fn new_listener_data(&mut self, listener_id: ListenerId) -> ListenerData {
        if let Err(e) = self.engine.add_listener(listener_id) {
            warn!(listener = listener_id, err = %e, "Failed to register a listener");
        }
        ListenerData { listener_id }
    }

    pub fn delete_listener_data(&mut self, listener: ListenerData) {
        self.engine.remove_listener(listener.listener_id);
        if self.default_listener == Some(listener.listener_id) {
            self.default_listener = None;
        }
    }

    pub fn default_listener(&self) -> Option<ListenerId> {
        self.default_listener
    }

    pub fn set_listener_position(
        &mut self,
        listener: &ListenerData,
        position: &WorldPosition,
    ) -> RequestStatus {
        let result = self
            .engine
            .set_listener_location(listener.listener_id, position.position)
            .and_then(|_| {
                self.engine.set_listener_orientation(
                    listener.listener_id,
                    position.forward.normalized(),
                    position.up.normalized(),
                )
            })
            .map_err(|e| match e {
                EngineError::UnknownListener(id) => AdapterError::MissingListener(id),
                e => AdapterError::from(e),
            });
        report("set listener position", result)
    }

    pub fn new_audio_event_data(&self, event_id: AudioEventId) -> EventData {
        EventData::new(event_id)
    }

    /// Returns an activation to its initial state.
    pub fn reset_audio_event_data(&self, event: &mut EventData) {
        event.reset();
    }

    /// Reads a bank file entry from an `AmplitudeFile` node.
    pub fn parse_audio_file_entry(&self, node: &XmlElement) -> Option<FileEntryInfo> {
        if !node.is(tags::FILE_TAG) {
            return None;
        }

        let name = node.attribute_ignore_case(tags::NAME_ATTRIBUTE).unwrap_or("");
        if name.is_empty() {
            warn!(tag = node.name(), "Audio file entry has no name");
            return None;
        }

        let bank_id = id_attribute(node, tags::ID_ATTRIBUTE);
        let localized = node
            .attribute_ignore_case(tags::LOCALIZED_ATTRIBUTE)
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Some(FileEntryInfo {
            file_name: name.to_string(),
            localized,
            memory_block_alignment: MEMORY_BLOCK_ALIGNMENT,
            impl_data: Some(FileEntryData { bank_id }),
        })
    }

    /// The folder a bank file entry is read from.
    pub fn audio_file_location(&self, entry: &FileEntryInfo) -> &str {
        if entry.localized {
            &self.localized_sound_bank_folder
        } else {
            &self.sound_bank_folder
        }
    }

    /// Loads a bank the host read into memory.
    pub fn register_in_memory_file(
        &mut self,
        entry: &mut FileEntryInfo,
        data: &[u8],
    ) -> RequestStatus {
        let result = self.try_register_in_memory_file(entry, data);
        report("register in memory file", result)
    }

    fn try_register_in_memory_file(
        &mut self,
        entry: &mut FileEntryInfo,
        data: &[u8],
    ) -> Result<(), AdapterError> {
        let Some(impl_data) = entry.impl_data.as_mut() else {
            return Err(AdapterError::InvalidFileEntry("no Amplitude data"));
        };

        match self.engine.load_sound_bank_from_memory(data) {
            Ok(bank) => {
                impl_data.bank_id = Some(bank);
                debug!(file = entry.file_name, bank, "Loaded soundbank from memory");
                Ok(())
            }
            Err(e) => {
                impl_data.bank_id = None;
                Err(AdapterError::BankLoad {
                    file: entry.file_name.clone(),
                    source: e,
                })
            }
        }
    }

    pub fn unregister_in_memory_file(&mut self, entry: &FileEntryInfo) -> RequestStatus {
        let result = match entry.impl_data {
            Some(FileEntryData { bank_id: Some(bank) }) => {
                self.engine.unload_sound_bank(bank);
                Ok(())
            }
            Some(FileEntryData { bank_id: None }) => Ok(()),
            None => Err(AdapterError::InvalidFileEntry("no Amplitude data")),
        };
        report("unregister in memory file", result)
    }

    /// Resolves an `AmplitudeEvent` node to the event it names.
    pub fn new_trigger_data(&self, node: &XmlElement) -> Option<TriggerImplData> {
        if !node.is(tags::EVENT_TAG) {
            return None;
        }
        let name = node.attribute_ignore_case(tags::NAME_ATTRIBUTE)?;
        match self.engine.event_by_name(name) {
            Some(event_id) => Some(TriggerImplData { event_id }),
            None => {
                debug!(event = name, "Event not found in loaded banks");
                None
            }
        }
    }

    /// Resolves an `AmplitudeRtpc` node to the RTPC it names.
    pub fn new_rtpc_data(&self, node: &XmlElement) -> Option<RtpcImplData> {
        if !node.is(tags::RTPC_TAG) {
            return None;
        }
        let name = node.attribute_ignore_case(tags::NAME_ATTRIBUTE)?;
        self.engine
            .rtpc_by_name(name)
            .map(|rtpc_id| RtpcImplData { rtpc_id })
    }

    /// Reads an `AmplitudeSwitch` node and the state nested in it.
    pub fn new_switch_state_data(&self, node: &XmlElement) -> Option<SwitchStateImplData> {
        if !node.is(tags::SWITCH_TAG) {
            return None;
        }
        let (switch_id, state_id) = Self::switch_and_state(node)?;
        Some(SwitchStateImplData {
            switch_id,
            state_id,
        })
    }

    fn switch_and_state(node: &XmlElement) -> Option<(u64, u64)> {
        let switch_id = id_attribute(node, tags::ID_ATTRIBUTE)?;
        let state = node.first_element()?;
        let state_id = id_attribute(state, tags::ID_ATTRIBUTE)?;
        Some((switch_id, state_id))
    }

    /// Reads an environment node: a bus by name, a switch state, or an environment
    /// with the effect it applies.
    pub fn new_environment_data(&mut self, node: &XmlElement) -> Option<EnvironmentImplData> {
        if node.is(tags::BUS_TAG) {
            let name = node.attribute_ignore_case(tags::NAME_ATTRIBUTE)?;
            return self
                .engine
                .bus_by_name(name)
                .map(|bus_id| EnvironmentImplData::Bus { bus_id });
        }

        if node.is(tags::SWITCH_TAG) {
            let (switch_id, state_id) = Self::switch_and_state(node)?;
            return Some(EnvironmentImplData::Switch {
                switch_id,
                state_id,
            });
        }

        if node.is(tags::ENVIRONMENT_TAG) {
            let environment_id = id_attribute(node, tags::ID_ATTRIBUTE)?;
            let effect_id = id_attribute(node, tags::VALUE_ATTRIBUTE)?;
            if let Err(e) = self.engine.add_environment(environment_id) {
                warn!(environment = environment_id, err = %e, "Failed to add environment");
                return None;
            }
            if !self.engine.has_effect(effect_id) {
                debug!(effect = effect_id, "Effect not found in loaded banks");
                return None;
            }
            if let Err(e) = self.engine.set_environment_effect(environment_id, effect_id) {
                warn!(environment = environment_id, err = %e, "Failed to set environment effect");
                return None;
            }
            return Some(EnvironmentImplData::Effect {
                environment_id,
                effect_id,
            });
        }

        None
    }

    pub fn impl_sub_path(&self) -> &str {
        self.config.impl_sub_path()
    }

    /// Engine version and the folder banks are read from.
    pub fn implementation_name(&self) -> String {
        format!("{} ({})", self.engine.version(), self.sound_bank_folder)
    }

    /// Localized banks are read from the same folder until the engine supports languages.
    pub fn set_language(&mut self, language: &str) {
        debug!(language, "Set language");
        self.language = Some(language.to_string());
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn set_panning_mode(&mut self, mode: PanningMode) {
        debug!(mode = ?mode, "Panning mode is not supported");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atl::engine::Vec3;
    use crate::atl::entities::AudioEventState;
    use crate::atl::mock::MockEngine;
    use crate::config::GLOBAL_AUDIO_OBJECT_ID;

    const EXPLOSION: u64 = 100;
    const FOOTSTEP: u64 = 101;

    fn system(engine: &MockEngine) -> AmplitudeAudioSystem<MockEngine> {
        let mut system = AmplitudeAudioSystem::new(engine.clone(), SystemConfig::default());
        assert_eq!(system.initialize(), RequestStatus::Success);
        system
    }

    fn engine() -> MockEngine {
        MockEngine::new("test")
            .with_event("explosion", EXPLOSION)
            .with_event("footstep", FOOTSTEP)
    }

    #[test]
    fn test_initialize_loads_init_bank_and_global_entity() {
        let engine = engine();
        let system = system(&engine);
        assert!(engine.entity(GLOBAL_AUDIO_OBJECT_ID).is_some());
        assert_eq!(engine.loaded_banks(), vec!["init.ambank"]);
        assert!(system.implementation_name().contains("test (Mock)"));
        assert!(system
            .implementation_name()
            .contains("sounds/amplitude_assets/soundbanks/"));
    }

    #[test]
    fn test_initialize_failure() {
        let engine = MockEngine::new("test").failing_initialization();
        let mut system = AmplitudeAudioSystem::new(engine.clone(), SystemConfig::default());
        assert_eq!(system.initialize(), RequestStatus::Failure);
        assert!(!engine.is_initialized());
    }

    #[test]
    fn test_missing_init_bank_is_not_fatal() {
        let engine = engine().failing_bank("init.ambank");
        let mut system = AmplitudeAudioSystem::new(engine.clone(), SystemConfig::default());
        assert_eq!(system.initialize(), RequestStatus::Success);
        assert!(engine.loaded_banks().is_empty());
    }

    #[test]
    fn test_positional_activation_plays_on_own_entity() {
        let engine = engine();
        let mut system = system(&engine);
        system.new_audio_object_data(42);
        assert!(system.register_audio_object(42, "door").is_success());

        let mut event = system.new_audio_event_data(7);
        let status = system.activate_trigger(
            42,
            &TriggerImplData {
                event_id: EXPLOSION,
            },
            &mut event,
        );

        assert_eq!(status, RequestStatus::Success);
        assert_eq!(event.state(), AudioEventState::Playing);
        assert!(event.canceler().is_valid());
        let instances = engine.instances();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].event(), EXPLOSION);
        assert_eq!(instances[0].entity(), Some(42));
    }

    #[test]
    fn test_non_positional_activation_plays_on_global_entity() {
        let engine = engine();
        let mut system = system(&engine);
        system.new_global_audio_object_data(9);

        let mut event = system.new_audio_event_data(1);
        let status =
            system.activate_trigger(9, &TriggerImplData { event_id: FOOTSTEP }, &mut event);

        assert_eq!(status, RequestStatus::Success);
        assert_eq!(engine.instances()[0].entity(), Some(GLOBAL_AUDIO_OBJECT_ID));
    }

    #[test]
    fn test_activation_of_missing_event_stays_none() {
        let engine = engine();
        let mut system = system(&engine);
        system.new_global_audio_object_data(9);

        let mut event = system.new_audio_event_data(1);
        let trigger = TriggerImplData { event_id: 555 };
        assert_eq!(
            system.try_activate_trigger(9, &trigger, &mut event),
            Err(AdapterError::EventNotFound(555))
        );
        assert_eq!(AdapterError::EventNotFound(555).severity(), Severity::Warning);

        assert_eq!(
            system.activate_trigger(9, &trigger, &mut event),
            RequestStatus::Failure
        );
        assert_eq!(event.state(), AudioEventState::None);
        assert!(!event.canceler().is_valid());
        assert!(engine.instances().is_empty());
    }

    #[test]
    fn test_activation_without_binding_fails() {
        let engine = engine();
        let mut system = system(&engine);
        let mut event = system.new_audio_event_data(1);
        let trigger = TriggerImplData {
            event_id: EXPLOSION,
        };
        assert_eq!(
            system.try_activate_trigger(77, &trigger, &mut event),
            Err(AdapterError::MissingObject(77))
        );
        assert_eq!(event.state(), AudioEventState::None);
    }

    #[test]
    fn test_declined_activation_stays_none() {
        let engine = engine().declining(EXPLOSION);
        let mut system = system(&engine);
        system.new_audio_object_data(42);
        system.register_audio_object(42, "door");

        let mut event = system.new_audio_event_data(1);
        let trigger = TriggerImplData {
            event_id: EXPLOSION,
        };
        assert_eq!(
            system.try_activate_trigger(42, &trigger, &mut event),
            Err(AdapterError::TriggerDeclined(EXPLOSION))
        );
        assert_eq!(event.state(), AudioEventState::None);
    }

    #[test]
    fn test_stop_playing_event() {
        let engine = engine();
        let mut system = system(&engine);
        system.new_global_audio_object_data(9);
        let mut event = system.new_audio_event_data(1);
        system.activate_trigger(
            9,
            &TriggerImplData {
                event_id: EXPLOSION,
            },
            &mut event,
        );

        assert_eq!(system.stop_event(9, &mut event), RequestStatus::Success);
        assert_eq!(event.state(), AudioEventState::None);
        assert!(!event.canceler().is_valid());
        assert!(engine.instances()[0].is_cancelled());
    }

    #[test]
    fn test_stop_with_invalid_canceler_keeps_playing() {
        let engine = engine();
        let mut system = system(&engine);
        system.new_global_audio_object_data(9);
        let mut event = system.new_audio_event_data(3);
        system.activate_trigger(
            9,
            &TriggerImplData {
                event_id: EXPLOSION,
            },
            &mut event,
        );

        engine.instances()[0].invalidate();

        assert_eq!(system.stop_event(9, &mut event), RequestStatus::Failure);
        assert_eq!(AdapterError::InvalidCanceler(3).severity(), Severity::Error);
        assert_eq!(event.state(), AudioEventState::Playing);
        assert!(!engine.instances()[0].is_cancelled());
    }

    #[test]
    fn test_stop_in_other_states_is_unsupported() {
        let engine = engine();
        let mut system = system(&engine);
        let mut event = system.new_audio_event_data(3);
        assert_eq!(system.stop_event(9, &mut event), RequestStatus::Failure);

        event.set_state(AudioEventState::Unloading);
        assert_eq!(system.stop_event(9, &mut event), RequestStatus::Failure);
        assert_eq!(event.state(), AudioEventState::Unloading);
        assert_eq!(
            AdapterError::StopUnsupported(AudioEventState::Unloading).severity(),
            Severity::Error
        );
    }

    #[test]
    fn test_reset_event_data() {
        let engine = engine();
        let mut system = system(&engine);
        system.new_global_audio_object_data(9);
        let mut event = system.new_audio_event_data(1);
        system.activate_trigger(9, &TriggerImplData { event_id: FOOTSTEP }, &mut event);

        system.reset_audio_event_data(&mut event);
        assert_eq!(event.state(), AudioEventState::None);
        assert!(!event.canceler().is_valid());
        assert_eq!(event.source_id(), None);
    }

    #[test]
    fn test_register_and_unregister_objects() {
        let engine = engine();
        let mut system = system(&engine);
        assert_eq!(system.register_audio_object(5, "missing"), RequestStatus::Failure);

        let binding = system.new_audio_object_data(5);
        assert!(binding.has_position());
        assert_eq!(binding.entity_id(), 5);
        assert!(system.register_audio_object(5, "crate").is_success());
        assert!(engine.entity(5).is_some());
        assert!(system.unregister_audio_object(5).is_success());
        assert!(engine.entity(5).is_none());
        assert!(system.delete_audio_object_data(5).is_some());
        assert!(system.audio_object(5).is_none());
    }

    #[test]
    fn test_register_requires_initialized_engine() {
        let engine = engine();
        let mut system = AmplitudeAudioSystem::new(engine.clone(), SystemConfig::default());
        system.new_audio_object_data(5);
        assert_eq!(
            system.try_register_audio_object(5),
            Err(AdapterError::NotInitialized)
        );
    }

    #[test]
    fn test_set_position_normalizes_orientation() {
        let engine = engine();
        let mut system = system(&engine);
        system.new_audio_object_data(5);
        system.register_audio_object(5, "crate");

        let position = WorldPosition::new(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
        );
        assert!(system.set_position(5, &position).is_success());

        let entity = engine.entity(5).unwrap();
        assert_eq!(entity.location, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(entity.forward, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(entity.up, Vec3::new(0.0, 0.0, 1.0));

        system.new_audio_object_data(6);
        assert_eq!(system.set_position(6, &position), RequestStatus::Failure);
    }

    #[test]
    fn test_obstruction_occlusion() {
        let engine = engine();
        let mut system = system(&engine);
        system.new_audio_object_data(5);
        system.register_audio_object(5, "crate");
        assert!(system.set_obstruction_occlusion(5, 0.25, 0.5).is_success());
        let entity = engine.entity(5).unwrap();
        assert_eq!(entity.obstruction, 0.25);
        assert_eq!(entity.occlusion, 0.5);
    }

    #[test]
    fn test_environments() {
        let engine = engine().with_bus("reverb", 12).with_effect(30);
        let mut system = system(&engine);
        system.new_audio_object_data(5);
        system.register_audio_object(5, "crate");

        let bus = system
            .new_environment_data(
                &XmlElement::new(tags::BUS_TAG).with_attribute(tags::NAME_ATTRIBUTE, "reverb"),
            )
            .unwrap();
        assert_eq!(bus, EnvironmentImplData::Bus { bus_id: 12 });
        assert!(system.set_environment(5, &bus, 0.5).is_success());

        let switch = system
            .new_environment_data(
                &XmlElement::new(tags::SWITCH_TAG)
                    .with_attribute(tags::ID_ATTRIBUTE, "3")
                    .with_child(
                        XmlElement::new(tags::STATE_TAG).with_attribute(tags::ID_ATTRIBUTE, "4"),
                    ),
            )
            .unwrap();
        assert!(system.set_environment(5, &switch, 0.0).is_success());
        assert_eq!(engine.switch_state(3), None);
        assert!(system.set_environment(5, &switch, 1.0).is_success());
        assert_eq!(engine.switch_state(3), Some(4));

        let effect = system
            .new_environment_data(
                &XmlElement::new(tags::ENVIRONMENT_TAG)
                    .with_attribute(tags::ID_ATTRIBUTE, "20")
                    .with_attribute(tags::VALUE_ATTRIBUTE, "30"),
            )
            .unwrap();
        assert_eq!(engine.environment_effect(20), Some(30));
        assert!(system.set_environment(5, &effect, 0.75).is_success());
        assert_eq!(engine.entity(5).unwrap().environment_factors.get(&20), Some(&0.75));
        assert_eq!(
            system.audio_object(5).unwrap().environment_amounts().get(&20),
            Some(&0.75)
        );

        assert!(system.reset_audio_object(5).is_success());
        assert!(system.audio_object(5).unwrap().environment_amounts().is_empty());
    }

    #[test]
    fn test_environment_with_unknown_effect() {
        let engine = engine();
        let mut system = system(&engine);
        let node = XmlElement::new(tags::ENVIRONMENT_TAG)
            .with_attribute(tags::ID_ATTRIBUTE, "20")
            .with_attribute(tags::VALUE_ATTRIBUTE, "30");
        assert_eq!(system.new_environment_data(&node), None);
        assert_eq!(system.new_environment_data(&XmlElement::new("Unknown")), None);
    }

    #[test]
    fn test_rtpc_and_switch_state() {
        let engine = engine().with_rtpc("speed", 8);
        let mut system = system(&engine);

        let rtpc = system
            .new_rtpc_data(
                &XmlElement::new(tags::RTPC_TAG).with_attribute(tags::NAME_ATTRIBUTE, "speed"),
            )
            .unwrap();
        assert_eq!(rtpc.rtpc_id, 8);
        assert!(system.set_rtpc(1, &rtpc, 0.5).is_success());
        assert_eq!(engine.rtpc_value(8), Some(0.5));
        assert!(system.reset_rtpc(1, &rtpc).is_success());
        assert_eq!(engine.rtpc_value(8), None);
        assert_eq!(
            system.reset_rtpc(1, &RtpcImplData { rtpc_id: 99 }),
            RequestStatus::Failure
        );

        let switch_state = system
            .new_switch_state_data(
                &XmlElement::new(tags::SWITCH_TAG)
                    .with_attribute(tags::ID_ATTRIBUTE, "3")
                    .with_child(
                        XmlElement::new(tags::STATE_TAG).with_attribute(tags::ID_ATTRIBUTE, "5"),
                    ),
            )
            .unwrap();
        assert!(system.set_switch_state(1, &switch_state).is_success());
        assert_eq!(engine.switch_state(3), Some(5));

        assert_eq!(
            system.new_switch_state_data(
                &XmlElement::new(tags::SWITCH_TAG).with_attribute(tags::ID_ATTRIBUTE, "3")
            ),
            None
        );
    }

    #[test]
    fn test_trigger_data_by_name() {
        let engine = engine();
        let system = system(&engine);
        let node =
            XmlElement::new(tags::EVENT_TAG).with_attribute(tags::NAME_ATTRIBUTE, "explosion");
        assert_eq!(
            system.new_trigger_data(&node),
            Some(TriggerImplData {
                event_id: EXPLOSION
            })
        );
        let node = XmlElement::new(tags::EVENT_TAG).with_attribute(tags::NAME_ATTRIBUTE, "missing");
        assert_eq!(system.new_trigger_data(&node), None);
        let node =
            XmlElement::new(tags::RTPC_TAG).with_attribute(tags::NAME_ATTRIBUTE, "explosion");
        assert_eq!(system.new_trigger_data(&node), None);
    }

    #[test]
    fn test_listeners() {
        let engine = engine();
        let mut system = system(&engine);
        let listener = system.new_default_listener_data(2);
        assert_eq!(system.default_listener(), Some(2));
        assert_eq!(engine.default_listener(), Some(2));

        let position = WorldPosition::new(
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 3.0),
        );
        assert!(system.set_listener_position(&listener, &position).is_success());
        assert_eq!(engine.listener(2).unwrap().forward, Vec3::new(1.0, 0.0, 0.0));

        let other = system.new_listener_data(3);
        assert_eq!(system.default_listener(), Some(2));
        system.delete_listener_data(other);
        system.delete_listener_data(listener);
        assert_eq!(system.default_listener(), None);
        assert_eq!(
            system.set_listener_position(&listener, &position),
            RequestStatus::Failure
        );
    }

    #[test]
    fn test_file_entries() {
        let engine = engine();
        let mut system = system(&engine);

        let node = XmlElement::new(tags::FILE_TAG)
            .with_attribute("AMPLITUDE_NAME", "weapons.ambank")
            .with_attribute(tags::ID_ATTRIBUTE, "14")
            .with_attribute(tags::LOCALIZED_ATTRIBUTE, "TRUE");
        let mut entry = system.parse_audio_file_entry(&node).unwrap();
        assert_eq!(entry.file_name, "weapons.ambank");
        assert!(entry.localized);
        assert_eq!(entry.impl_data, Some(FileEntryData { bank_id: Some(14) }));
        assert_eq!(
            system.audio_file_location(&entry),
            "sounds/amplitude_assets/soundbanks/"
        );

        assert!(system.register_in_memory_file(&mut entry, b"bank").is_success());
        let bank = entry.impl_data.unwrap().bank_id.unwrap();
        assert_eq!(engine.loaded_banks().len(), 2);
        assert!(system.unregister_in_memory_file(&entry).is_success());
        assert_eq!(engine.loaded_banks().len(), 1);
        assert_ne!(bank, 0);

        assert_eq!(
            system.register_in_memory_file(&mut entry, b""),
            RequestStatus::Failure
        );
        assert_eq!(entry.impl_data, Some(FileEntryData { bank_id: None }));

        let nameless = XmlElement::new(tags::FILE_TAG).with_attribute(tags::ID_ATTRIBUTE, "1");
        assert_eq!(system.parse_audio_file_entry(&nameless), None);
        let mut bare = FileEntryInfo::default();
        assert_eq!(
            system.register_in_memory_file(&mut bare, b"bank"),
            RequestStatus::Failure
        );
    }

    #[test]
    fn test_notifications() {
        let engine = engine();
        let mut system = system(&engine);

        system.on_lose_focus();
        assert!(engine.is_paused());
        system.on_get_focus();
        assert!(!engine.is_paused());
        system.on_mute_all();
        assert!(engine.is_muted());
        system.on_unmute_all();
        assert!(!engine.is_muted());

        system.update(Duration::from_millis(16));
        assert_eq!(engine.elapsed(), Duration::from_millis(16));

        system.on_refresh();
        assert_eq!(engine.loaded_banks(), vec!["init.ambank"]);

        assert!(system.stop_all_sounds().is_success());
        assert_eq!(engine.stop_all_count(), 1);

        system.shut_down();
        assert!(!engine.is_initialized());
        assert_eq!(system.stop_all_sounds(), RequestStatus::Failure);

        system.on_refresh();
        assert!(engine.is_initialized());
    }

    #[test]
    fn test_update_audio_object() {
        let engine = engine();
        let mut system = system(&engine);
        assert_eq!(system.update_audio_object(5), RequestStatus::Failure);
        system.new_audio_object_data(5);
        assert!(system.update_audio_object(5).is_success());
    }
}
