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
//! An in-memory engine. Doesn't actually play anything, but records every request so
//! the adapter's behavior can be observed.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use super::engine::{
    AudioEngine, BankId, BusId, EffectId, EntityId, EnvironmentId, EventCanceler, EventId,
    EventInstance, ListenerId, RtpcId, SwitchId, SwitchStateId, Vec3,
};
use super::error::EngineError;

/// A playing mock event instance.
#[derive(Debug)]
pub struct MockInstance {
    event: EventId,
    entity: Option<EntityId>,
    valid: AtomicBool,
    cancelled: AtomicBool,
}

impl MockInstance {
    pub fn event(&self) -> EventId {
        self.event
    }

    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Makes the engine forget the instance, as if it had been dropped behind the adapter's back.
    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::Relaxed);
    }
}

impl EventInstance for MockInstance {
    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Relaxed)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
        self.valid.store(false, Ordering::Relaxed);
    }
}

/// The spatial state of a mock entity or listener.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MockSpatial {
    pub location: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub obstruction: f32,
    pub occlusion: f32,
    pub environment_factors: BTreeMap<EnvironmentId, f32>,
}

#[derive(Default)]
struct MockState {
    initialized: bool,
    fail_initialization: bool,
    paused: bool,
    muted: bool,
    elapsed: Duration,
    stop_all_count: usize,

    next_bank_id: BankId,
    banks: BTreeMap<BankId, String>,
    failing_banks: HashSet<String>,

    entities: HashMap<EntityId, MockSpatial>,
    listeners: HashMap<ListenerId, MockSpatial>,
    default_listener: Option<ListenerId>,

    events: HashMap<String, EventId>,
    declined_events: HashSet<EventId>,
    instances: Vec<Arc<MockInstance>>,

    rtpcs: HashMap<String, RtpcId>,
    rtpc_values: HashMap<RtpcId, f64>,
    switch_states: HashMap<SwitchId, SwitchStateId>,
    buses: HashMap<String, BusId>,
    environments: HashMap<EnvironmentId, Option<EffectId>>,
    effects: HashSet<EffectId>,
}

/// A mock engine. Clones share the same state.
#[derive(Clone)]
pub struct MockEngine {
    name: String,
    state: Arc<Mutex<MockState>>,
}

impl MockEngine {
    pub fn new(name: &str) -> MockEngine {
        MockEngine {
            name: name.to_string(),
            state: Arc::new(Mutex::new(MockState {
                next_bank_id: 1,
                ..Default::default()
            })),
        }
    }

    /// Defines an event that loaded banks contain.
    pub fn with_event(self, name: &str, id: EventId) -> MockEngine {
        self.state.lock().events.insert(name.to_string(), id);
        self
    }

    pub fn with_rtpc(self, name: &str, id: RtpcId) -> MockEngine {
        self.state.lock().rtpcs.insert(name.to_string(), id);
        self
    }

    pub fn with_bus(self, name: &str, id: BusId) -> MockEngine {
        self.state.lock().buses.insert(name.to_string(), id);
        self
    }

    pub fn with_effect(self, id: EffectId) -> MockEngine {
        self.state.lock().effects.insert(id);
        self
    }

    /// Makes the engine refuse to start the given event.
    pub fn declining(self, event: EventId) -> MockEngine {
        self.state.lock().declined_events.insert(event);
        self
    }

    /// Makes loading the given bank file fail.
    pub fn failing_bank(self, file: &str) -> MockEngine {
        self.state.lock().failing_banks.insert(file.to_string());
        self
    }

    /// Makes initialization fail.
    pub fn failing_initialization(self) -> MockEngine {
        self.state.lock().fail_initialization = true;
        self
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    pub fn is_muted(&self) -> bool {
        self.state.lock().muted
    }

    pub fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }

    pub fn stop_all_count(&self) -> usize {
        self.state.lock().stop_all_count
    }

    /// The loaded bank files, in load order.
    pub fn loaded_banks(&self) -> Vec<String> {
        self.state.lock().banks.values().cloned().collect()
    }

    pub fn entity(&self, entity: EntityId) -> Option<MockSpatial> {
        self.state.lock().entities.get(&entity).cloned()
    }

    pub fn listener(&self, listener: ListenerId) -> Option<MockSpatial> {
        self.state.lock().listeners.get(&listener).cloned()
    }

    pub fn default_listener(&self) -> Option<ListenerId> {
        self.state.lock().default_listener
    }

    /// Every instance started so far.
    pub fn instances(&self) -> Vec<Arc<MockInstance>> {
        self.state.lock().instances.clone()
    }

    pub fn rtpc_value(&self, rtpc: RtpcId) -> Option<f64> {
        self.state.lock().rtpc_values.get(&rtpc).copied()
    }

    pub fn switch_state(&self, switch: SwitchId) -> Option<SwitchStateId> {
        self.state.lock().switch_states.get(&switch).copied()
    }

    pub fn environment_effect(&self, environment: EnvironmentId) -> Option<EffectId> {
        self.state.lock().environments.get(&environment).copied().flatten()
    }
}

impl AudioEngine for MockEngine {
    fn version(&self) -> String {
        format!("{} (Mock)", self.name)
    }

    fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    fn initialize(&mut self, config_file: &str) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        if state.fail_initialization {
            return Err(EngineError::Initialization(config_file.to_string()));
        }
        info!(engine = self.name, config_file, "Initialized mock engine");
        state.initialized = true;
        Ok(())
    }

    fn deinitialize(&mut self) {
        let mut state = self.state.lock();
        state.initialized = false;
        state.entities.clear();
        state.listeners.clear();
        state.default_listener = None;
    }

    fn advance_frame(&mut self, delta: Duration) {
        self.state.lock().elapsed += delta;
    }

    fn pause(&mut self, paused: bool) {
        self.state.lock().paused = paused;
    }

    fn set_mute(&mut self, muted: bool) {
        self.state.lock().muted = muted;
    }

    fn stop_all(&mut self) {
        let mut state = self.state.lock();
        state.stop_all_count += 1;
        for instance in state.instances.iter() {
            instance.cancel();
        }
    }

    fn load_sound_bank(&mut self, file: &str) -> Result<BankId, EngineError> {
        let mut state = self.state.lock();
        if state.failing_banks.contains(file) {
            return Err(EngineError::BankLoad(file.to_string()));
        }
        let id = state.next_bank_id;
        state.next_bank_id += 1;
        state.banks.insert(id, file.to_string());
        debug!(file, id, "Loaded mock bank");
        Ok(id)
    }

    fn load_sound_bank_from_memory(&mut self, data: &[u8]) -> Result<BankId, EngineError> {
        if data.is_empty() {
            return Err(EngineError::BankLoad("<memory>".to_string()));
        }
        let mut state = self.state.lock();
        let id = state.next_bank_id;
        state.next_bank_id += 1;
        state.banks.insert(id, format!("<memory:{}>", data.len()));
        Ok(id)
    }

    fn unload_sound_bank(&mut self, bank: BankId) {
        self.state.lock().banks.remove(&bank);
    }

    fn unload_sound_banks(&mut self) {
        self.state.lock().banks.clear();
    }

    fn add_entity(&mut self, entity: EntityId) -> Result<(), EngineError> {
        self.state.lock().entities.entry(entity).or_default();
        Ok(())
    }

    fn remove_entity(&mut self, entity: EntityId) {
        self.state.lock().entities.remove(&entity);
    }

    fn has_entity(&self, entity: EntityId) -> bool {
        self.state.lock().entities.contains_key(&entity)
    }

    fn set_entity_location(&mut self, entity: EntityId, location: Vec3) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        let spatial = state
            .entities
            .get_mut(&entity)
            .ok_or(EngineError::UnknownEntity(entity))?;
        spatial.location = location;
        Ok(())
    }

    fn set_entity_orientation(
        &mut self,
        entity: EntityId,
        forward: Vec3,
        up: Vec3,
    ) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        let spatial = state
            .entities
            .get_mut(&entity)
            .ok_or(EngineError::UnknownEntity(entity))?;
        spatial.forward = forward;
        spatial.up = up;
        Ok(())
    }

    fn set_entity_obstruction(
        &mut self,
        entity: EntityId,
        obstruction: f32,
    ) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        let spatial = state
            .entities
            .get_mut(&entity)
            .ok_or(EngineError::UnknownEntity(entity))?;
        spatial.obstruction = obstruction;
        Ok(())
    }

    fn set_entity_occlusion(
        &mut self,
        entity: EntityId,
        occlusion: f32,
    ) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        let spatial = state
            .entities
            .get_mut(&entity)
            .ok_or(EngineError::UnknownEntity(entity))?;
        spatial.occlusion = occlusion;
        Ok(())
    }

    fn set_entity_environment_factor(
        &mut self,
        entity: EntityId,
        environment: EnvironmentId,
        factor: f32,
    ) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        let spatial = state
            .entities
            .get_mut(&entity)
            .ok_or(EngineError::UnknownEntity(entity))?;
        spatial.environment_factors.insert(environment, factor);
        Ok(())
    }

    fn add_listener(&mut self, listener: ListenerId) -> Result<(), EngineError> {
        self.state.lock().listeners.entry(listener).or_default();
        Ok(())
    }

    fn remove_listener(&mut self, listener: ListenerId) {
        let mut state = self.state.lock();
        state.listeners.remove(&listener);
        if state.default_listener == Some(listener) {
            state.default_listener = None;
        }
    }

    fn set_default_listener(&mut self, listener: ListenerId) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        if !state.listeners.contains_key(&listener) {
            return Err(EngineError::UnknownListener(listener));
        }
        state.default_listener = Some(listener);
        Ok(())
    }

    fn set_listener_location(
        &mut self,
        listener: ListenerId,
        location: Vec3,
    ) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        let spatial = state
            .listeners
            .get_mut(&listener)
            .ok_or(EngineError::UnknownListener(listener))?;
        spatial.location = location;
        Ok(())
    }

    fn set_listener_orientation(
        &mut self,
        listener: ListenerId,
        forward: Vec3,
        up: Vec3,
    ) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        let spatial = state
            .listeners
            .get_mut(&listener)
            .ok_or(EngineError::UnknownListener(listener))?;
        spatial.forward = forward;
        spatial.up = up;
        Ok(())
    }

    fn event_by_name(&self, name: &str) -> Option<EventId> {
        self.state.lock().events.get(name).copied()
    }

    fn has_event(&self, event: EventId) -> bool {
        self.state.lock().events.values().any(|id| *id == event)
    }

    fn trigger(
        &mut self,
        event: EventId,
        entity: Option<EntityId>,
    ) -> Result<EventCanceler, EngineError> {
        let mut state = self.state.lock();
        if !state.events.values().any(|id| *id == event) {
            return Err(EngineError::UnknownEvent(event));
        }
        if state.declined_events.contains(&event) {
            return Err(EngineError::Declined(event));
        }

        let instance = Arc::new(MockInstance {
            event,
            entity,
            valid: AtomicBool::new(true),
            cancelled: AtomicBool::new(false),
        });
        state.instances.push(instance.clone());
        debug!(event, entity = ?entity, "Triggered mock event");
        Ok(EventCanceler::new(instance))
    }

    fn rtpc_by_name(&self, name: &str) -> Option<RtpcId> {
        self.state.lock().rtpcs.get(name).copied()
    }

    fn set_rtpc_value(&mut self, rtpc: RtpcId, value: f64) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        if !state.rtpcs.values().any(|id| *id == rtpc) {
            return Err(EngineError::UnknownRtpc(rtpc));
        }
        state.rtpc_values.insert(rtpc, value);
        Ok(())
    }

    fn reset_rtpc(&mut self, rtpc: RtpcId) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        if !state.rtpcs.values().any(|id| *id == rtpc) {
            return Err(EngineError::UnknownRtpc(rtpc));
        }
        state.rtpc_values.remove(&rtpc);
        Ok(())
    }

    fn set_switch_state(
        &mut self,
        switch: SwitchId,
        state_id: SwitchStateId,
    ) -> Result<(), EngineError> {
        self.state.lock().switch_states.insert(switch, state_id);
        Ok(())
    }

    fn bus_by_name(&self, name: &str) -> Option<BusId> {
        self.state.lock().buses.get(name).copied()
    }

    fn has_bus(&self, bus: BusId) -> bool {
        self.state.lock().buses.values().any(|id| *id == bus)
    }

    fn add_environment(&mut self, environment: EnvironmentId) -> Result<(), EngineError> {
        self.state.lock().environments.entry(environment).or_default();
        Ok(())
    }

    fn has_environment(&self, environment: EnvironmentId) -> bool {
        self.state.lock().environments.contains_key(&environment)
    }

    fn has_effect(&self, effect: EffectId) -> bool {
        self.state.lock().effects.contains(&effect)
    }

    fn set_environment_effect(
        &mut self,
        environment: EnvironmentId,
        effect: EffectId,
    ) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        if !state.effects.contains(&effect) {
            return Err(EngineError::UnknownEffect(effect));
        }
        let slot = state
            .environments
            .get_mut(&environment)
            .ok_or(EngineError::UnknownEnvironment(environment))?;
        *slot = Some(effect);
        Ok(())
    }
}
