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
//! The audio engine the adapter drives. The adapter never owns engine state beyond
//! the handle it is constructed with.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::error::EngineError;

pub type EntityId = u64;
pub type ListenerId = u64;
pub type EventId = u64;
pub type RtpcId = u64;
pub type SwitchId = u64;
pub type SwitchStateId = u64;
pub type BusId = u64;
pub type EnvironmentId = u64;
pub type EffectId = u64;
pub type BankId = u64;

/// A three component vector in engine space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Vec3 {
        Vec3 { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Returns the unit vector with the same direction, or the zero vector.
    pub fn normalized(&self) -> Vec3 {
        let length = self.length();
        if length <= f32::EPSILON {
            return Vec3::default();
        }
        Vec3::new(self.x / length, self.y / length, self.z / length)
    }
}

/// Location and orientation of an object or listener in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPosition {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
}

impl WorldPosition {
    pub fn new(position: Vec3, forward: Vec3, up: Vec3) -> WorldPosition {
        WorldPosition {
            position,
            forward,
            up,
        }
    }
}

impl Default for WorldPosition {
    fn default() -> Self {
        WorldPosition {
            position: Vec3::default(),
            forward: Vec3::new(0.0, 1.0, 0.0),
            up: Vec3::new(0.0, 0.0, 1.0),
        }
    }
}

/// A playing event instance inside the engine.
pub trait EventInstance: Send + Sync {
    /// Returns true while the engine still tracks this instance.
    fn is_valid(&self) -> bool;

    /// Stops the instance.
    fn cancel(&self);
}

/// Cancels a playing event instance. An empty canceler is never valid.
#[derive(Clone, Default)]
pub struct EventCanceler {
    instance: Option<Arc<dyn EventInstance>>,
}

impl EventCanceler {
    pub fn new(instance: Arc<dyn EventInstance>) -> EventCanceler {
        EventCanceler {
            instance: Some(instance),
        }
    }

    pub fn empty() -> EventCanceler {
        EventCanceler { instance: None }
    }

    pub fn is_valid(&self) -> bool {
        self.instance
            .as_ref()
            .map(|instance| instance.is_valid())
            .unwrap_or(false)
    }

    /// Cancels the instance. Returns false if there was no valid instance to cancel.
    pub fn cancel(&self) -> bool {
        match &self.instance {
            Some(instance) if instance.is_valid() => {
                instance.cancel();
                true
            }
            _ => false,
        }
    }
}

impl fmt::Debug for EventCanceler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventCanceler")
            .field("valid", &self.is_valid())
            .finish()
    }
}

/// The operations the adapter needs from the Amplitude engine.
pub trait AudioEngine: Send {
    /// Version string of the engine.
    fn version(&self) -> String;

    fn is_initialized(&self) -> bool;

    /// Initializes the engine with the given configuration file.
    fn initialize(&mut self, config_file: &str) -> Result<(), EngineError>;

    fn deinitialize(&mut self);

    /// Advances the engine by the given amount of time.
    fn advance_frame(&mut self, delta: Duration);

    fn pause(&mut self, paused: bool);

    fn set_mute(&mut self, muted: bool);

    /// Stops every playing sound.
    fn stop_all(&mut self);

    /// Loads a sound bank file from the engine file loader.
    fn load_sound_bank(&mut self, file: &str) -> Result<BankId, EngineError>;

    /// Loads a sound bank from memory owned by the caller.
    fn load_sound_bank_from_memory(&mut self, data: &[u8]) -> Result<BankId, EngineError>;

    fn unload_sound_bank(&mut self, bank: BankId);

    fn unload_sound_banks(&mut self);

    fn add_entity(&mut self, entity: EntityId) -> Result<(), EngineError>;

    fn remove_entity(&mut self, entity: EntityId);

    fn has_entity(&self, entity: EntityId) -> bool;

    fn set_entity_location(&mut self, entity: EntityId, location: Vec3) -> Result<(), EngineError>;

    fn set_entity_orientation(
        &mut self,
        entity: EntityId,
        forward: Vec3,
        up: Vec3,
    ) -> Result<(), EngineError>;

    fn set_entity_obstruction(
        &mut self,
        entity: EntityId,
        obstruction: f32,
    ) -> Result<(), EngineError>;

    fn set_entity_occlusion(&mut self, entity: EntityId, occlusion: f32) -> Result<(), EngineError>;

    fn set_entity_environment_factor(
        &mut self,
        entity: EntityId,
        environment: EnvironmentId,
        factor: f32,
    ) -> Result<(), EngineError>;

    fn add_listener(&mut self, listener: ListenerId) -> Result<(), EngineError>;

    fn remove_listener(&mut self, listener: ListenerId);

    fn set_default_listener(&mut self, listener: ListenerId) -> Result<(), EngineError>;

    fn set_listener_location(
        &mut self,
        listener: ListenerId,
        location: Vec3,
    ) -> Result<(), EngineError>;

    fn set_listener_orientation(
        &mut self,
        listener: ListenerId,
        forward: Vec3,
        up: Vec3,
    ) -> Result<(), EngineError>;

    /// Looks an event up by name in the loaded banks.
    fn event_by_name(&self, name: &str) -> Option<EventId>;

    /// Returns true if the event is defined in a loaded bank.
    fn has_event(&self, event: EventId) -> bool;

    /// Starts an event on an entity, or on no entity at all.
    fn trigger(
        &mut self,
        event: EventId,
        entity: Option<EntityId>,
    ) -> Result<EventCanceler, EngineError>;

    fn rtpc_by_name(&self, name: &str) -> Option<RtpcId>;

    fn set_rtpc_value(&mut self, rtpc: RtpcId, value: f64) -> Result<(), EngineError>;

    fn reset_rtpc(&mut self, rtpc: RtpcId) -> Result<(), EngineError>;

    fn set_switch_state(
        &mut self,
        switch: SwitchId,
        state: SwitchStateId,
    ) -> Result<(), EngineError>;

    fn bus_by_name(&self, name: &str) -> Option<BusId>;

    fn has_bus(&self, bus: BusId) -> bool;

    fn add_environment(&mut self, environment: EnvironmentId) -> Result<(), EngineError>;

    fn has_environment(&self, environment: EnvironmentId) -> bool;

    fn has_effect(&self, effect: EffectId) -> bool;

    fn set_environment_effect(
        &mut self,
        environment: EnvironmentId,
        effect: EffectId,
    ) -> Result<(), EngineError>;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    struct Instance {
        valid: AtomicBool,
    }

    impl EventInstance for Instance {
        fn is_valid(&self) -> bool {
            self.valid.load(Ordering::Relaxed)
        }

        fn cancel(&self) {
            self.valid.store(false, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_normalized() {
        let v = Vec3::new(3.0, 0.0, 4.0).normalized();
        assert!((v.length() - 1.0).abs() < 1e-6);
        assert!((v.x - 0.6).abs() < 1e-6);
        assert_eq!(Vec3::default().normalized(), Vec3::default());
    }

    #[test]
    fn test_canceler() {
        assert!(!EventCanceler::empty().is_valid());
        assert!(!EventCanceler::empty().cancel());

        let canceler = EventCanceler::new(Arc::new(Instance {
            valid: AtomicBool::new(true),
        }));
        assert!(canceler.is_valid());
        assert!(canceler.clone().cancel());
        assert!(!canceler.is_valid());
        assert!(!canceler.cancel());
    }
}
