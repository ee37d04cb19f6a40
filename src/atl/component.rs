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
//! The system component hosting the Amplitude audio system.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use super::dispatch::{HandlerId, NotificationDispatcher, SystemNotification};
use super::engine::AudioEngine;
use super::system::{AmplitudeAudioSystem, RequestStatus};
use crate::config::SystemConfig;

/// Creates the audio system and connects it to host notifications while active.
pub struct AudioSystemComponent<E: AudioEngine + 'static> {
    system: Option<Arc<Mutex<AmplitudeAudioSystem<E>>>>,
    handlers: Vec<HandlerId>,
}

impl<E: AudioEngine + 'static> AudioSystemComponent<E> {
    pub fn new() -> AudioSystemComponent<E> {
        AudioSystemComponent {
            system: None,
            handlers: Vec::new(),
        }
    }

    /// Creates the audio system around the engine and initializes it. Fails if a
    /// system already exists; release it first.
    pub fn initialize(&mut self, engine: E, config: SystemConfig) -> RequestStatus {
        if self.system.is_some() {
            warn!("The Amplitude audio system is already created");
            return RequestStatus::Failure;
        }

        let mut system = AmplitudeAudioSystem::new(engine, config);
        let status = system.initialize();
        if status.is_success() {
            info!("Amplitude audio engine created");
        } else {
            warn!("Could not create the Amplitude audio engine");
        }
        self.system = Some(Arc::new(Mutex::new(system)));
        status
    }

    /// Disconnects the audio system from host notifications, shuts it down and drops it.
    pub fn release(&mut self, dispatcher: &mut NotificationDispatcher) {
        self.deactivate(dispatcher);
        if let Some(system) = self.system.take() {
            let mut system = system.lock();
            system.shut_down();
            system.release();
        }
    }

    pub fn system(&self) -> Option<Arc<Mutex<AmplitudeAudioSystem<E>>>> {
        self.system.clone()
    }

    pub fn is_active(&self) -> bool {
        !self.handlers.is_empty()
    }

    /// Connects the audio system to host notifications.
    pub fn activate(&mut self, dispatcher: &mut NotificationDispatcher) {
        let Some(system) = self.system.as_ref() else {
            warn!("Activating the audio component before it was initialized");
            return;
        };
        if self.is_active() {
            return;
        }

        for notification in SystemNotification::ALL {
            let system = system.clone();
            let id = dispatcher.register(notification, move |notification| {
                let mut system = system.lock();
                match notification {
                    SystemNotification::LoseFocus => system.on_lose_focus(),
                    SystemNotification::GetFocus => system.on_get_focus(),
                    SystemNotification::MuteAll => system.on_mute_all(),
                    SystemNotification::UnmuteAll => system.on_unmute_all(),
                    SystemNotification::Refresh => system.on_refresh(),
                }
            });
            self.handlers.push(id);
        }
    }

    /// Disconnects the audio system from host notifications.
    pub fn deactivate(&mut self, dispatcher: &mut NotificationDispatcher) {
        for id in self.handlers.drain(..) {
            dispatcher.unregister(id);
        }
    }
}

impl<E: AudioEngine + 'static> Default for AudioSystemComponent<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atl::mock::MockEngine;

    #[test]
    fn test_notifications_reach_system_while_active() {
        let engine = MockEngine::new("component");
        let mut dispatcher = NotificationDispatcher::new();
        let mut component = AudioSystemComponent::new();

        component.activate(&mut dispatcher);
        assert!(!component.is_active());

        assert!(component
            .initialize(engine.clone(), SystemConfig::default())
            .is_success());
        component.activate(&mut dispatcher);
        assert!(component.is_active());
        assert_eq!(dispatcher.handler_count(), 5);

        dispatcher.dispatch(SystemNotification::MuteAll);
        assert!(engine.is_muted());
        dispatcher.dispatch(SystemNotification::LoseFocus);
        assert!(engine.is_paused());

        component.deactivate(&mut dispatcher);
        assert_eq!(dispatcher.handler_count(), 0);
        dispatcher.dispatch(SystemNotification::UnmuteAll);
        assert!(engine.is_muted());

        component.release(&mut dispatcher);
        assert!(component.system().is_none());
        assert!(!engine.is_initialized());
    }

    #[test]
    fn test_release_while_active_disconnects_notifications() {
        let engine = MockEngine::new("component");
        let mut dispatcher = NotificationDispatcher::new();
        let mut component = AudioSystemComponent::new();

        assert!(component
            .initialize(engine.clone(), SystemConfig::default())
            .is_success());
        component.activate(&mut dispatcher);
        assert_eq!(dispatcher.handler_count(), 5);

        component.release(&mut dispatcher);
        assert!(!component.is_active());
        assert_eq!(dispatcher.handler_count(), 0);
        assert!(!engine.is_initialized());

        assert_eq!(dispatcher.dispatch(SystemNotification::Refresh), 0);
        assert!(!engine.is_initialized());
    }

    #[test]
    fn test_initialize_twice_keeps_first_system() {
        let first = MockEngine::new("first");
        let second = MockEngine::new("second");
        let mut dispatcher = NotificationDispatcher::new();
        let mut component = AudioSystemComponent::new();

        assert!(component
            .initialize(first.clone(), SystemConfig::default())
            .is_success());
        assert_eq!(
            component.initialize(second.clone(), SystemConfig::default()),
            RequestStatus::Failure
        );
        assert!(first.is_initialized());
        assert!(!second.is_initialized());

        component.release(&mut dispatcher);
        assert!(!first.is_initialized());
        assert!(component
            .initialize(second.clone(), SystemConfig::default())
            .is_success());
        assert!(second.is_initialized());
    }
}
