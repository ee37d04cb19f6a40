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
//! The Amplitude backend of the audio translation layer.

pub mod component;
pub mod dispatch;
pub mod engine;
pub mod entities;
pub mod error;
pub mod mock;
pub mod system;

pub use component::AudioSystemComponent;
pub use dispatch::{HandlerId, NotificationDispatcher, SystemNotification};
pub use engine::{AudioEngine, EventCanceler, EventInstance, Vec3, WorldPosition};
pub use entities::{
    AudioEventState, AudioObjectBinding, EnvironmentImplData, EventData, FileEntryInfo,
    ListenerData, RtpcImplData, SwitchStateImplData, TriggerImplData,
};
pub use error::{AdapterError, EngineError, Severity};
pub use system::{AmplitudeAudioSystem, PanningMode, RequestStatus};
