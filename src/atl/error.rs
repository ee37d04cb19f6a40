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
use super::engine::{BusId, EffectId, EntityId, EnvironmentId, EventId, ListenerId, RtpcId};
use super::entities::{AudioEventState, AudioObjectId};

/// Failures reported by the audio engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("the engine failed to initialize with {0}")]
    Initialization(String),

    #[error("the engine is not initialized")]
    NotInitialized,

    #[error("failed to load soundbank {0}")]
    BankLoad(String),

    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),

    #[error("listener {0} does not exist")]
    UnknownListener(ListenerId),

    #[error("event {0} does not exist")]
    UnknownEvent(EventId),

    #[error("rtpc {0} does not exist")]
    UnknownRtpc(RtpcId),

    #[error("environment {0} does not exist")]
    UnknownEnvironment(EnvironmentId),

    #[error("effect {0} does not exist")]
    UnknownEffect(EffectId),

    #[error("bus {0} does not exist")]
    UnknownBus(BusId),

    #[error("the engine declined to start event {0}")]
    Declined(EventId),
}

/// How loudly an adapter failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Failures of adapter requests. None of these cross the adapter boundary: they are
/// logged and turned into a failed request status.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdapterError {
    #[error("the audio engine is not initialized")]
    NotInitialized,

    #[error("audio object {0} has no data in the Amplitude implementation")]
    MissingObject(AudioObjectId),

    #[error("listener {0} has no data in the Amplitude implementation")]
    MissingListener(ListenerId),

    #[error("the engine kept entity {0} after removing it")]
    EntityNotRemoved(EntityId),

    #[error("the Amplitude event with ID {0} has not been found in loaded banks")]
    EventNotFound(EventId),

    #[error("the engine did not start the Amplitude event with ID {0}")]
    TriggerDeclined(EventId),

    #[error("encountered a running event ({0}) without a valid canceler")]
    InvalidCanceler(u64),

    #[error("stopping an event in state {0:?} is not supported")]
    StopUnsupported(AudioEventState),

    #[error("unable to get the RTPC handle for ID {0}")]
    RtpcNotFound(RtpcId),

    #[error("invalid audio file entry: {0}")]
    InvalidFileEntry(&'static str),

    #[error("Amplitude failed to load soundbank {file}: {source}")]
    BankLoad { file: String, source: EngineError },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl AdapterError {
    /// Engine consistency failures and invalid requests are errors. Anything a
    /// partially loaded project can cause is a warning.
    pub fn severity(&self) -> Severity {
        match self {
            AdapterError::EventNotFound(_)
            | AdapterError::TriggerDeclined(_)
            | AdapterError::RtpcNotFound(_)
            | AdapterError::EntityNotRemoved(_)
            | AdapterError::Engine(_) => Severity::Warning,
            AdapterError::NotInitialized
            | AdapterError::MissingObject(_)
            | AdapterError::MissingListener(_)
            | AdapterError::InvalidCanceler(_)
            | AdapterError::StopUnsupported(_)
            | AdapterError::InvalidFileEntry(_)
            | AdapterError::BankLoad { .. } => Severity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity() {
        assert_eq!(AdapterError::EventNotFound(4).severity(), Severity::Warning);
        assert_eq!(AdapterError::InvalidCanceler(4).severity(), Severity::Error);
        assert_eq!(
            AdapterError::from(EngineError::UnknownEntity(3)).severity(),
            Severity::Warning
        );
        assert!(AdapterError::EventNotFound(42).to_string().contains("42"));
    }
}
