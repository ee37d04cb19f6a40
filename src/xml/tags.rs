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
//! Tag and attribute names used in audio control files.

// Audio Translation Layer tags.
pub const PRELOADS_NODE_TAG: &str = "AudioPreloads";
pub const TRIGGERS_NODE_TAG: &str = "AudioTriggers";
pub const ATL_PRELOAD_REQUEST_TAG: &str = "ATLPreloadRequest";
pub const ATL_TRIGGER_TAG: &str = "ATLTrigger";
pub const ATL_NAME_ATTRIBUTE: &str = "atl_name";

// Amplitude tags.
pub const EVENT_TAG: &str = "AmplitudeEvent";
pub const RTPC_TAG: &str = "AmplitudeRtpc";
pub const SWITCH_TAG: &str = "AmplitudeSwitch";
pub const SWITCH_STATE_TAG: &str = "AmplitudeSwitchState";
pub const STATE_TAG: &str = "AmplitudeState";
pub const FILE_TAG: &str = "AmplitudeFile";
pub const BUS_TAG: &str = "AmplitudeBus";
pub const ENVIRONMENT_TAG: &str = "AmplitudeEnvironment";

// Amplitude attributes.
pub const LOCALIZED_ATTRIBUTE: &str = "amplitude_localized";
pub const ID_ATTRIBUTE: &str = "amplitude_id";
pub const NAME_ATTRIBUTE: &str = "amplitude_name";
pub const VALUE_ATTRIBUTE: &str = "amplitude_value";
pub const MULTIPLIER_ATTRIBUTE: &str = "atl_multiplier";
pub const SHIFT_ATTRIBUTE: &str = "atl_shift";
