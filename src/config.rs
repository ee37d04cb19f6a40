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
use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::debug;

pub mod builder;
pub mod error;
pub mod system;

pub use builder::BuilderConfig;
pub use error::ConfigError;
pub use system::{SystemConfig, GLOBAL_AUDIO_OBJECT_ID};

/// Name of the folder holding the built Amplitude assets.
pub const ASSETS_DIR_NAME: &str = "amplitude_assets";

/// Name of the folder holding the Amplitude project sources.
pub const PROJECT_DIR_NAME: &str = "amplitude_project";

/// Extension of the per-bank metadata sidecar files in the project folder.
pub const PROJECT_FILE_EXTENSION: &str = ".json";

/// Extension of built sound bank files.
pub const SOUND_BANK_FILE_EXTENSION: &str = ".ambank";

/// Extension carried by every event name listed in a bank's metadata.
pub const EVENT_FILE_EXTENSION: &str = ".amevent";

/// Name of the bus definitions file at the project root.
pub const BUSES_CONFIG_FILE: &str = "buses.json";

// Project sub-folders scanned by the editor.
pub const EVENTS_FOLDER: &str = "events";
pub const RTPC_FOLDER: &str = "rtpc";
pub const SOUND_BANKS_FOLDER: &str = "soundbanks";
pub const SWITCHES_FOLDER: &str = "switches";
pub const EFFECTS_FOLDER: &str = "effects";

/// Top level settings for the builder and the runtime adapter.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Settings {
    /// Control builder settings.
    #[serde(default)]
    builder: BuilderConfig,

    /// Runtime adapter settings.
    #[serde(default)]
    system: SystemConfig,
}

impl Settings {
    /// Creates settings from the given parts.
    pub fn new(builder: BuilderConfig, system: SystemConfig) -> Settings {
        Settings { builder, system }
    }

    /// Returns the control builder settings.
    pub fn builder(&self) -> &BuilderConfig {
        &self.builder
    }

    /// Returns the runtime adapter settings.
    pub fn system(&self) -> &SystemConfig {
        &self.system
    }
}

/// Loads settings from the given file (if any), layered with `AMPLITUDE__*`
/// environment overrides. A missing path yields the defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        debug!(path = ?path, "Loading settings");
        builder = builder.add_source(File::from(path));
    }

    let settings: Settings = builder
        .add_source(Environment::with_prefix("AMPLITUDE").separator("__"))
        .build()?
        .try_deserialize()?;
    Ok(settings)
}
