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
use serde::Deserialize;

const DEFAULT_ENGINE_CONFIG_FILE: &str = "audio_config.amconfig";
const DEFAULT_INIT_BANK_FILE: &str = "init.ambank";
const DEFAULT_IMPL_SUB_PATH: &str = "amplitude/";

/// The identifier of the object-less entity shared by all non-positional triggers.
pub const GLOBAL_AUDIO_OBJECT_ID: u64 = 1;

/// Configuration of the runtime adapter.
#[derive(Deserialize, Clone, Debug)]
pub struct SystemConfig {
    /// The engine configuration file loaded on initialization.
    #[serde(default = "default_engine_config_file")]
    engine_config_file: String,

    /// The bank loaded right after the engine is initialized.
    #[serde(default = "default_init_bank_file")]
    init_bank_file: String,

    /// Where built sound banks are read from at runtime.
    #[serde(default = "default_banks_path")]
    banks_path: String,

    /// Sub path of this implementation inside the audio controls folder.
    #[serde(default = "default_impl_sub_path")]
    impl_sub_path: String,

    /// Entity id of the global, object-less audio object.
    #[serde(default = "default_global_object_id")]
    global_object_id: u64,
}

fn default_engine_config_file() -> String {
    DEFAULT_ENGINE_CONFIG_FILE.to_string()
}

fn default_init_bank_file() -> String {
    DEFAULT_INIT_BANK_FILE.to_string()
}

fn default_banks_path() -> String {
    format!("sounds/{}/soundbanks/", super::ASSETS_DIR_NAME)
}

fn default_impl_sub_path() -> String {
    DEFAULT_IMPL_SUB_PATH.to_string()
}

fn default_global_object_id() -> u64 {
    GLOBAL_AUDIO_OBJECT_ID
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            engine_config_file: default_engine_config_file(),
            init_bank_file: default_init_bank_file(),
            banks_path: default_banks_path(),
            impl_sub_path: default_impl_sub_path(),
            global_object_id: default_global_object_id(),
        }
    }
}

impl SystemConfig {
    pub fn engine_config_file(&self) -> &str {
        &self.engine_config_file
    }

    pub fn init_bank_file(&self) -> &str {
        &self.init_bank_file
    }

    /// Returns the sound bank folder, always terminated by a separator.
    pub fn banks_path(&self) -> String {
        if self.banks_path.ends_with('/') {
            self.banks_path.clone()
        } else {
            format!("{}/", self.banks_path)
        }
    }

    pub fn impl_sub_path(&self) -> &str {
        &self.impl_sub_path
    }

    pub fn global_object_id(&self) -> u64 {
        self.global_object_id
    }
}
