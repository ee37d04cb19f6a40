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

const DEFAULT_BANKS_PATH: &str = "sounds/amplitude_assets/soundbanks/";
const DEFAULT_PROJECT_PATH: &str = "sounds/amplitude_project/";
const DEFAULT_CONTROLS_PATH: &str = "libs/gameaudio/amplitude/";
const DEFAULT_JOB_KEY: &str = "Amplitude Audio Control";

/// Configuration of the audio control builder.
#[derive(Deserialize, Clone, Debug)]
pub struct BuilderConfig {
    /// Product path prefix of built sound banks.
    #[serde(default = "default_banks_path")]
    default_banks_path: String,

    /// Path of the Amplitude project, relative to the watch folder.
    #[serde(default = "default_project_path")]
    project_path: String,

    /// Folder of the project holding bank metadata files.
    #[serde(default = "default_soundbanks_folder")]
    soundbanks_folder: String,

    /// Folder whose XML files are audio control files handled by this builder.
    #[serde(default = "default_controls_path")]
    controls_path: String,

    /// Platforms for which no job is ever created.
    #[serde(default = "default_excluded_platforms")]
    excluded_platforms: Vec<String>,

    /// The key of every job created by the builder.
    #[serde(default = "default_job_key")]
    job_key: String,

    /// Number of threads used to process jobs. Defaults to the CPU count.
    worker_threads: Option<usize>,
}

fn default_banks_path() -> String {
    DEFAULT_BANKS_PATH.to_string()
}

fn default_project_path() -> String {
    DEFAULT_PROJECT_PATH.to_string()
}

fn default_soundbanks_folder() -> String {
    super::SOUND_BANKS_FOLDER.to_string()
}

fn default_controls_path() -> String {
    DEFAULT_CONTROLS_PATH.to_string()
}

fn default_excluded_platforms() -> Vec<String> {
    vec!["server".to_string()]
}

fn default_job_key() -> String {
    DEFAULT_JOB_KEY.to_string()
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig {
            default_banks_path: default_banks_path(),
            project_path: default_project_path(),
            soundbanks_folder: default_soundbanks_folder(),
            controls_path: default_controls_path(),
            excluded_platforms: default_excluded_platforms(),
            job_key: default_job_key(),
            worker_threads: None,
        }
    }
}

impl BuilderConfig {
    /// Returns the product path prefix of built sound banks. Always ends with a separator.
    pub fn default_banks_path(&self) -> String {
        with_trailing_separator(&self.default_banks_path)
    }

    /// Returns the project path, relative to the watch folder.
    pub fn project_path(&self) -> &str {
        &self.project_path
    }

    /// Returns the project folder holding bank metadata.
    pub fn soundbanks_folder(&self) -> &str {
        &self.soundbanks_folder
    }

    /// Returns the folder holding audio control files.
    pub fn controls_path(&self) -> &str {
        &self.controls_path
    }

    /// Returns true if no job should be created for the given platform.
    pub fn is_platform_excluded(&self, platform: &str) -> bool {
        self.excluded_platforms.iter().any(|p| p == platform)
    }

    /// Returns the key given to every created job.
    pub fn job_key(&self) -> &str {
        &self.job_key
    }

    /// Returns the number of job worker threads.
    pub fn worker_threads(&self) -> usize {
        self.worker_threads.unwrap_or_else(num_cpus::get).max(1)
    }
}

#[cfg(test)]
impl BuilderConfig {
    /// Overrides the project location (test only).
    pub fn with_project(mut self, project_path: &str, soundbanks_folder: &str) -> Self {
        self.project_path = project_path.to_string();
        self.soundbanks_folder = soundbanks_folder.to_string();
        self
    }
}

fn with_trailing_separator(path: &str) -> String {
    if path.is_empty() || path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banks_path_separator() {
        assert_eq!(with_trailing_separator("banks"), "banks/");
        assert_eq!(with_trailing_separator("banks/"), "banks/");
        assert_eq!(with_trailing_separator(""), "");
    }

    #[test]
    fn test_worker_threads_never_zero() {
        let config = BuilderConfig {
            worker_threads: Some(0),
            ..Default::default()
        };
        assert_eq!(config.worker_threads(), 1);
    }
}
