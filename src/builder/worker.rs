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
//! The control builder worker: creates build jobs for audio control files and
//! processes them into products with dependencies on preloaded sound banks.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, span, warn, Level};

use super::control::ControlDescriptor;
use super::error::BuildError;
use super::resolver::DependencyResolver;
use super::{BuildIssue, ProductPathDependency};
use crate::config::BuilderConfig;
use crate::shutdown::ShutdownSignal;
use crate::xml::XmlElement;

/// Identifies the builder to the asset pipeline.
#[derive(Debug, Clone)]
pub struct BuilderDescriptor {
    name: &'static str,
    version: u32,
    controls_path: String,
}

impl BuilderDescriptor {
    pub const NAME: &'static str = "Audio Control Builder";
    pub const VERSION: u32 = 2;

    pub fn new(config: &BuilderConfig) -> BuilderDescriptor {
        BuilderDescriptor {
            name: Self::NAME,
            version: Self::VERSION,
            controls_path: normalize(config.controls_path()),
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns true if the given path is an audio control file this builder accepts:
    /// an .xml file somewhere below the controls path.
    pub fn matches(&self, path: &str) -> bool {
        let path = normalize(path);
        path.ends_with(".xml") && path.contains(&self.controls_path)
    }
}

/// Lower cases a path and uses forward slashes as separators.
fn normalize(path: &str) -> String {
    path.replace('\\', "/").to_lowercase()
}

/// A platform the asset pipeline is building for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub identifier: String,
}

impl PlatformInfo {
    pub fn new(identifier: &str) -> PlatformInfo {
        PlatformInfo {
            identifier: identifier.to_string(),
        }
    }
}

/// A request to create the jobs for one source file.
#[derive(Debug, Clone)]
pub struct CreateJobsRequest {
    pub source_file: String,
    pub watch_folder: PathBuf,
    pub enabled_platforms: Vec<PlatformInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateJobsResult {
    Success,
    ShuttingDown,
}

/// A job to run for a source file on one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    pub job_key: String,
    pub platform: String,
    pub critical: bool,
    pub priority: i32,
}

#[derive(Debug, Clone)]
pub struct CreateJobsResponse {
    pub result: CreateJobsResult,
    pub jobs: Vec<JobDescriptor>,
}

/// A request to process one job.
#[derive(Debug, Clone)]
pub struct ProcessJobRequest {
    pub full_path: PathBuf,
    pub source_file: String,
    pub watch_folder: PathBuf,
    pub job: JobDescriptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessJobResult {
    Success,
    Failed,
    Cancelled,
}

/// A product emitted by a successful job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobProduct {
    pub path: PathBuf,
    pub path_dependencies: Vec<ProductPathDependency>,
}

/// The outcome of processing one job. Warnings never fail a job; they are
/// returned alongside the products.
#[derive(Debug)]
pub struct ProcessJobResponse {
    pub result: ProcessJobResult,
    pub products: Vec<JobProduct>,
    pub issues: Vec<BuildIssue>,
    pub error: Option<BuildError>,
}

impl ProcessJobResponse {
    fn with_result(result: ProcessJobResult) -> ProcessJobResponse {
        ProcessJobResponse {
            result,
            products: Vec::new(),
            issues: Vec::new(),
            error: None,
        }
    }

    fn failed(error: BuildError) -> ProcessJobResponse {
        ProcessJobResponse {
            error: Some(error),
            ..Self::with_result(ProcessJobResult::Failed)
        }
    }
}

/// Builds audio control files. A worker may be shared by concurrent jobs: the only
/// state they share is the shutdown flag.
#[derive(Clone)]
pub struct ControlBuilderWorker {
    config: BuilderConfig,
    shutdown: ShutdownSignal,
}

impl ControlBuilderWorker {
    pub fn new(config: BuilderConfig) -> ControlBuilderWorker {
        ControlBuilderWorker {
            config,
            shutdown: ShutdownSignal::new(),
        }
    }

    /// The builder configuration.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Describes this builder.
    pub fn descriptor(&self) -> BuilderDescriptor {
        BuilderDescriptor::new(&self.config)
    }

    /// Creates one job per enabled platform, skipping excluded platforms.
    pub fn create_jobs(&self, request: &CreateJobsRequest) -> CreateJobsResponse {
        if self.shutdown.is_shutting_down() {
            return CreateJobsResponse {
                result: CreateJobsResult::ShuttingDown,
                jobs: Vec::new(),
            };
        }

        let jobs = request
            .enabled_platforms
            .iter()
            .filter(|platform| !self.config.is_platform_excluded(&platform.identifier))
            .map(|platform| JobDescriptor {
                job_key: self.config.job_key().to_string(),
                platform: platform.identifier.clone(),
                critical: true,
                priority: 0,
            })
            .collect::<Vec<_>>();

        debug!(
            source = request.source_file,
            jobs = jobs.len(),
            "Created audio control jobs"
        );

        CreateJobsResponse {
            result: CreateJobsResult::Success,
            jobs,
        }
    }

    /// Processes one job: reads the control file and resolves its bank dependencies.
    pub fn process_job(&self, request: &ProcessJobRequest) -> ProcessJobResponse {
        let span = span!(Level::INFO, "control job", source = request.source_file);
        let _enter = span.enter();

        if self.shutdown.is_shutting_down() {
            info!("Cancelled job because shutdown was requested");
            return ProcessJobResponse::with_result(ProcessJobResult::Cancelled);
        }

        info!(platform = request.job.platform, "Building audio control");

        let root = match read_control(&request.full_path) {
            Ok(root) => root,
            Err(e) => {
                warn!(err = %e, "Failed to build audio control");
                return ProcessJobResponse::failed(e);
            }
        };

        let control = ControlDescriptor::parse(&request.source_file, &root);
        let mut resolver =
            DependencyResolver::new(&self.config, &request.watch_folder, &self.shutdown);
        let report = resolver.resolve(&control);
        if report.is_cancelled() {
            info!("Cancelled job because shutdown was requested");
            return ProcessJobResponse::with_result(ProcessJobResult::Cancelled);
        }

        let (path_dependencies, issues) = report.into_parts();
        info!(
            dependencies = path_dependencies.len(),
            issues = issues.len(),
            "Built audio control"
        );

        ProcessJobResponse {
            result: ProcessJobResult::Success,
            products: vec![JobProduct {
                path: request.full_path.clone(),
                path_dependencies: path_dependencies.into_iter().collect(),
            }],
            issues,
            error: None,
        }
    }

    /// Signals every running and future job to stop.
    pub fn shut_down(&self) {
        self.shutdown.shut_down();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_shutting_down()
    }
}

/// Reads and parses an audio control file.
fn read_control(path: &Path) -> Result<XmlElement, BuildError> {
    let contents = fs::read(path).map_err(|e| BuildError::ControlUnreadable {
        path: path.to_path_buf(),
        source: e,
    })?;
    if contents.is_empty() {
        return Err(BuildError::ControlEmpty(path.to_path_buf()));
    }

    XmlElement::parse(&contents).map_err(|e| BuildError::ControlInvalid {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::testutil::{write_bank_metadata, write_control, ControlFileBuilder};

    fn request(watch_folder: &Path, source_file: &str) -> ProcessJobRequest {
        ProcessJobRequest {
            full_path: watch_folder.join(source_file),
            source_file: source_file.to_string(),
            watch_folder: watch_folder.to_path_buf(),
            job: JobDescriptor {
                job_key: "Amplitude Audio Control".to_string(),
                platform: "pc".to_string(),
                critical: true,
                priority: 0,
            },
        }
    }

    #[test]
    fn test_create_jobs_skips_server() {
        let worker = ControlBuilderWorker::new(BuilderConfig::default());
        let response = worker.create_jobs(&CreateJobsRequest {
            source_file: "libs/gameaudio/amplitude/weapons.xml".to_string(),
            watch_folder: PathBuf::from("/project"),
            enabled_platforms: vec![
                PlatformInfo::new("pc"),
                PlatformInfo::new("server"),
                PlatformInfo::new("linux"),
            ],
        });

        assert_eq!(response.result, CreateJobsResult::Success);
        let platforms = response
            .jobs
            .iter()
            .map(|job| job.platform.as_str())
            .collect::<Vec<_>>();
        assert_eq!(platforms, vec!["pc", "linux"]);
        for job in response.jobs.iter() {
            assert_eq!(job.job_key, "Amplitude Audio Control");
            assert!(job.critical);
            assert_eq!(job.priority, 0);
        }
    }

    #[test]
    fn test_shutdown_stops_job_creation_and_processing() {
        let dir = tempfile::tempdir().unwrap();
        let worker = ControlBuilderWorker::new(BuilderConfig::default());
        worker.shut_down();

        let response = worker.create_jobs(&CreateJobsRequest {
            source_file: "weapons.xml".to_string(),
            watch_folder: dir.path().to_path_buf(),
            enabled_platforms: vec![PlatformInfo::new("pc")],
        });
        assert_eq!(response.result, CreateJobsResult::ShuttingDown);
        assert!(response.jobs.is_empty());

        let response = worker.process_job(&request(dir.path(), "weapons.xml"));
        assert_eq!(response.result, ProcessJobResult::Cancelled);
    }

    #[test]
    fn test_process_job_emits_bank_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuilderConfig::default();
        write_bank_metadata(dir.path(), &config, "a", &["explosion.amevent"]);
        write_control(
            dir.path(),
            "libs/gameaudio/amplitude/weapons.xml",
            &ControlFileBuilder::new()
                .preload("global", &["a", "b"])
                .trigger("boom", Some("explosion"))
                .build(),
        );

        let worker = ControlBuilderWorker::new(config);
        let response =
            worker.process_job(&request(dir.path(), "libs/gameaudio/amplitude/weapons.xml"));

        assert_eq!(response.result, ProcessJobResult::Success);
        assert_eq!(response.products.len(), 1);
        let paths = response.products[0]
            .path_dependencies
            .iter()
            .map(|d| d.path())
            .collect::<Vec<_>>();
        assert_eq!(
            paths,
            vec![
                "sounds/amplitude_assets/soundbanks/a.ambank",
                "sounds/amplitude_assets/soundbanks/b.ambank"
            ]
        );
        assert_eq!(response.issues.len(), 1);
        assert!(matches!(response.issues[0], BuildIssue::UnreadableBank { .. }));
    }

    #[test]
    fn test_process_job_failures() {
        let dir = tempfile::tempdir().unwrap();
        let worker = ControlBuilderWorker::new(BuilderConfig::default());

        let response = worker.process_job(&request(dir.path(), "missing.xml"));
        assert_eq!(response.result, ProcessJobResult::Failed);
        assert!(matches!(
            response.error,
            Some(BuildError::ControlUnreadable { .. })
        ));

        fs::write(dir.path().join("empty.xml"), "").unwrap();
        let response = worker.process_job(&request(dir.path(), "empty.xml"));
        assert!(matches!(response.error, Some(BuildError::ControlEmpty(_))));

        fs::write(dir.path().join("broken.xml"), "<ATLConfig><AudioPreloads>").unwrap();
        let response = worker.process_job(&request(dir.path(), "broken.xml"));
        assert_eq!(response.result, ProcessJobResult::Failed);
        assert!(matches!(
            response.error,
            Some(BuildError::ControlInvalid { .. })
        ));
    }

    #[test]
    fn test_process_job_without_preloads_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        write_control(
            dir.path(),
            "weapons.xml",
            &ControlFileBuilder::new()
                .trigger("boom", Some("explosion"))
                .build(),
        );

        let worker = ControlBuilderWorker::new(BuilderConfig::default());
        let response = worker.process_job(&request(dir.path(), "weapons.xml"));
        assert_eq!(response.result, ProcessJobResult::Success);
        assert!(response.products[0].path_dependencies.is_empty());
        assert!(response.issues.is_empty());
    }

    #[test]
    fn test_descriptor_matches_controls() {
        let descriptor = ControlBuilderWorker::new(BuilderConfig::default()).descriptor();
        assert_eq!(descriptor.name(), "Audio Control Builder");
        assert_eq!(descriptor.version(), 2);
        assert!(descriptor.matches("libs/gameaudio/amplitude/weapons.xml"));
        assert!(descriptor.matches("Game\\Libs\\GameAudio\\Amplitude\\levels\\Town.XML"));
        assert!(!descriptor.matches("libs/gameaudio/amplitude/weapons.json"));
        assert!(!descriptor.matches("libs/gameaudio/wwise/weapons.xml"));
    }
}
