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
//! Runs control builder jobs concurrently on a dedicated thread pool.

use std::path::Path;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

use super::error::BuildError;
use super::worker::{
    ControlBuilderWorker, CreateJobsRequest, CreateJobsResult, PlatformInfo, ProcessJobRequest,
    ProcessJobResponse,
};

/// A processed job and its response.
#[derive(Debug)]
pub struct JobOutcome {
    pub request: ProcessJobRequest,
    pub response: ProcessJobResponse,
}

/// Drives a control builder worker over many files. Each job owns its parser and
/// reader state; jobs only share the worker's shutdown flag.
pub struct JobRunner {
    worker: ControlBuilderWorker,
    pool: rayon::ThreadPool,
}

impl JobRunner {
    /// Creates a runner with the given number of worker threads.
    pub fn new(worker: ControlBuilderWorker, num_threads: usize) -> Result<JobRunner, BuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads.max(1))
            .thread_name(|i| format!("amplitude-control-builder-{i}"))
            .build()?;
        Ok(JobRunner { worker, pool })
    }

    pub fn worker(&self) -> &ControlBuilderWorker {
        &self.worker
    }

    /// Creates the jobs of every source file for the given platforms. Source files
    /// are relative to the watch folder.
    pub fn plan(
        &self,
        watch_folder: &Path,
        source_files: &[String],
        platforms: &[PlatformInfo],
    ) -> Vec<ProcessJobRequest> {
        let mut requests = Vec::new();
        for source_file in source_files {
            let response = self.worker.create_jobs(&CreateJobsRequest {
                source_file: source_file.clone(),
                watch_folder: watch_folder.to_path_buf(),
                enabled_platforms: platforms.to_vec(),
            });
            if response.result == CreateJobsResult::ShuttingDown {
                info!("Shutdown requested, no more jobs will be created");
                break;
            }

            requests.extend(response.jobs.into_iter().map(|job| ProcessJobRequest {
                full_path: watch_folder.join(source_file),
                source_file: source_file.clone(),
                watch_folder: watch_folder.to_path_buf(),
                job,
            }));
        }

        debug!(jobs = requests.len(), "Planned audio control jobs");
        requests
    }

    /// Processes every request concurrently. Outcomes are returned in request order.
    pub fn run(&self, requests: Vec<ProcessJobRequest>) -> Vec<JobOutcome> {
        let worker = &self.worker;
        self.pool.install(|| {
            requests
                .into_par_iter()
                .map(|request| {
                    let response = worker.process_job(&request);
                    JobOutcome { request, response }
                })
                .collect()
        })
    }

    /// Signals running jobs to stop before their next file read.
    pub fn shut_down(&self) {
        self.worker.shut_down();
    }
}
