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
//! The audio control builder: turns audio control files into product dependencies
//! on the sound banks they preload.

use std::fmt;

mod bank;
mod control;
mod error;
mod resolver;
mod runner;
mod worker;

pub use bank::{bank_metadata_path, bank_stem, read_bank_events, BankEventIndex};
pub use control::{banks_from_preloads, events_from_triggers, ControlDescriptor, Section};
pub use error::BuildError;
pub use resolver::{DependencyReport, DependencyResolver};
pub use runner::{JobOutcome, JobRunner};
pub use worker::{
    BuilderDescriptor, ControlBuilderWorker, CreateJobsRequest, CreateJobsResponse,
    CreateJobsResult, JobDescriptor, JobProduct, PlatformInfo, ProcessJobRequest,
    ProcessJobResponse, ProcessJobResult,
};

/// The kind of a product dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProductPathDependencyType {
    /// A built product file, relative to the cache root.
    ProductFile,
}

/// A dependency of a built product on another product, by path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductPathDependency {
    path: String,
    kind: ProductPathDependencyType,
}

impl ProductPathDependency {
    /// Creates a dependency on a product file.
    pub fn product_file(path: String) -> ProductPathDependency {
        ProductPathDependency {
            path,
            kind: ProductPathDependencyType::ProductFile,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> ProductPathDependencyType {
        self.kind
    }
}

/// A problem found while building a control that does not fail the job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildIssue {
    /// The preload section could not be read, so no bank dependency is known.
    MalformedPreloads { source_file: String, message: String },
    /// The trigger section could not be read, so events were not validated.
    MalformedTriggers { source_file: String, message: String },
    /// A referenced bank's metadata could not be read.
    UnreadableBank { bank: String, message: String },
    /// A triggered event is not contained in any bank preloaded by the control.
    MissingEvent { source_file: String, event: String },
}

impl fmt::Display for BuildIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildIssue::MalformedPreloads {
                source_file,
                message,
            } => write!(
                f,
                "{}: failed to gather product dependencies: {}",
                source_file, message
            ),
            BuildIssue::MalformedTriggers {
                source_file,
                message,
            } => write!(
                f,
                "{}: failed to gather referenced events: {}",
                source_file, message
            ),
            BuildIssue::UnreadableBank { bank, message } => write!(
                f,
                "failed to gather the events contained in soundbank {}: {}",
                bank, message
            ),
            BuildIssue::MissingEvent { source_file, event } => write!(
                f,
                "{}: event {} was not found in the soundbanks referenced by this control; \
                 it may fail to play",
                source_file, event
            ),
        }
    }
}
