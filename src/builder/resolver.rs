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
//! Cross-referencing of the events used by a control file against the banks it preloads.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

use tracing::{info, warn};

use super::bank::{bank_metadata_path, bank_stem, read_bank_events, BankEventIndex};
use super::control::{ControlDescriptor, Section};
use super::{BuildIssue, ProductPathDependency};
use crate::config::{BuilderConfig, SOUND_BANK_FILE_EXTENSION};
use crate::shutdown::ShutdownSignal;

/// What the resolver found for one control file.
#[derive(Debug, Default)]
pub struct DependencyReport {
    path_dependencies: BTreeSet<ProductPathDependency>,
    issues: Vec<BuildIssue>,
    cancelled: bool,
}

impl DependencyReport {
    /// The deduplicated product dependencies, one per referenced bank.
    pub fn path_dependencies(&self) -> &BTreeSet<ProductPathDependency> {
        &self.path_dependencies
    }

    /// Non fatal problems found while resolving.
    pub fn issues(&self) -> &[BuildIssue] {
        &self.issues
    }

    /// True if shutdown was observed before every bank could be read.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub(super) fn into_parts(self) -> (BTreeSet<ProductPathDependency>, Vec<BuildIssue>) {
        (self.path_dependencies, self.issues)
    }
}

/// Resolves the dependencies of control files for a single build job. Bank
/// indexes are cached for the lifetime of the resolver only.
pub struct DependencyResolver<'a> {
    config: &'a BuilderConfig,
    soundbanks_folder: PathBuf,
    shutdown: &'a ShutdownSignal,
    banks: HashMap<String, Option<BankEventIndex>>,
}

impl<'a> DependencyResolver<'a> {
    /// Creates a resolver reading bank metadata from the project found under `watch_folder`.
    pub fn new(
        config: &'a BuilderConfig,
        watch_folder: &std::path::Path,
        shutdown: &'a ShutdownSignal,
    ) -> DependencyResolver<'a> {
        let soundbanks_folder = watch_folder
            .join(config.project_path())
            .join(config.soundbanks_folder());
        DependencyResolver {
            config,
            soundbanks_folder,
            shutdown,
            banks: HashMap::new(),
        }
    }

    /// Returns the product path of a bank.
    pub fn bank_product_path(&self, bank: &str) -> String {
        format!(
            "{}{}{}",
            self.config.default_banks_path(),
            bank_stem(bank),
            SOUND_BANK_FILE_EXTENSION
        )
    }

    /// Resolves the product dependencies of a control file and checks that each
    /// event it triggers is contained in one of the banks it preloads.
    pub fn resolve(&mut self, control: &ControlDescriptor) -> DependencyReport {
        let mut report = DependencyReport::default();
        let source = control.source_file();

        let banks = match control.preloads() {
            Section::Absent => {
                info!(source, "No preloads found in this control");
                return report;
            }
            Section::Malformed(e) => {
                warn!(source, error = %e, "Failed to gather product dependencies");
                report.issues.push(BuildIssue::MalformedPreloads {
                    source_file: source.to_string(),
                    message: e.to_string(),
                });
                if let Section::Malformed(e) = control.triggers() {
                    warn!(source, error = %e, "Failed to gather referenced events");
                    report.issues.push(BuildIssue::MalformedTriggers {
                        source_file: source.to_string(),
                        message: e.to_string(),
                    });
                }
                return report;
            }
            Section::Names(banks) => banks,
        };

        if banks.is_empty() {
            info!(source, "No referenced banks");
            return report;
        }

        for bank in banks {
            report.path_dependencies.insert(ProductPathDependency::product_file(
                self.bank_product_path(bank),
            ));
        }

        let events = match control.triggers() {
            Section::Absent => {
                info!(source, "No referenced triggers");
                return report;
            }
            Section::Malformed(e) => {
                warn!(source, error = %e, "Failed to gather referenced events");
                report.issues.push(BuildIssue::MalformedTriggers {
                    source_file: source.to_string(),
                    message: e.to_string(),
                });
                return report;
            }
            Section::Names(events) => events,
        };

        let mut seen = HashSet::new();
        for bank in banks {
            let bank = bank_stem(bank);
            if !seen.insert(bank) {
                continue;
            }
            if self.shutdown.is_shutting_down() {
                warn!(source, "Shutdown requested, stopping bank reads");
                report.cancelled = true;
                return report;
            }
            if let Err(issue) = self.load_bank(bank) {
                report.issues.push(issue);
            }
        }

        let mut known_events: HashSet<&str> = HashSet::new();
        for bank in seen {
            if let Some(Some(index)) = self.banks.get(bank) {
                known_events.extend(index.events().iter().map(String::as_str));
            }
        }

        for event in events {
            if !known_events.contains(event.as_str()) {
                warn!(
                    source,
                    event, "Event not found in the banks referenced by this control; it may fail to play"
                );
                report.issues.push(BuildIssue::MissingEvent {
                    source_file: source.to_string(),
                    event: event.clone(),
                });
            }
        }

        report
    }

    /// Reads a bank's metadata into the cache, keyed by its stem. Failures are cached
    /// too so a bank is read at most once per job.
    fn load_bank(&mut self, bank: &str) -> Result<(), BuildIssue> {
        let bank = bank_stem(bank);
        if self.banks.contains_key(bank) {
            return Ok(());
        }

        let path = bank_metadata_path(&self.soundbanks_folder, bank);
        match read_bank_events(bank, &path) {
            Ok(index) => {
                self.banks.insert(bank.to_string(), Some(index));
                Ok(())
            }
            Err(e) => {
                warn!(bank, error = %e, "Failed to gather list of events contained in soundbank");
                self.banks.insert(bank.to_string(), None);
                Err(BuildIssue::UnreadableBank {
                    bank: bank.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}
