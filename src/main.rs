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
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use amplitude_atl::builder::{
    BuilderDescriptor, ControlBuilderWorker, JobOutcome, JobRunner, PlatformInfo, ProcessJobResult,
};
use amplitude_atl::config::{self, Settings};
use amplitude_atl::editor::{ControlLoader, ControlRegistry};
use clap::{crate_version, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Amplitude audio control builder and editor tools."
)]
struct Cli {
    /// The path to a settings file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// The platform to build for.
    #[arg(short, long, global = true, default_value = "pc")]
    platform: String,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Builds the given audio control files and prints their dependencies.
    Build {
        /// The folder the control files are relative to.
        watch_folder: PathBuf,
        /// The audio control files to build.
        files: Vec<String>,
    },
    /// Finds and builds every audio control file in the watch folder.
    Scan {
        /// The folder to search.
        watch_folder: PathBuf,
    },
    /// Lists the controls of an Amplitude project.
    Controls {
        /// The path to the Amplitude project.
        project_folder: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = config::load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Build { watch_folder, files } => {
            if files.is_empty() {
                return Err("no audio control files given".into());
            }
            build(&settings, &watch_folder, &files, &cli.platform)?;
        }
        Commands::Scan { watch_folder } => {
            let descriptor = BuilderDescriptor::new(settings.builder());
            let mut files = Vec::new();
            find_control_files(&descriptor, &watch_folder, &watch_folder, &mut files)?;
            files.sort();

            if files.is_empty() {
                println!("No audio control files found in {}.", watch_folder.display());
                return Ok(());
            }
            info!(count = files.len(), "Found audio control files");
            build(&settings, &watch_folder, &files, &cli.platform)?;
        }
        Commands::Controls { project_folder } => {
            let mut registry = ControlRegistry::new();
            ControlLoader::new(&project_folder).load(&mut registry);

            if registry.is_empty() {
                println!("No controls found in {}.", project_folder.display());
                return Ok(());
            }

            println!("Controls (count: {}):", registry.len());
            for id in registry.roots() {
                print_control(&registry, *id, 0);
            }
        }
    }

    Ok(())
}

/// Runs the jobs of the given files and prints their outcomes. Fails if any job failed.
fn build(
    settings: &Settings,
    watch_folder: &Path,
    files: &[String],
    platform: &str,
) -> Result<(), Box<dyn Error>> {
    let worker = ControlBuilderWorker::new(settings.builder().clone());
    let threads = settings.builder().worker_threads();
    let runner = JobRunner::new(worker, threads)?;

    let requests = runner.plan(watch_folder, files, &[PlatformInfo::new(platform)]);
    if requests.is_empty() {
        println!("No jobs to run for platform {}.", platform);
        return Ok(());
    }

    let outcomes = runner.run(requests);
    let failed = outcomes
        .iter()
        .filter(|outcome| outcome.response.result != ProcessJobResult::Success)
        .count();
    for outcome in outcomes.iter() {
        print_outcome(outcome);
    }

    if failed > 0 {
        return Err(format!("{} of {} jobs did not succeed", failed, outcomes.len()).into());
    }
    Ok(())
}

fn print_outcome(outcome: &JobOutcome) {
    let response = &outcome.response;
    println!(
        "{} [{}]: {:?}",
        outcome.request.source_file, outcome.request.job.platform, response.result
    );
    for product in response.products.iter() {
        println!("  product {}", product.path.display());
        for dependency in product.path_dependencies.iter() {
            println!("  - {}", dependency.path());
        }
    }
    for issue in response.issues.iter() {
        println!("  warning: {}", issue);
    }
    if let Some(error) = &response.error {
        println!("  error: {}", error);
    }
}

fn print_control(registry: &ControlRegistry, id: u64, depth: usize) {
    let Some(control) = registry.control(id) else {
        return;
    };
    println!(
        "{}- {} ({:?}, id {})",
        "  ".repeat(depth),
        control.name(),
        control.kind(),
        control.amplitude_id()
    );
    for child in control.children() {
        print_control(registry, *child, depth + 1);
    }
}

/// Collects the files below the folder the builder accepts, relative to the watch folder.
fn find_control_files(
    descriptor: &BuilderDescriptor,
    watch_folder: &Path,
    folder: &Path,
    files: &mut Vec<String>,
) -> Result<(), Box<dyn Error>> {
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        if path.is_dir() {
            find_control_files(descriptor, watch_folder, &path, files)?;
            continue;
        }

        let relative = path.strip_prefix(watch_folder)?.to_string_lossy().into_owned();
        if descriptor.matches(&relative) {
            files.push(relative);
        } else {
            debug!(path = %relative, "Skipping file");
        }
    }
    Ok(())
}
