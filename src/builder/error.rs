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
use std::io;
use std::path::PathBuf;

use crate::xml::XmlError;

/// Failures raised while parsing audio control files or reading bank metadata.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("{tag} node does not exist; the audio control file must define at least one {what}")]
    MissingNode {
        tag: &'static str,
        what: &'static str,
    },

    #[error("{tag} node is malformed: attribute {attribute} is missing; resave the audio control file")]
    MissingAttribute {
        tag: &'static str,
        attribute: &'static str,
    },

    #[error("failed to read audio control file {path}: {source}")]
    ControlUnreadable { path: PathBuf, source: io::Error },

    #[error("audio control file {0} is empty")]
    ControlEmpty(PathBuf),

    #[error("failed to parse audio control file {path}: {source}")]
    ControlInvalid { path: PathBuf, source: XmlError },

    #[error("soundbank source file {0} does not exist; full dependency information cannot be determined without it")]
    BankNotFound(PathBuf),

    #[error("soundbank source file {0} is empty")]
    BankEmpty(PathBuf),

    #[error("failed to read soundbank source file {path}: {source}")]
    BankUnreadable { path: PathBuf, source: io::Error },

    #[error("failed to parse soundbank source file {path} as JSON: {source}")]
    BankInvalidJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid soundbank source file {0}: the root is not an object")]
    BankRootNotObject(PathBuf),

    #[error("invalid soundbank source file {0}: the events field is not an array")]
    BankEventsNotArray(PathBuf),

    #[error("invalid soundbank source file {path}: event entry {index} is not a string")]
    BankEventNotString { path: PathBuf, index: usize },

    #[error("failed to create the job worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
