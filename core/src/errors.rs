// Copyright 2025 HEM Sp. z o.o.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;

/// Failure reported by the app-control collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppControlError {
    /// The tuner service could not be reached.
    #[error("Tuner service unreachable: {0}")]
    Unreachable(String),

    /// The connection to the tuner service is gone.
    #[error("Tuner service disconnected")]
    Disconnected,

    /// The tuner service refused the request.
    #[error("Request rejected: {0}")]
    Rejected(String),
}

/// An external command referenced a program that cannot be resolved.
///
/// Both variants end up in the same error pulse. They are kept apart only for logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Invalid media ID: {0}")]
    InvalidMediaId(String),

    #[error("Invalid URI: {0}")]
    InvalidUri(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStateError {
    #[error("Unsupported playback state code {0}")]
    Unsupported(u8),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgramUriError {
    #[error("Malformed URI: {0}")]
    Malformed(String),

    #[error("Unsupported URI scheme {0}")]
    UnsupportedScheme(String),

    #[error("Unexpected URI authority {0:?}")]
    UnexpectedAuthority(Option<String>),

    #[error("Expected 2 path segments, got {0}")]
    WrongPathLength(usize),

    #[error("Unknown identifier type {0}")]
    UnknownIdentifierType(String),

    #[error("Invalid identifier value {0}")]
    InvalidIdentifierValue(String),

    #[error("Identifier type {0} cannot be a primary identifier")]
    UnsupportedPrimaryIdentifier(String),
}
