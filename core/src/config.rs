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

use crate::definitions::TransportActions;

pub const DEFAULT_INVALID_SELECTION_MESSAGE: &str = "Invalid selection";
pub const DEFAULT_PLAYBACK_ERROR_MESSAGE: &str = "Radio unavailable";

/// Settings of a tuner session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// User-facing message carried by the error pulse after an unresolvable selection.
    pub invalid_selection_message: String,
    /// Message carried by the error pulse when the tuner service itself reports an error state.
    pub playback_error_message: String,
    /// Actions advertised with every playback state.
    pub actions: TransportActions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            invalid_selection_message: DEFAULT_INVALID_SELECTION_MESSAGE.to_string(),
            playback_error_message: DEFAULT_PLAYBACK_ERROR_MESSAGE.to_string(),
            actions: TransportActions::TUNER,
        }
    }
}

impl SessionConfig {
    pub fn with_invalid_selection_message(mut self, message: impl Into<String>) -> Self {
        self.invalid_selection_message = message.into();
        self
    }

    pub fn with_playback_error_message(mut self, message: impl Into<String>) -> Self {
        self.playback_error_message = message.into();
        self
    }
}
