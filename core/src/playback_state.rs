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

use std::time::Duration;

use log::{error, trace};

use crate::definitions::{PlaybackState, TransportActions, VisualClass};
use crate::errors::PlaybackStateError;

impl TryFrom<u8> for PlaybackState {
    type Error = PlaybackStateError;

    fn try_from(raw: u8) -> Result<Self, PlaybackStateError> {
        match raw {
            0 => Ok(PlaybackState::None),
            1 => Ok(PlaybackState::Stopped),
            2 => Ok(PlaybackState::Paused),
            3 => Ok(PlaybackState::Playing),
            7 => Ok(PlaybackState::Error),
            8 => Ok(PlaybackState::Connecting),
            9 => Ok(PlaybackState::SkippingToPrevious),
            10 => Ok(PlaybackState::SkippingToNext),
            other => Err(PlaybackStateError::Unsupported(other)),
        }
    }
}

impl PlaybackState {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// State a single play/pause control should request when pressed in this state.
    pub fn toggle_target(&self) -> PlaybackState {
        match self {
            PlaybackState::Playing
            | PlaybackState::Connecting
            | PlaybackState::SkippingToNext
            | PlaybackState::SkippingToPrevious => PlaybackState::Paused,
            PlaybackState::None
            | PlaybackState::Paused
            | PlaybackState::Stopped
            | PlaybackState::Error => PlaybackState::Playing,
        }
    }

    pub fn visual_class(&self) -> VisualClass {
        VisualClass::of(*self)
    }
}

impl VisualClass {
    pub fn of(state: PlaybackState) -> VisualClass {
        match state {
            PlaybackState::Playing => VisualClass::Playing,
            PlaybackState::Stopped
            | PlaybackState::Paused
            | PlaybackState::Connecting
            | PlaybackState::SkippingToPrevious
            | PlaybackState::SkippingToNext => VisualClass::Paused,
            PlaybackState::None | PlaybackState::Error => VisualClass::Disabled,
        }
    }
}

/// Maps raw transport-state codes reported by the tuner service onto [`PlaybackState`].
pub struct PlaybackStateReducer;

impl PlaybackStateReducer {
    pub fn reduce(raw: u8) -> Result<PlaybackState, PlaybackStateError> {
        PlaybackState::try_from(raw)
    }

    /// Toggle target for a raw state code. Codes outside the known set are logged and yield no
    /// transition.
    pub fn toggle_raw(raw: u8) -> Result<PlaybackState, PlaybackStateError> {
        let current = Self::reduce(raw).inspect_err(|e| error!("Cannot toggle: {}", e))?;
        let target = current.toggle_target();
        trace!("Requesting switch from {:?} to {:?}", current, target);
        Ok(target)
    }
}

/// Playback record published to session observers.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackStateRecord {
    pub state: PlaybackState,
    /// `None` when the position is unknown, which is always the case for live radio.
    pub position: Option<Duration>,
    pub rate: f32,
    pub error_message: Option<String>,
    pub actions: TransportActions,
}

impl PlaybackStateRecord {
    pub fn new(state: PlaybackState, actions: TransportActions) -> Self {
        Self {
            state,
            position: None,
            rate: 1.0,
            error_message: None,
            actions,
        }
    }

    pub fn with_error(message: impl Into<String>, actions: TransportActions) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::new(PlaybackState::Error, actions)
        }
    }

    pub fn is_error(&self) -> bool {
        self.state == PlaybackState::Error
    }
}

impl Default for PlaybackStateRecord {
    fn default() -> Self {
        Self::new(PlaybackState::None, TransportActions::TUNER)
    }
}
