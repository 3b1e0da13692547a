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

use std::sync::Arc;

use log::{debug, warn};

use crate::collaborators::{BrowseTree, SelectorParser};
use crate::definitions::PlaybackState;
use crate::errors::{AppControlError, SelectionError};
use crate::program::Program;
use crate::synchronizer::SessionSynchronizer;

/// Transport commands issued by session controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    Play,
    Stop,
    SkipNext,
    SkipPrevious,
    /// Play/pause toggle applied to the currently published playback state.
    Toggle,
    SetRating { has_heart: bool },
    PlayFromMediaId(String),
    PlayFromUri(String),
}

/// Turns transport commands into app-control calls.
///
/// Collaborator failures never escape: they are logged and the command is dropped. Commands are
/// not retried, repeating a seek or tune against live hardware is not safe.
pub struct TransportDispatcher {
    synchronizer: Arc<SessionSynchronizer>,
    browse_tree: Arc<dyn BrowseTree>,
    selector_parser: Arc<dyn SelectorParser>,
}

fn log_failure(command: &str, result: Result<(), AppControlError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!("Dropping {} command: {}", command, e);
            false
        }
    }
}

impl TransportDispatcher {
    pub fn new(synchronizer: Arc<SessionSynchronizer>,
               browse_tree: Arc<dyn BrowseTree>,
               selector_parser: Arc<dyn SelectorParser>) -> Self {
        Self { synchronizer, browse_tree, selector_parser }
    }

    pub async fn dispatch(&self, command: TransportCommand) {
        debug!("Dispatching {:?}", command);
        match command {
            TransportCommand::Play => self.play().await,
            TransportCommand::Stop => self.stop().await,
            TransportCommand::SkipNext => self.skip_next().await,
            TransportCommand::SkipPrevious => self.skip_previous().await,
            TransportCommand::Toggle => self.toggle().await,
            TransportCommand::SetRating { has_heart } => self.set_rating(has_heart).await,
            TransportCommand::PlayFromMediaId(media_id) => self.play_from_media_id(&media_id).await,
            TransportCommand::PlayFromUri(uri) => self.play_from_uri(&uri).await,
        }
    }

    pub async fn stop(&self) {
        if !self.accepting("stop") {
            return;
        }
        log_failure("stop", self.synchronizer.app_control().mute().await);
    }

    pub async fn play(&self) {
        if !self.accepting("play") {
            return;
        }
        let app = self.synchronizer.app_control();
        if log_failure("play", app.tune_to_default_if_needed().await) {
            log_failure("play", app.unmute().await);
        }
    }

    pub async fn skip_next(&self) {
        if !self.accepting("skip next") {
            return;
        }
        log_failure("skip next", self.synchronizer.app_control().seek_forward().await);
    }

    pub async fn skip_previous(&self) {
        if !self.accepting("skip previous") {
            return;
        }
        log_failure("skip previous", self.synchronizer.app_control().seek_backward().await);
    }

    /// Stop when the toggle target is paused (pause itself is not supported by a live tuner),
    /// play otherwise.
    pub async fn toggle(&self) {
        match self.synchronizer.playback_state().toggle_target() {
            PlaybackState::Paused => self.stop().await,
            _ => self.play().await,
        }
    }

    /// Adds or removes the current program from favorites. No-op without a current program.
    pub async fn set_rating(&self, has_heart: bool) {
        if !self.accepting("set rating") {
            return;
        }
        let app = self.synchronizer.app_control().clone();
        let result = self.synchronizer
                         .with_current_program(|info| async move {
                             if has_heart {
                                 app.add_favorite(&Program::from_program_info(&info)).await
                             } else {
                                 app.remove_favorite(info.selector()).await
                             }
                         })
                         .await;
        match result {
            Some(result) => {
                log_failure("set rating", result);
            }
            None => debug!("No current program, ignoring rating"),
        }
    }

    pub async fn play_from_media_id(&self, media_id: &str) {
        if media_id == self.browse_tree.root_id() {
            self.play().await;
            return;
        }
        if !self.accepting("play from media id") {
            return;
        }
        match self.browse_tree.parse_media_id(media_id) {
            Some(selector) => {
                log_failure("play from media id", self.synchronizer.app_control().tune(&selector).await);
            }
            None => {
                self.synchronizer.selection_error(SelectionError::InvalidMediaId(media_id.to_string())).await;
            }
        }
    }

    pub async fn play_from_uri(&self, uri: &str) {
        if !self.accepting("play from uri") {
            return;
        }
        match self.selector_parser.parse_uri(uri) {
            Some(selector) => {
                log_failure("play from uri", self.synchronizer.app_control().tune(&selector).await);
            }
            None => {
                self.synchronizer.selection_error(SelectionError::InvalidUri(uri.to_string())).await;
            }
        }
    }

    fn accepting(&self, command: &str) -> bool {
        let active = self.synchronizer.is_active();
        if !active {
            warn!("Session inactive, dropping {} command", command);
        }
        active
    }
}
