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

use log::{debug, info, warn};
use tokio::select;
use tokio::sync::{broadcast, mpsc};

use crate::collaborators::Collaborators;
use crate::config::SessionConfig;
use crate::dispatcher::{TransportCommand, TransportDispatcher};
use crate::favorites::FavoritesEvent;
use crate::program::ProgramInfo;
use crate::service::{spawn_watch, StopSignal, WatchGroup};
use crate::session_events::{ChannelListener, ListenerHandle, ListenerRegistry, SessionEvent, SessionListener};
use crate::session_state::Session;
use crate::synchronizer::SessionSynchronizer;

/// Link state of the tuner application service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Connected,
    Error,
}

/// Input streams a session watches.
pub struct SessionInputs {
    pub programs: mpsc::Receiver<ProgramInfo>,
    /// Raw playback codes as reported by the tuner service.
    pub playback_states: mpsc::Receiver<u8>,
    pub favorites: broadcast::Receiver<FavoritesEvent>,
    /// Every link transition, in order. An `Error` is terminal even if `Connected` follows.
    pub connection: mpsc::Receiver<ConnectionState>,
}

/// Media session of the tuner: publishes program metadata and playback state to listeners and
/// turns transport commands into app-control calls.
pub struct TunerSession {
    listeners: Arc<ListenerRegistry>,
    synchronizer: Arc<SessionSynchronizer>,
    dispatcher: TransportDispatcher,
}

impl TunerSession {
    pub fn new(config: SessionConfig, collaborators: Collaborators) -> Self {
        let listeners = Arc::new(ListenerRegistry::new());
        let synchronizer = Arc::new(SessionSynchronizer::new(config,
                                                             collaborators.app_control,
                                                             collaborators.favorites,
                                                             listeners.clone()));
        let dispatcher = TransportDispatcher::new(synchronizer.clone(),
                                                  collaborators.browse_tree,
                                                  collaborators.selector_parser);
        Self { listeners, synchronizer, dispatcher }
    }

    pub fn subscribe(&self, listener: Arc<dyn SessionListener>) -> ListenerHandle {
        self.listeners.subscribe(listener)
    }

    pub fn subscribe_channel(&self) -> (ListenerHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.subscribe(Arc::new(ChannelListener::new(tx))), rx)
    }

    pub fn unsubscribe(&self, handle: ListenerHandle) -> bool {
        self.listeners.unsubscribe(handle)
    }

    pub fn synchronizer(&self) -> &Arc<SessionSynchronizer> {
        &self.synchronizer
    }

    pub fn dispatcher(&self) -> &TransportDispatcher {
        &self.dispatcher
    }

    pub async fn dispatch(&self, command: TransportCommand) {
        self.dispatcher.dispatch(command).await
    }

    pub async fn snapshot(&self) -> Session {
        self.synchronizer.snapshot().await
    }

    pub fn is_active(&self) -> bool {
        self.synchronizer.is_active()
    }

    /// Tears the session down: it goes inactive and every listener is dropped at once.
    pub fn release(&self) {
        if self.synchronizer.deactivate(false) {
            info!("Tuner session released");
        }
        self.listeners.clear();
    }

    /// Spawns one watch task per input stream. Each stream is handled in arrival order.
    pub fn run_watch(&self, inputs: SessionInputs) -> WatchGroup {
        let SessionInputs { programs, playback_states, favorites, connection } = inputs;
        let mut group = WatchGroup::new();

        let synchronizer = self.synchronizer.clone();
        group.push(spawn_watch("programs", move |stop| watch_programs(synchronizer, programs, stop)));

        let synchronizer = self.synchronizer.clone();
        group.push(spawn_watch("playback", move |stop| watch_playback(synchronizer, playback_states, stop)));

        let synchronizer = self.synchronizer.clone();
        group.push(spawn_watch("favorites", move |stop| watch_favorites(synchronizer, favorites, stop)));

        let synchronizer = self.synchronizer.clone();
        group.push(spawn_watch("connection", move |stop| watch_connection(synchronizer, connection, stop)));

        group
    }
}

async fn watch_programs(synchronizer: Arc<SessionSynchronizer>,
                        mut programs: mpsc::Receiver<ProgramInfo>,
                        mut stop: StopSignal) {
    loop {
        select! {
            biased;
            _ = stop.requested() => break,
            info = programs.recv() => match info {
                Some(info) => synchronizer.on_program_changed(info).await,
                None => {
                    debug!("Program stream closed");
                    break;
                }
            }
        }
    }
}

async fn watch_playback(synchronizer: Arc<SessionSynchronizer>,
                        mut playback_states: mpsc::Receiver<u8>,
                        mut stop: StopSignal) {
    loop {
        select! {
            biased;
            _ = stop.requested() => break,
            raw = playback_states.recv() => match raw {
                Some(raw) => synchronizer.on_playback_state_changed(raw),
                None => {
                    debug!("Playback state stream closed");
                    break;
                }
            }
        }
    }
}

async fn watch_favorites(synchronizer: Arc<SessionSynchronizer>,
                         mut favorites: broadcast::Receiver<FavoritesEvent>,
                         mut stop: StopSignal) {
    loop {
        select! {
            biased;
            _ = stop.requested() => break,
            event = favorites.recv() => match event {
                Ok(event) => {
                    debug!("Favorites changed: {:?}", event);
                    synchronizer.on_favorites_changed().await;
                }
                // the oracle is queried on republish, so one refresh covers every missed event
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Favorites events lagged by {} messages; refreshing", n);
                    synchronizer.on_favorites_changed().await;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Favorites stream closed");
                    break;
                }
            }
        }
    }
}

async fn watch_connection(synchronizer: Arc<SessionSynchronizer>,
                          mut connection: mpsc::Receiver<ConnectionState>,
                          mut stop: StopSignal) {
    loop {
        select! {
            biased;
            _ = stop.requested() => break,
            state = connection.recv() => match state {
                Some(ConnectionState::Error) => {
                    synchronizer.on_connection_error();
                    break;
                }
                Some(ConnectionState::Connected) => debug!("Tuner service connected"),
                None => {
                    debug!("Connection state stream closed");
                    break;
                }
            }
        }
    }
}
