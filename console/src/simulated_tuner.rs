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


//! Stand-in for the tuner application service.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tuner_session_core::{
    AppControl, AppControlError, ConnectionState, InMemoryFavorites, MetadataKey, PlaybackState, Program,
    ProgramInfo, ProgramSelector,
};

const STATIONS: [(u64, &str, &str); 5] = [
    (88_500, "JAZZ 88", "Late night standards"),
    (94_300, "CLASSIC", "Symphony No. 5"),
    (101_100, "ROCK 101", "Live from the garage"),
    (1_010, "NEWS 1010", ""),
    (1_500, "TALK", ""),
];

pub fn station_list() -> Vec<ProgramInfo> {
    STATIONS.iter()
            .map(|(frequency, name, text)| {
                ProgramInfo::new(ProgramSelector::amfm(*frequency))
                    .with_text(MetadataKey::RdsProgramService, *name)
                    .with_text(MetadataKey::Title, *text)
            })
            .collect()
}

struct TunerState {
    current: Option<usize>,
}

/// Simulated tuner. Reports program and playback changes over channels, like the real service
/// does over its callback interface.
pub struct SimulatedTuner {
    stations: Vec<ProgramInfo>,
    default_frequency: u64,
    state: Mutex<TunerState>,
    favorites: Arc<InMemoryFavorites>,
    programs: mpsc::Sender<ProgramInfo>,
    playback_states: mpsc::Sender<u8>,
    connected: AtomicBool,
    connection: mpsc::Sender<ConnectionState>,
}

impl SimulatedTuner {
    pub fn new(stations: Vec<ProgramInfo>,
               default_frequency: u64,
               favorites: Arc<InMemoryFavorites>,
               programs: mpsc::Sender<ProgramInfo>,
               playback_states: mpsc::Sender<u8>,
               connection: mpsc::Sender<ConnectionState>) -> Self {
        Self {
            stations,
            default_frequency,
            state: Mutex::new(TunerState { current: None }),
            favorites,
            programs,
            playback_states,
            connected: AtomicBool::new(true),
            connection,
        }
    }

    /// Drops the link to the session. The session treats this as terminal.
    pub fn disconnect(&self) {
        info!("Simulating tuner service disconnect");
        self.connected.store(false, Ordering::SeqCst);
        if let Err(e) = self.connection.try_send(ConnectionState::Error) {
            warn!("Cannot report disconnect: {}", e);
        }
    }

    /// Reports a raw playback code as the tuner service would.
    pub async fn report_raw_state(&self, raw: u8) -> Result<(), AppControlError> {
        self.report(raw).await
    }

    fn current(&self) -> Option<usize> {
        self.state.lock().map(|s| s.current).unwrap_or(None)
    }

    fn set_current(&self, index: usize) {
        if let Ok(mut state) = self.state.lock() {
            state.current = Some(index);
        }
    }

    fn ensure_connected(&self) -> Result<(), AppControlError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppControlError::Disconnected)
        }
    }

    async fn report(&self, raw: u8) -> Result<(), AppControlError> {
        self.playback_states.send(raw).await.map_err(|_| AppControlError::Disconnected)
    }

    async fn announce(&self, info: ProgramInfo) -> Result<(), AppControlError> {
        self.programs.send(info).await.map_err(|_| AppControlError::Disconnected)
    }

    async fn tune_index(&self, index: usize) -> Result<(), AppControlError> {
        let info = self.stations[index].clone();
        debug!("Tuning to {}", info.selector());
        self.report(PlaybackState::Connecting.code()).await?;
        self.set_current(index);
        self.announce(info).await?;
        self.report(PlaybackState::Playing.code()).await
    }

    async fn seek(&self, skipping: PlaybackState, step: isize) -> Result<(), AppControlError> {
        self.ensure_connected()?;
        if self.stations.is_empty() {
            return Err(AppControlError::Rejected("station list is empty".to_string()));
        }
        self.report(skipping.code()).await?;
        let count = self.stations.len() as isize;
        let next = match self.current() {
            Some(current) => (current as isize + step).rem_euclid(count),
            None => 0,
        };
        self.tune_index(next as usize).await
    }
}

#[async_trait]
impl AppControl for SimulatedTuner {
    async fn mute(&self) -> Result<(), AppControlError> {
        self.ensure_connected()?;
        self.report(PlaybackState::Stopped.code()).await
    }

    async fn unmute(&self) -> Result<(), AppControlError> {
        self.ensure_connected()?;
        self.report(PlaybackState::Playing.code()).await
    }

    async fn seek_forward(&self) -> Result<(), AppControlError> {
        self.seek(PlaybackState::SkippingToNext, 1).await
    }

    async fn seek_backward(&self) -> Result<(), AppControlError> {
        self.seek(PlaybackState::SkippingToPrevious, -1).await
    }

    async fn tune(&self, selector: &ProgramSelector) -> Result<(), AppControlError> {
        self.ensure_connected()?;
        match self.stations.iter().position(|s| s.selector() == selector) {
            Some(index) => self.tune_index(index).await,
            None => Err(AppControlError::Rejected(format!("no station at {}", selector))),
        }
    }

    async fn add_favorite(&self, program: &Program) -> Result<(), AppControlError> {
        self.ensure_connected()?;
        self.favorites.add(program.clone());
        Ok(())
    }

    async fn remove_favorite(&self, selector: &ProgramSelector) -> Result<(), AppControlError> {
        self.ensure_connected()?;
        self.favorites.remove(selector);
        Ok(())
    }

    async fn tune_to_default_if_needed(&self) -> Result<(), AppControlError> {
        self.ensure_connected()?;
        if self.current().is_some() {
            return Ok(());
        }
        if self.stations.is_empty() {
            return Err(AppControlError::Rejected("station list is empty".to_string()));
        }
        let default = ProgramSelector::amfm(self.default_frequency);
        let index = self.stations.iter().position(|s| *s.selector() == default).unwrap_or(0);
        self.tune_index(index).await
    }
}
