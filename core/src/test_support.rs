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

//! Mock collaborators shared by unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::collaborators::AppControl;
use crate::errors::AppControlError;
use crate::favorites::InMemoryFavorites;
use crate::program::{Program, ProgramSelector};
use crate::session_events::{SessionEvent, SessionListener};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCall {
    Mute,
    Unmute,
    SeekForward,
    SeekBackward,
    Tune(ProgramSelector),
    AddFavorite(Program),
    RemoveFavorite(ProgramSelector),
    TuneToDefault,
}

/// Records every call. Favorite edits are applied to the linked store, like the real service does.
pub struct MockAppControl {
    calls: Mutex<Vec<AppCall>>,
    unreachable: AtomicBool,
    favorites: Arc<InMemoryFavorites>,
}

impl MockAppControl {
    pub fn new(favorites: Arc<InMemoryFavorites>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            unreachable: AtomicBool::new(false),
            favorites,
        })
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn take(&self) -> Vec<AppCall> {
        std::mem::take(&mut self.calls.lock().unwrap())
    }

    fn record(&self, call: AppCall) -> Result<(), AppControlError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(AppControlError::Unreachable("mock".to_string()));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl AppControl for MockAppControl {
    async fn mute(&self) -> Result<(), AppControlError> {
        self.record(AppCall::Mute)
    }

    async fn unmute(&self) -> Result<(), AppControlError> {
        self.record(AppCall::Unmute)
    }

    async fn seek_forward(&self) -> Result<(), AppControlError> {
        self.record(AppCall::SeekForward)
    }

    async fn seek_backward(&self) -> Result<(), AppControlError> {
        self.record(AppCall::SeekBackward)
    }

    async fn tune(&self, selector: &ProgramSelector) -> Result<(), AppControlError> {
        self.record(AppCall::Tune(selector.clone()))
    }

    async fn add_favorite(&self, program: &Program) -> Result<(), AppControlError> {
        self.record(AppCall::AddFavorite(program.clone()))?;
        self.favorites.add(program.clone());
        Ok(())
    }

    async fn remove_favorite(&self, selector: &ProgramSelector) -> Result<(), AppControlError> {
        self.record(AppCall::RemoveFavorite(selector.clone()))?;
        self.favorites.remove(selector);
        Ok(())
    }

    async fn tune_to_default_if_needed(&self) -> Result<(), AppControlError> {
        self.record(AppCall::TuneToDefault)
    }
}

pub struct EventRecorder {
    events: Mutex<Vec<SessionEvent>>,
}

impl EventRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { events: Mutex::new(Vec::new()) })
    }

    pub fn take(&self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events.lock().unwrap())
    }
}

impl SessionListener for EventRecorder {
    fn on_event(&self, event: &SessionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Routes crate logs to the test harness output. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).filter_level(log::LevelFilter::Debug).try_init();
}
