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

use std::sync::Mutex;

use log::debug;
use tokio::sync::broadcast;

use crate::collaborators::FavoritesOracle;
use crate::program::{Program, ProgramSelector};

/// Change notification emitted by [`InMemoryFavorites`].
#[derive(Debug, Clone, PartialEq)]
pub enum FavoritesEvent {
    Added(Program),
    Removed(ProgramSelector),
}

/// Favorites kept in memory, in insertion order.
pub struct InMemoryFavorites {
    programs: Mutex<Vec<Program>>,
    event_sender: broadcast::Sender<FavoritesEvent>,
}

impl InMemoryFavorites {
    pub fn new() -> Self {
        let (event_sender, _) = broadcast::channel(64);
        Self {
            programs: Mutex::new(Vec::new()),
            event_sender,
        }
    }

    /// Adds or renames a favorite. Returns false when nothing changed.
    pub fn add(&self, program: Program) -> bool {
        {
            let mut programs = self.lock();
            match programs.iter_mut().find(|p| p.selector == program.selector) {
                Some(existing) if *existing == program => return false,
                Some(existing) => *existing = program.clone(),
                None => programs.push(program.clone()),
            }
        }
        debug!("Favorite added: {}", program.selector);
        let _ = self.event_sender.send(FavoritesEvent::Added(program));
        true
    }

    /// Returns false when the program was not a favorite.
    pub fn remove(&self, selector: &ProgramSelector) -> bool {
        let removed = {
            let mut programs = self.lock();
            let before = programs.len();
            programs.retain(|p| p.selector != *selector);
            programs.len() != before
        };
        if removed {
            debug!("Favorite removed: {}", selector);
            let _ = self.event_sender.send(FavoritesEvent::Removed(selector.clone()));
        }
        removed
    }

    pub fn list(&self) -> Vec<Program> {
        self.lock().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FavoritesEvent> {
        self.event_sender.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Program>> {
        self.programs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for InMemoryFavorites {
    fn default() -> Self {
        Self::new()
    }
}

impl FavoritesOracle for InMemoryFavorites {
    fn is_favorite(&self, selector: &ProgramSelector) -> bool {
        self.lock().iter().any(|p| p.selector == *selector)
    }
}
