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

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info, trace, warn};

use crate::collaborators::{AppControl, FavoritesOracle};
use crate::config::{SessionConfig, DEFAULT_INVALID_SELECTION_MESSAGE};
use crate::definitions::PlaybackState;
use crate::errors::SelectionError;
use crate::playback_state::{PlaybackStateRecord, PlaybackStateReducer};
use crate::program::ProgramInfo;
use crate::session_events::{ListenerRegistry, SessionEvent};
use crate::session_state::{Session, SessionMetadata};

/// State a pulse settles in once the `Error` record went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PulseRestore {
    /// The state published before the pulse. The tuner is still fine after a bad selection.
    Previous,
    /// `None`, so the session is shown disabled while the tuner itself is failing.
    Idle,
}

#[derive(Default)]
struct MetadataSection {
    current_program: Option<ProgramInfo>,
    published: Option<SessionMetadata>,
}

/// Keeps the published session consistent with the tuner's live state.
///
/// Metadata and playback state are guarded by two independent locks which are never held at the
/// same time. The metadata lock is async because set-rating calls the app-control collaborator
/// while holding it; the playback lock only ever guards synchronous publish work.
pub struct SessionSynchronizer {
    config: SessionConfig,
    app_control: Arc<dyn AppControl>,
    favorites: Arc<dyn FavoritesOracle>,
    listeners: Arc<ListenerRegistry>,
    metadata: tokio::sync::Mutex<MetadataSection>,
    playback: Mutex<PlaybackStateRecord>,
    // publish gate, leaf lock taken after either section lock. Publishers share it, so metadata
    // and playback publishes never wait on each other; deactivation waits for in-flight publishes.
    active: RwLock<bool>,
}

impl SessionSynchronizer {
    pub fn new(config: SessionConfig,
               app_control: Arc<dyn AppControl>,
               favorites: Arc<dyn FavoritesOracle>,
               listeners: Arc<ListenerRegistry>) -> Self {
        let playback = PlaybackStateRecord::new(PlaybackState::None, config.actions);
        Self {
            config,
            app_control,
            favorites,
            listeners,
            metadata: tokio::sync::Mutex::new(MetadataSection::default()),
            playback: Mutex::new(playback),
            active: RwLock::new(true),
        }
    }

    pub fn app_control(&self) -> &Arc<dyn AppControl> {
        &self.app_control
    }

    pub fn is_active(&self) -> bool {
        *self.read_active()
    }

    /// Replaces the current program and republishes its metadata if it changed.
    pub async fn on_program_changed(&self, info: ProgramInfo) {
        let mut section = self.metadata.lock().await;
        trace!("Program changed to {}", info.selector());
        section.current_program = Some(info);
        self.republish_metadata(&mut section);
    }

    /// Recomputes the favorite flag of whatever program is current when the lock is taken.
    pub async fn on_favorites_changed(&self) {
        let mut section = self.metadata.lock().await;
        self.republish_metadata(&mut section);
    }

    /// Publishes the reduced state. Unknown codes are logged and dropped.
    pub fn on_playback_state_changed(&self, raw: u8) {
        match PlaybackStateReducer::reduce(raw) {
            Ok(PlaybackState::Error) => self.error_pulse(&self.config.playback_error_message, PulseRestore::Idle),
            Ok(state) => self.publish_playback_state(state),
            Err(e) => warn!("Ignoring playback state update: {}", e),
        }
    }

    /// Terminal: the session goes inactive and publishes nothing afterwards.
    pub fn on_connection_error(&self) {
        if self.deactivate(true) {
            info!("Tuner service connection lost, session deactivated");
        }
    }

    /// Mutes audio and emits the error pulse for an unresolvable selection.
    pub async fn selection_error(&self, error: SelectionError) {
        warn!("{}", error);
        if let Err(e) = self.app_control.mute().await {
            warn!("Failed to mute after invalid selection: {}", e);
        }
        self.error_pulse(&self.config.invalid_selection_message, PulseRestore::Previous);
    }

    /// Runs `f` with the current program while holding the metadata lock, so no program change
    /// can interleave. Returns `None` without calling `f` when no program was tuned yet.
    pub async fn with_current_program<F, Fut>(&self, f: F) -> Option<Fut::Output>
    where
        F: FnOnce(ProgramInfo) -> Fut,
        Fut: Future,
    {
        let section = self.metadata.lock().await;
        let info = section.current_program.clone()?;
        let output = f(info).await;
        drop(section);
        Some(output)
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.lock_playback().state
    }

    pub async fn snapshot(&self) -> Session {
        let (current_program, is_favorite) = {
            let section = self.metadata.lock().await;
            let is_favorite = section.published.as_ref().is_some_and(|m| m.is_favorite);
            (section.current_program.clone(), is_favorite)
        };
        let playback = self.lock_playback().clone();
        Session {
            current_program,
            is_favorite,
            playback,
            is_active: self.is_active(),
        }
    }

    /// Marks the session inactive. Returns false when it already was.
    pub(crate) fn deactivate(&self, notify: bool) -> bool {
        let mut active = self.write_active();
        if !*active {
            return false;
        }
        *active = false;
        if notify {
            self.listeners.notify(&SessionEvent::Deactivated);
        }
        true
    }

    fn republish_metadata(&self, section: &mut MetadataSection) {
        let Some(info) = section.current_program.as_ref() else {
            trace!("No program yet, nothing to republish");
            return;
        };
        let is_favorite = self.favorites.is_favorite(info.selector());
        let metadata = SessionMetadata::from_program_info(info, is_favorite);
        if section.published.as_ref() == Some(&metadata) {
            trace!("Metadata unchanged, skipping publish");
            return;
        }
        debug!("Publishing metadata: {:?}", metadata);
        self.publish(SessionEvent::MetadataChanged(metadata.clone()));
        section.published = Some(metadata);
    }

    fn publish_playback_state(&self, state: PlaybackState) {
        let mut record = self.lock_playback();
        *record = PlaybackStateRecord::new(state, self.config.actions);
        debug!("Publishing playback state {:?}", state);
        self.publish(SessionEvent::PlaybackStateChanged(record.clone()));
    }

    // Error, then the restored state with the message cleared. Both under one lock so nothing can
    // land between them.
    fn error_pulse(&self, message: &str, restore: PulseRestore) {
        let message = if message.is_empty() { DEFAULT_INVALID_SELECTION_MESSAGE } else { message };
        let mut record = self.lock_playback();
        let previous = match (restore, record.state) {
            (PulseRestore::Idle, _) | (PulseRestore::Previous, PlaybackState::Error) => PlaybackState::None,
            (PulseRestore::Previous, state) => state,
        };
        debug!("Publishing error pulse: {}", message);
        self.publish(SessionEvent::PlaybackStateChanged(PlaybackStateRecord::with_error(message, self.config.actions)));
        *record = PlaybackStateRecord::new(previous, self.config.actions);
        self.publish(SessionEvent::PlaybackStateChanged(record.clone()));
    }

    fn publish(&self, event: SessionEvent) {
        let active = self.read_active();
        if !*active {
            trace!("Session inactive, dropping {:?}", event);
            return;
        }
        self.listeners.notify(&event);
    }

    fn lock_playback(&self) -> MutexGuard<'_, PlaybackStateRecord> {
        self.playback.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_active(&self) -> RwLockReadGuard<'_, bool> {
        self.active.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_active(&self) -> RwLockWriteGuard<'_, bool> {
        self.active.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{MetadataKey, VisualClass};
    use crate::errors::PlaybackStateError;
    use crate::favorites::InMemoryFavorites;
    use crate::program::{Program, ProgramSelector};
    use crate::session_events::SessionListener;
    use crate::test_support::{AppCall, EventRecorder, MockAppControl, init_logging};

    struct Fixture {
        favorites: Arc<InMemoryFavorites>,
        app: Arc<MockAppControl>,
        events: Arc<EventRecorder>,
        synchronizer: Arc<SessionSynchronizer>,
    }

    fn fixture() -> Fixture {
        init_logging();
        let favorites = Arc::new(InMemoryFavorites::new());
        let app = MockAppControl::new(favorites.clone());
        let listeners = Arc::new(ListenerRegistry::new());
        let events = EventRecorder::new();
        listeners.subscribe(events.clone());
        let synchronizer = Arc::new(SessionSynchronizer::new(
            SessionConfig::default(), app.clone(), favorites.clone(), listeners));
        Fixture { favorites, app, events, synchronizer }
    }

    fn station(frequency_khz: u64, name: &str) -> ProgramInfo {
        ProgramInfo::new(ProgramSelector::amfm(frequency_khz)).with_text(MetadataKey::RdsProgramService, name)
    }

    fn metadata_events(events: &[SessionEvent]) -> Vec<SessionMetadata> {
        events.iter()
              .filter_map(|e| match e {
                  SessionEvent::MetadataChanged(m) => Some(m.clone()),
                  _ => None,
              })
              .collect()
    }

    fn playback_events(events: &[SessionEvent]) -> Vec<PlaybackStateRecord> {
        events.iter()
              .filter_map(|e| match e {
                  SessionEvent::PlaybackStateChanged(r) => Some(r.clone()),
                  _ => None,
              })
              .collect()
    }

    #[tokio::test]
    async fn first_program_publishes_metadata_with_favorite_flag() {
        let f = fixture();
        f.favorites.add(Program::new(ProgramSelector::amfm(97_900), "ROCK"));

        f.synchronizer.on_program_changed(station(97_900, "ROCK")).await;

        let metadata = metadata_events(&f.events.take());
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata[0].display_title, "ROCK");
        assert!(metadata[0].is_favorite);
    }

    #[tokio::test]
    async fn republishing_identical_program_is_deduplicated() {
        let f = fixture();
        f.synchronizer.on_program_changed(station(97_900, "ROCK")).await;
        f.synchronizer.on_program_changed(station(97_900, "ROCK")).await;
        f.synchronizer.on_favorites_changed().await;

        assert_eq!(metadata_events(&f.events.take()).len(), 1);
    }

    #[tokio::test]
    async fn metadata_change_of_same_program_is_published() {
        let f = fixture();
        f.synchronizer.on_program_changed(station(97_900, "ROCK")).await;
        f.synchronizer.on_program_changed(station(97_900, "ROCK").with_text(MetadataKey::Title, "Song")).await;

        let metadata = metadata_events(&f.events.take());
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata[1].title.as_deref(), Some("Song"));
    }

    #[tokio::test]
    async fn favorites_change_republishes_current_program_only() {
        let f = fixture();
        f.synchronizer.on_program_changed(station(97_900, "ROCK")).await;
        f.events.take();

        f.favorites.add(Program::new(ProgramSelector::amfm(97_900), "ROCK"));
        f.synchronizer.on_favorites_changed().await;
        f.favorites.add(Program::new(ProgramSelector::amfm(88_500), "JAZZ"));
        f.synchronizer.on_favorites_changed().await;

        let events = f.events.take();
        assert_eq!(metadata_events(&events).len(), 1);
        assert!(metadata_events(&events)[0].is_favorite);
        assert!(playback_events(&events).is_empty());
    }

    #[tokio::test]
    async fn favorites_change_before_first_program_publishes_nothing() {
        let f = fixture();
        f.synchronizer.on_favorites_changed().await;
        assert!(f.events.take().is_empty());
        assert_eq!(f.synchronizer.snapshot().await.current_program, None);
    }

    #[tokio::test]
    async fn playback_state_is_published_even_when_repeated() {
        let f = fixture();
        f.synchronizer.on_playback_state_changed(PlaybackState::Connecting.code());
        f.synchronizer.on_playback_state_changed(PlaybackState::Connecting.code());
        f.synchronizer.on_playback_state_changed(PlaybackState::Playing.code());

        let records = playback_events(&f.events.take());
        let states: Vec<_> = records.iter().map(|r| r.state).collect();
        assert_eq!(states, vec![PlaybackState::Connecting, PlaybackState::Connecting, PlaybackState::Playing]);
        assert!(records.iter().all(|r| r.position.is_none() && r.rate == 1.0 && r.error_message.is_none()));
    }

    #[tokio::test]
    async fn unsupported_playback_code_leaves_state_untouched_and_publishes_nothing() {
        let f = fixture();
        f.synchronizer.on_playback_state_changed(PlaybackState::Playing.code());
        f.events.take();

        for raw in [4u8, 5, 6, 11, 200] {
            assert_eq!(PlaybackStateReducer::reduce(raw), Err(PlaybackStateError::Unsupported(raw)));
            f.synchronizer.on_playback_state_changed(raw);
        }

        assert!(f.events.take().is_empty());
        assert_eq!(f.synchronizer.playback_state(), PlaybackState::Playing);
    }

    #[tokio::test]
    async fn selection_error_mutes_once_and_publishes_error_then_previous_state() {
        let f = fixture();
        f.synchronizer.on_playback_state_changed(PlaybackState::Playing.code());
        f.events.take();

        f.synchronizer.selection_error(SelectionError::InvalidUri("bogus".into())).await;

        assert_eq!(f.app.take(), vec![AppCall::Mute]);
        let records = playback_events(&f.events.take());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].state, PlaybackState::Error);
        assert_eq!(records[0].error_message.as_deref(), Some("Invalid selection"));
        assert_eq!(records[1].state, PlaybackState::Playing);
        assert_eq!(records[1].error_message, None);
        assert_eq!(f.synchronizer.playback_state(), PlaybackState::Playing);
    }

    #[tokio::test]
    async fn selection_error_still_pulses_when_mute_fails() {
        let f = fixture();
        f.app.set_unreachable(true);

        f.synchronizer.selection_error(SelectionError::InvalidMediaId("nope".into())).await;

        let records = playback_events(&f.events.take());
        assert_eq!(records.iter().map(|r| r.state).collect::<Vec<_>>(),
                   vec![PlaybackState::Error, PlaybackState::None]);
    }

    #[tokio::test]
    async fn error_reported_by_tuner_is_a_pulse_too() {
        let f = fixture();
        f.synchronizer.on_playback_state_changed(PlaybackState::Stopped.code());
        f.events.take();

        f.synchronizer.on_playback_state_changed(PlaybackState::Error.code());

        let records = playback_events(&f.events.take());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].state, PlaybackState::Error);
        assert_eq!(records[0].error_message.as_deref(), Some("Radio unavailable"));
        assert_eq!(records[1].state, PlaybackState::None);
        assert_eq!(records[1].error_message, None);
        assert!(f.app.take().is_empty());
    }

    #[tokio::test]
    async fn tuner_error_does_not_revert_to_playing() {
        let f = fixture();
        f.synchronizer.on_playback_state_changed(PlaybackState::Playing.code());
        f.events.take();

        f.synchronizer.on_playback_state_changed(PlaybackState::Error.code());

        let states: Vec<PlaybackState> = playback_events(&f.events.take()).iter().map(|r| r.state).collect();
        assert_eq!(states, vec![PlaybackState::Error, PlaybackState::None]);
        let resting = f.synchronizer.playback_state();
        assert_eq!(resting, PlaybackState::None);
        assert_eq!(resting.visual_class(), VisualClass::Disabled);
    }

    #[tokio::test]
    async fn connection_error_deactivates_once_and_silences_session() {
        let f = fixture();
        f.synchronizer.on_connection_error();
        f.synchronizer.on_connection_error();
        f.synchronizer.on_program_changed(station(97_900, "ROCK")).await;
        f.synchronizer.on_playback_state_changed(PlaybackState::Playing.code());

        assert_eq!(f.events.take(), vec![SessionEvent::Deactivated]);
        assert!(!f.synchronizer.snapshot().await.is_active);
    }

    #[tokio::test]
    async fn with_current_program_skips_closure_without_program() {
        let f = fixture();
        assert_eq!(f.synchronizer.with_current_program(|_| async { 1 }).await, None);

        f.synchronizer.on_program_changed(station(97_900, "ROCK")).await;
        let name = f.synchronizer.with_current_program(|info| async move { info.display_name() }).await;
        assert_eq!(name.as_deref(), Some("ROCK"));
    }

    #[tokio::test]
    async fn snapshot_reflects_last_published_values() {
        let f = fixture();
        f.favorites.add(Program::new(ProgramSelector::amfm(97_900), "ROCK"));
        f.synchronizer.on_program_changed(station(97_900, "ROCK")).await;
        f.synchronizer.on_playback_state_changed(PlaybackState::Playing.code());

        let session = f.synchronizer.snapshot().await;
        assert_eq!(session.current_program, Some(station(97_900, "ROCK")));
        assert!(session.is_favorite);
        assert_eq!(session.playback.state, PlaybackState::Playing);
        assert!(session.is_active);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_program_and_favorites_changes_never_publish_stale_favorite_flag() {
        let f = fixture();
        // B is a favorite, A is not; favorites churn on an unrelated program
        f.favorites.add(Program::new(ProgramSelector::amfm(88_500), "B"));
        f.synchronizer.on_program_changed(station(88_500, "B")).await;

        let mut tasks = Vec::new();
        for i in 0..200u64 {
            let synchronizer = f.synchronizer.clone();
            let favorites = f.favorites.clone();
            tasks.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    let info = if i % 4 == 0 { station(101_100, "A") } else { station(88_500, "B") };
                    synchronizer.on_program_changed(info).await;
                } else {
                    let unrelated = ProgramSelector::amfm(90_000 + i);
                    favorites.add(Program::new(unrelated.clone(), "X"));
                    synchronizer.on_favorites_changed().await;
                    favorites.remove(&unrelated);
                    synchronizer.on_favorites_changed().await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let metadata = metadata_events(&f.events.take());
        assert!(!metadata.is_empty());
        for m in metadata {
            match m.display_title.as_str() {
                "A" => assert!(!m.is_favorite),
                "B" => assert!(m.is_favorite),
                other => panic!("unexpected program {}", other),
            }
        }
    }

    /// On the first playback publish, runs a metadata publish on another thread and waits for it.
    struct CrossSectionListener {
        synchronizer: std::sync::OnceLock<Arc<SessionSynchronizer>>,
        fired: std::sync::atomic::AtomicBool,
        completed: std::sync::atomic::AtomicBool,
    }

    impl SessionListener for CrossSectionListener {
        fn on_event(&self, event: &SessionEvent) {
            use std::sync::atomic::Ordering;
            if !matches!(event, SessionEvent::PlaybackStateChanged(_)) || self.fired.swap(true, Ordering::SeqCst) {
                return;
            }
            let Some(synchronizer) = self.synchronizer.get().cloned() else {
                return;
            };
            let (done_tx, done_rx) = std::sync::mpsc::channel();
            std::thread::spawn(move || {
                futures::executor::block_on(synchronizer.on_program_changed(station(101_100, "B")));
                let _ = done_tx.send(());
            });
            let completed = done_rx.recv_timeout(std::time::Duration::from_secs(2)).is_ok();
            self.completed.store(completed, Ordering::SeqCst);
        }
    }

    #[test]
    fn metadata_publish_proceeds_while_playback_listener_is_running() {
        init_logging();
        let favorites = Arc::new(InMemoryFavorites::new());
        let app = MockAppControl::new(favorites.clone());
        let listeners = Arc::new(ListenerRegistry::new());
        let listener = Arc::new(CrossSectionListener {
            synchronizer: std::sync::OnceLock::new(),
            fired: Default::default(),
            completed: Default::default(),
        });
        listeners.subscribe(listener.clone());
        let events = EventRecorder::new();
        listeners.subscribe(events.clone());
        let synchronizer = Arc::new(SessionSynchronizer::new(
            SessionConfig::default(), app, favorites, listeners));
        let _ = listener.synchronizer.set(synchronizer.clone());

        synchronizer.on_playback_state_changed(PlaybackState::Playing.code());

        assert!(listener.completed.load(std::sync::atomic::Ordering::SeqCst));
        let metadata = metadata_events(&events.take());
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata[0].display_title, "B");
    }
}
