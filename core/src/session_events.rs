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

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use tokio::sync::mpsc;

use crate::playback_state::PlaybackStateRecord;
use crate::session_state::SessionMetadata;

/// Notifications published by a tuner session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Display metadata (including the favorite flag) of the current program changed.
    MetadataChanged(SessionMetadata),

    /// A playback state was published. Sent for every transition, repeated states included.
    PlaybackStateChanged(PlaybackStateRecord),

    /// The session became inactive. Nothing is published after this event.
    Deactivated,
}

/// Observer of session publishes. Called synchronously from the publishing handler while the
/// session's publish locks are held, so implementations must return quickly and must not call back
/// into the session. Forward to a channel ([`ChannelListener`]) when more work is needed.
pub trait SessionListener: Send + Sync + 'static {
    fn on_event(&self, event: &SessionEvent);
}

impl<F> SessionListener for F
where
    F: Fn(&SessionEvent) + Send + Sync + 'static,
{
    fn on_event(&self, event: &SessionEvent) {
        self(event)
    }
}

/// Forwards events into an unbounded tokio channel.
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelListener {
    pub fn new(tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { tx }
    }
}

impl SessionListener for ChannelListener {
    fn on_event(&self, event: &SessionEvent) {
        if self.tx.send(event.clone()).is_err() {
            debug!("Session event receiver dropped");
        }
    }
}

/// Token returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(NonZeroU64);

struct Registrations {
    closed: bool,
    listeners: Vec<(ListenerHandle, Arc<dyn SessionListener>)>,
}

/// Registry of session listeners with explicit unsubscribe and atomic teardown.
pub struct ListenerRegistry {
    registrations: Mutex<Registrations>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            registrations: Mutex::new(Registrations { closed: false, listeners: Vec::new() }),
            next_id: AtomicU64::new(1),
        }
    }

    fn next_handle(&self) -> ListenerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        ListenerHandle(NonZeroU64::new(id).unwrap_or(NonZeroU64::MIN))
    }

    /// Registers a listener. On a closed registry the listener is dropped right away and will
    /// never be called.
    pub fn subscribe(&self, listener: Arc<dyn SessionListener>) -> ListenerHandle {
        let handle = self.next_handle();
        let mut registrations = self.lock();
        if registrations.closed {
            warn!("Subscribing to a released session; listener {} will not be notified", handle.0);
        } else {
            registrations.listeners.push((handle, listener));
        }
        handle
    }

    /// Returns false when the handle was not registered.
    pub fn unsubscribe(&self, handle: ListenerHandle) -> bool {
        let mut registrations = self.lock();
        let before = registrations.listeners.len();
        registrations.listeners.retain(|(h, _)| *h != handle);
        registrations.listeners.len() != before
    }

    /// Drops every listener and refuses new ones.
    pub fn clear(&self) {
        let removed = {
            let mut registrations = self.lock();
            registrations.closed = true;
            std::mem::take(&mut registrations.listeners)
        };
        debug!("Cleared {} session listeners", removed.len());
    }

    pub fn len(&self) -> usize {
        self.lock().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify(&self, event: &SessionEvent) {
        // listeners run without the registry lock so they may unsubscribe themselves
        let listeners: Vec<Arc<dyn SessionListener>> = self.lock()
                                                           .listeners
                                                           .iter()
                                                           .map(|(_, l)| l.clone())
                                                           .collect();
        for listener in listeners {
            listener.on_event(event);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registrations> {
        // a listener panicking must not take the whole session down
        self.registrations.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
