pub mod definitions;
pub mod errors;
pub mod program;
pub mod program_uri;
pub mod collaborators;
pub mod favorites;
pub mod config;
pub mod playback_state;
pub mod session_state;
pub mod session_events;
pub mod synchronizer;
pub mod dispatcher;
pub mod service;
pub mod tuner_session;

#[cfg(test)]
mod test_support;

pub use collaborators::{AppControl, BrowseTree, Collaborators, FavoritesOracle, SelectorParser};
pub use config::SessionConfig;
pub use definitions::{MetadataKey, PlaybackState, TransportActions};
pub use dispatcher::{TransportCommand, TransportDispatcher};
pub use errors::{AppControlError, SelectionError};
pub use favorites::{FavoritesEvent, InMemoryFavorites};
pub use playback_state::PlaybackStateRecord;
pub use program::{Program, ProgramInfo, ProgramSelector};
pub use program_uri::{BroadcastRadioUriParser, ProgramBrowseTree};
pub use service::WatchGroup;
pub use session_events::{ListenerHandle, SessionEvent, SessionListener};
pub use session_state::{Session, SessionMetadata};
pub use tuner_session::{ConnectionState, SessionInputs, TunerSession};
