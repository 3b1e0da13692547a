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

use crate::definitions::MetadataKey;
use crate::playback_state::PlaybackStateRecord;
use crate::program::ProgramInfo;

/// Display metadata published for the current program.
///
/// Two values comparing equal mean observers have nothing new to show, which is what metadata
/// de-duplication relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionMetadata {
    pub display_title: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub art_id: Option<u64>,
    pub is_favorite: bool,
}

impl SessionMetadata {
    pub fn from_program_info(info: &ProgramInfo, is_favorite: bool) -> Self {
        let non_empty = |key| info.text(key).filter(|text| !text.is_empty()).map(str::to_string);
        Self {
            display_title: info.display_name(),
            title: non_empty(MetadataKey::Title),
            artist: non_empty(MetadataKey::Artist),
            album: non_empty(MetadataKey::Album),
            art_id: info.int(MetadataKey::Art).filter(|id| *id != 0),
            is_favorite,
        }
    }
}

/// Immutable view of the published session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub current_program: Option<ProgramInfo>,
    pub is_favorite: bool,
    pub playback: PlaybackStateRecord,
    pub is_active: bool,
}
