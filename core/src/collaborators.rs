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

use async_trait::async_trait;

use crate::errors::AppControlError;
use crate::program::{Program, ProgramSelector};

/// Control surface of the tuner application service.
///
/// Every call may fail when the service is unreachable. Callers in this crate log such failures and
/// drop the command.
#[async_trait]
pub trait AppControl: Send + Sync {
    async fn mute(&self) -> Result<(), AppControlError>;

    async fn unmute(&self) -> Result<(), AppControlError>;

    async fn seek_forward(&self) -> Result<(), AppControlError>;

    async fn seek_backward(&self) -> Result<(), AppControlError>;

    async fn tune(&self, selector: &ProgramSelector) -> Result<(), AppControlError>;

    async fn add_favorite(&self, program: &Program) -> Result<(), AppControlError>;

    async fn remove_favorite(&self, selector: &ProgramSelector) -> Result<(), AppControlError>;

    /// Tunes to a default program when nothing is tuned yet. Services without default-tune logic
    /// keep this no-op.
    async fn tune_to_default_if_needed(&self) -> Result<(), AppControlError> {
        Ok(())
    }
}

/// Answers whether a program is currently a favorite. Must be cheap, it is queried on every
/// metadata publish.
pub trait FavoritesOracle: Send + Sync {
    fn is_favorite(&self, selector: &ProgramSelector) -> bool;
}

/// Media browse tree exposed to external controllers.
pub trait BrowseTree: Send + Sync {
    fn root_id(&self) -> &str;

    fn parse_media_id(&self, media_id: &str) -> Option<ProgramSelector>;
}

pub trait SelectorParser: Send + Sync {
    fn parse_uri(&self, uri: &str) -> Option<ProgramSelector>;
}

/// Bundle of collaborators a session is built from.
#[derive(Clone)]
pub struct Collaborators {
    pub app_control: Arc<dyn AppControl>,
    pub favorites: Arc<dyn FavoritesOracle>,
    pub browse_tree: Arc<dyn BrowseTree>,
    pub selector_parser: Arc<dyn SelectorParser>,
}
