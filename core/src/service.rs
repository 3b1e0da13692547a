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

//! Background watch tasks with cooperative shutdown.

use std::future::Future;

use futures::future::join_all;
use log::debug;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};

/// Stop request observed by a watch task, meant for a `select!` arm.
pub struct StopSignal {
    rx: oneshot::Receiver<()>,
}

impl StopSignal {
    /// Resolves once stop is requested or the owning [`WatchTask`] is dropped.
    pub async fn requested(&mut self) {
        let _ = (&mut self.rx).await;
    }
}

/// A spawned watch task together with its stop trigger.
pub struct WatchTask {
    name: &'static str,
    join: JoinHandle<()>,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl WatchTask {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn request_stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub async fn stop(mut self) -> Result<(), JoinError> {
        self.request_stop();
        self.join.await
    }
}

/// Spawns `f` on the tokio runtime, handing it the [`StopSignal`] it should watch.
pub fn spawn_watch<F, Fut>(name: &'static str, f: F) -> WatchTask
where
    F: FnOnce(StopSignal) -> Fut + Send + 'static,
    Fut: Future<Output=()> + Send + 'static,
{
    let (stop_tx, rx) = oneshot::channel();
    let join = tokio::spawn(async move {
        f(StopSignal { rx }).await;
        debug!("Watch task {} finished", name);
    });
    WatchTask { name, join, stop_tx: Some(stop_tx) }
}

/// Set of watch tasks stopped together.
#[derive(Default)]
pub struct WatchGroup {
    tasks: Vec<WatchTask>,
}

impl WatchGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: WatchTask) {
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Signals every task first, then waits for all of them. Reports the first join failure.
    pub async fn stop(mut self) -> Result<(), JoinError> {
        self.tasks.iter_mut().for_each(WatchTask::request_stop);
        let results = join_all(self.tasks.into_iter().map(|task| task.join)).await;
        results.into_iter().collect()
    }
}
