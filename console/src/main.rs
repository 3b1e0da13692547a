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


mod cli;
mod commands;
mod simulated_tuner;

use std::sync::Arc;

use clap::Parser;
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tuner_session_core::{
    BroadcastRadioUriParser, Collaborators, InMemoryFavorites, ProgramBrowseTree, Session,
    SessionEvent, SessionInputs, TunerSession,
};

use crate::cli::Cli;
use crate::commands::{parse_command, ConsoleCommand, HELP};
use crate::simulated_tuner::{station_list, SimulatedTuner};

fn describe_event(event: &SessionEvent) -> String {
    match event {
        SessionEvent::MetadataChanged(metadata) => {
            let heart = if metadata.is_favorite { " [fav]" } else { "" };
            match metadata.title.as_deref() {
                Some(title) => format!("now playing: {}{} - {}", metadata.display_title, heart, title),
                None => format!("now playing: {}{}", metadata.display_title, heart),
            }
        }
        SessionEvent::PlaybackStateChanged(record) => match &record.error_message {
            Some(message) => format!("state: {:?} ({})", record.state, message),
            None => format!("state: {:?}", record.state),
        },
        SessionEvent::Deactivated => "session deactivated".to_string(),
    }
}

fn print_event(event: &SessionEvent) {
    println!("> {}", describe_event(event));
}

fn print_snapshot(session: &Session) {
    let program = session.current_program
                         .as_ref()
                         .map(|p| p.display_name())
                         .unwrap_or_else(|| "-".to_string());
    println!("program: {}  favorite: {}  state: {:?}  active: {}",
             program, session.is_favorite, session.playback.state, session.is_active);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new().filter_level(cli.log_level.to_level_filter()).init();

    let favorites = Arc::new(InMemoryFavorites::new());
    let (programs_tx, programs_rx) = mpsc::channel(32);
    let (playback_tx, playback_rx) = mpsc::channel(32);
    let (connection_tx, connection_rx) = mpsc::channel(4);
    let tuner = Arc::new(SimulatedTuner::new(station_list(),
                                             cli.default_frequency,
                                             favorites.clone(),
                                             programs_tx,
                                             playback_tx,
                                             connection_tx));

    let session = TunerSession::new(cli.session_config(), Collaborators {
        app_control: tuner.clone(),
        favorites: favorites.clone(),
        browse_tree: Arc::new(ProgramBrowseTree::default()),
        selector_parser: Arc::new(BroadcastRadioUriParser),
    });
    session.subscribe(Arc::new(print_event));
    let watch = session.run_watch(SessionInputs {
        programs: programs_rx,
        playback_states: playback_rx,
        favorites: favorites.subscribe(),
        connection: connection_rx,
    });
    info!("Tuner session started");
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        match command {
            ConsoleCommand::Transport(command) => session.dispatch(command).await,
            ConsoleCommand::RawState(raw) => {
                if let Err(e) = tuner.report_raw_state(raw).await {
                    warn!("Cannot report raw state: {}", e);
                }
            }
            ConsoleCommand::State => print_snapshot(&session.snapshot().await),
            ConsoleCommand::Disconnect => tuner.disconnect(),
            ConsoleCommand::Help => println!("{}", HELP),
            ConsoleCommand::Quit => break,
        }
    }

    session.release();
    watch.stop().await?;
    info!("Tuner session stopped");
    Ok(())
}
