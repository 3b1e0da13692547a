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


use anyhow::{anyhow, bail};
use tuner_session_core::TransportCommand;

pub const HELP: &str = "\
commands:
  play | stop | next | prev | toggle
  fav on|off          add or remove the current program from favorites
  uri <program uri>   tune by broadcastradio:// uri
  media <media id>    tune by browse tree media id (__ROOT__ plays)
  raw <code>          report a raw playback code from the tuner
  state               print the session snapshot
  disconnect          drop the tuner service link
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Transport(TransportCommand),
    RawState(u8),
    State,
    Disconnect,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> anyhow::Result<Option<ConsoleCommand>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();
    let command = match (verb.to_lowercase().as_str(), argument) {
        ("play", None) => ConsoleCommand::Transport(TransportCommand::Play),
        ("stop", None) => ConsoleCommand::Transport(TransportCommand::Stop),
        ("next", None) => ConsoleCommand::Transport(TransportCommand::SkipNext),
        ("prev", None) => ConsoleCommand::Transport(TransportCommand::SkipPrevious),
        ("toggle", None) => ConsoleCommand::Transport(TransportCommand::Toggle),
        ("fav", Some("on")) => ConsoleCommand::Transport(TransportCommand::SetRating { has_heart: true }),
        ("fav", Some("off")) => ConsoleCommand::Transport(TransportCommand::SetRating { has_heart: false }),
        ("uri", Some(uri)) => ConsoleCommand::Transport(TransportCommand::PlayFromUri(uri.to_string())),
        ("media", Some(id)) => ConsoleCommand::Transport(TransportCommand::PlayFromMediaId(id.to_string())),
        ("raw", Some(code)) => {
            ConsoleCommand::RawState(code.parse().map_err(|_| anyhow!("raw code must be 0-255, got {}", code))?)
        }
        ("state", None) => ConsoleCommand::State,
        ("disconnect", None) => ConsoleCommand::Disconnect,
        ("help", None) => ConsoleCommand::Help,
        ("quit" | "exit", None) => ConsoleCommand::Quit,
        _ => bail!("unrecognized command: {}", line.trim()),
    };
    if words.next().is_some() {
        bail!("too many arguments: {}", line.trim());
    }
    Ok(Some(command))
}
