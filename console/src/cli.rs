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


use clap::{Parser, ValueEnum};
use log::LevelFilter;
use tuner_session_core::config::{DEFAULT_INVALID_SELECTION_MESSAGE, DEFAULT_PLAYBACK_ERROR_MESSAGE};
use tuner_session_core::SessionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Off => LevelFilter::Off,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the log level
    #[arg(short, long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Message published with the error pulse of an unresolvable selection
    #[arg(long, default_value = DEFAULT_INVALID_SELECTION_MESSAGE)]
    pub invalid_selection_message: String,

    /// Message published when the tuner itself reports an error
    #[arg(long, default_value = DEFAULT_PLAYBACK_ERROR_MESSAGE)]
    pub playback_error_message: String,

    /// Station tuned by `play` when nothing is tuned yet, in kHz
    #[arg(long, default_value_t = 88_500)]
    pub default_frequency: u64,
}

impl Cli {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_invalid_selection_message(self.invalid_selection_message.clone())
            .with_playback_error_message(self.playback_error_message.clone())
    }
}
