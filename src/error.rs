//! Error types for alarms, playback and configuration

use std::path::PathBuf;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors when creating or selecting alarms
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlarmError {
    #[error("cannot set alarm for past time {time}")]
    InPast { time: NaiveDateTime },

    #[error("snooze duration must be at least one minute")]
    ZeroSnooze,

    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid time {0:?}")]
    InvalidTime(String),

    #[error("no alarm at position {} (there are {len})", .index + 1)]
    NoSuchAlarm { index: usize, len: usize },
}

/// Errors while playing an alarm tone
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("couldn't open sound file {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't decode sound file")]
    Decode(#[from] rodio::decoder::DecoderError),

    #[error("couldn't open audio output")]
    Stream(#[from] rodio::StreamError),

    #[error("couldn't create audio sink")]
    Sink(#[from] rodio::PlayError),

    #[error("couldn't start the playback thread")]
    Spawn(#[source] std::io::Error),

    #[error("audio unavailable: {0}")]
    Unavailable(String),
}

/// Errors while loading or saving the config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config file {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("couldn't serialize config")]
    Serialize(#[from] toml::ser::Error),

    #[error("couldn't write config file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't find a config directory for this user")]
    NoConfigDir,
}
