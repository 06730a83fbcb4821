//! Recording doubles for the player and the notifier.

use std::{
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use crate::{
    dialog::Notifier,
    error::PlaybackError,
    sound::{OpenPlayer, TonePlayer, ToneSource},
};

/// Everything the recording players did, shared across threads.
#[derive(Debug, Clone, Default)]
pub struct PlayerLog {
    calls: Arc<Mutex<Vec<(&'static str, Option<ToneSource>)>>>,
}

impl PlayerLog {
    fn push(&self, call: &'static str, source: Option<ToneSource>) {
        self.calls.lock().unwrap().push((call, source));
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == call)
            .count()
    }

    /// every call in the order it was made
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().iter().map(|(c, _)| *c).collect()
    }

    /// position of the `nth` (from 0) `call`
    pub fn position(&self, call: &str, nth: usize) -> Option<usize> {
        self.calls()
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == call)
            .nth(nth)
            .map(|(i, _)| i)
    }

    pub fn loads(&self) -> Vec<ToneSource> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(_, source)| source.clone())
            .collect()
    }
}

/// Reports it is playing for `plays_for` checks after each load.
pub struct RecordingPlayer {
    log: PlayerLog,
    plays_for: usize,
    left: std::cell::Cell<usize>,
    fail_files: bool,
}

impl RecordingPlayer {
    pub fn opener(log: &PlayerLog, plays_for: usize) -> OpenPlayer {
        let log = log.clone();
        Arc::new(move || {
            Ok(Box::new(Self {
                log: log.clone(),
                plays_for,
                left: std::cell::Cell::new(0),
                fail_files: false,
            }) as Box<dyn TonePlayer>)
        })
    }

    /// a player for which every sound file is missing
    pub fn missing_files(log: &PlayerLog) -> OpenPlayer {
        let log = log.clone();
        Arc::new(move || {
            Ok(Box::new(Self {
                log: log.clone(),
                plays_for: 0,
                left: std::cell::Cell::new(0),
                fail_files: true,
            }) as Box<dyn TonePlayer>)
        })
    }
}

impl TonePlayer for RecordingPlayer {
    fn load(&mut self, source: &ToneSource) -> Result<(), PlaybackError> {
        self.log.push("load", Some(source.clone()));
        if let (true, ToneSource::File(path)) = (self.fail_files, source) {
            return Err(PlaybackError::Open {
                path: path.clone(),
                source: std::io::ErrorKind::NotFound.into(),
            });
        }
        self.left.set(self.plays_for);
        Ok(())
    }

    fn play(&mut self) {
        self.log.push("play", None);
    }

    fn is_playing(&self) -> bool {
        let left = self.left.get();
        if left == 0 {
            return false;
        }
        self.left.set(left - 1);
        true
    }

    fn stop(&mut self) {
        self.log.push("stop", None);
        self.left.set(0);
    }
}

/// A notifier that writes down every notice, optionally taking a while to be dismissed.
///
/// When given a player log it also writes `show` and `dismissed` into it,
/// so notices and playback can be put in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    pub shown: Arc<Mutex<Vec<String>>>,
    pub dismiss_after: Duration,
    pub timeline: Option<PlayerLog>,
}

impl RecordingNotifier {
    /// dismissed `dismiss_after` a notice shows, writing both into `log`
    pub fn slow(log: &PlayerLog, dismiss_after: Duration) -> Self {
        Self {
            shown: Arc::default(),
            dismiss_after,
            timeline: Some(log.clone()),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, message: &str) {
        self.shown.lock().unwrap().push(message.to_string());
        if let Some(log) = &self.timeline {
            log.push("show", None);
        }
        thread::sleep(self.dismiss_after);
        if let Some(log) = &self.timeline {
            log.push("dismissed", None);
        }
    }
}
