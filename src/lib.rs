#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(clippy::use_self, rust_2018_idioms)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

//! An alarm clock: alarms are kept in memory, a background scheduler rings them
//! once they are due and they can be snoozed while ringing.

pub mod alarm;
pub mod communication;
pub mod config;
/// desktop dialogs for alarm notices and picking tones
pub mod dialog;
pub mod error;
pub mod scheduler;
pub mod shell;
pub mod snooze;
pub mod sound;
pub mod store;
pub mod time;

#[cfg(test)]
mod testing;

pub use alarm::{Alarm, AlarmBuilder, TimeOfDay, Tone};
pub use error::{AlarmError, ConfigError, PlaybackError};
pub use scheduler::{Scheduler, SchedulerHandle};
pub use store::{AlarmStore, SharedStore};
