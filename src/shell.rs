use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};

use clap::{Parser, Subcommand};
use log::{error, info};

use crate::{
    alarm::{Alarm, AlarmBuilder, TimeOfDay, Tone},
    config::Config,
    dialog,
    error::AlarmError,
    snooze::snooze,
    sound::Ringer,
    store::SharedStore,
    time::TimeSource,
};

#[derive(Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Option<ShellCommand>,
}

#[derive(Subcommand)]
enum ShellCommand {
    /// Set a new alarm, HH:MM is 24 hour time unless AM or PM is given
    Set {
        time: String,
        #[arg(value_enum, ignore_case = true)]
        time_of_day: Option<TimeOfDay>,
        /// YYYY-MM-DD, today if not given
        #[arg(long, short)]
        date: Option<String>,
        /// `default`, the name of a sound or a path to a sound file
        #[arg(long, short)]
        tone: Option<String>,
        /// choose the sound file in a file dialog
        #[arg(long, conflicts_with = "tone")]
        pick: bool,
        /// minutes, the configured snooze length if not given
        #[arg(long, short)]
        snooze: Option<u32>,
    },
    /// Show all alarms
    List,
    /// Delete the alarm at a position of the list
    Delete { position: usize },
    /// Snooze the alarm at a position of the list
    Snooze { position: usize },
    /// Silence the ringing alarm tone
    Stop,
    /// Change the snooze length of new alarms
    SnoozeTime { minutes: u32 },
    Exit,
}

/// The interactive side of the alarm clock: set, list, delete and snooze alarms
/// while the scheduler runs in the background.
pub struct Shell<T> {
    store: SharedStore,
    ringer: Arc<Ringer>,
    config: Config,
    /// where snooze length changes get saved, nowhere if `None`
    config_path: Option<PathBuf>,
    clock: T,
}

impl<T: TimeSource> Shell<T> {
    #[must_use]
    pub fn new(
        store: SharedStore,
        ringer: Arc<Ringer>,
        config: Config,
        config_path: Option<PathBuf>,
        clock: T,
    ) -> Self {
        Self {
            store,
            ringer,
            config,
            config_path,
            clock,
        }
    }

    /// Reads and runs commands until `exit` or the end of input.
    ///
    /// # Errors
    /// if stdin or stdout fail
    pub fn run(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();
        writeln!(stdout, "type `help` for commands")?;
        while let Some(line) = readline()? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match self.respond(line, &mut stdout) {
                Ok(true) => break,
                Ok(false) => {}
                Err(err) => writeln!(stdout, "Error: {err}")?,
            }
            stdout.flush()?;
        }
        Ok(())
    }

    /// Runs one command line, writing what it has to say to `out`.
    /// Returns true when the shell should quit.
    ///
    /// # Errors
    /// a message for the user if the command couldn't be run
    pub fn respond(&mut self, line: &str, out: &mut impl Write) -> Result<bool, String> {
        let args = shlex::split(line).ok_or("invalid quoting")?;
        let line = match Line::try_parse_from(args) {
            Ok(line) => line,
            // help output comes through here as well
            Err(e) if !e.use_stderr() => {
                write!(out, "{e}").map_err(|e| e.to_string())?;
                return Ok(false);
            }
            Err(e) => return Err(e.to_string()),
        };
        let Some(command) = line.command else {
            return Ok(false);
        };
        let reply = match command {
            ShellCommand::Set {
                time,
                time_of_day,
                date,
                tone,
                pick,
                snooze,
            } => {
                let tone = if pick {
                    dialog::pick_tone().map_or(Tone::Default, Tone::Custom)
                } else {
                    tone.map_or(Tone::Default, |tone| self.config.resolve_tone(&tone))
                };
                let alarm = self
                    .build(&time, time_of_day, date.as_deref(), tone, snooze)
                    .map_err(|e| e.to_string())?;
                let time = alarm.time();
                let id = self.store.lock().add(alarm);
                info!("alarm {id} set for {time}");
                format!("Alarm set for {}", time.format(&self.config.time_format))
            }
            ShellCommand::List => self.list(),
            ShellCommand::Delete { position } => {
                let alarm = self
                    .store
                    .lock()
                    .remove(to_index(position)?)
                    .map_err(|e| e.to_string())?;
                info!("deleted alarm {}", alarm.id());
                format!("Deleted {}", alarm.describe(&self.config.time_format))
            }
            ShellCommand::Snooze { position } => {
                let snoozed = snooze(
                    &self.store,
                    &self.ringer,
                    to_index(position)?,
                    self.clock.now(),
                )
                .map_err(|e| e.to_string())?;
                format!("Alarm snoozed for {} minutes", snoozed.snooze_minutes())
            }
            ShellCommand::Stop => {
                self.ringer.stop();
                "Alarm tone stopped".to_string()
            }
            ShellCommand::SnoozeTime { minutes } => self.set_snooze_time(minutes)?,
            ShellCommand::Exit => {
                writeln!(out, "quitting...").map_err(|e| e.to_string())?;
                return Ok(true);
            }
        };
        writeln!(out, "{reply}").map_err(|e| e.to_string())?;
        Ok(false)
    }

    fn build(
        &self,
        time: &str,
        time_of_day: Option<TimeOfDay>,
        date: Option<&str>,
        tone: Tone,
        snooze: Option<u32>,
    ) -> Result<Alarm, AlarmError> {
        let now = self.clock.now();
        let mut builder = AlarmBuilder::new(now.date(), self.config.snooze_minutes);
        if let Some(date) = date {
            builder = builder.date(date)?;
        }
        builder = builder.time(time, time_of_day)?.tone(tone);
        if let Some(minutes) = snooze {
            builder = builder.snooze_minutes(minutes);
        }
        builder.build(now)
    }

    fn list(&self) -> String {
        let alarms = self.store.snapshot();
        if alarms.is_empty() {
            return "no alarms".to_string();
        }
        alarms
            .iter()
            .enumerate()
            .map(|(i, alarm)| {
                format!("{}. {}", i + 1, alarm.describe(&self.config.time_format))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn set_snooze_time(&mut self, minutes: u32) -> Result<String, String> {
        if minutes == 0 {
            return Err(AlarmError::ZeroSnooze.to_string());
        }
        self.config.snooze_minutes = minutes;
        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save(path.clone()) {
                error!("{e}");
                return Err(e.to_string());
            }
        }
        Ok(format!("New alarms snooze for {minutes} minutes"))
    }
}

/// positions in the list start at 1
fn to_index(position: usize) -> Result<usize, String> {
    position
        .checked_sub(1)
        .ok_or_else(|| "positions start at 1".to_string())
}

fn readline() -> io::Result<Option<String>> {
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    let mut buffer = String::new();
    if io::stdin().read_line(&mut buffer)? == 0 {
        return Ok(None);
    }
    Ok(Some(buffer))
}
