#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(
    clippy::use_self,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::missing_panics_doc
)]

use std::{error::Error, path::PathBuf, sync::mpsc, sync::Arc, thread, time::Duration};

use alarm_clock::{
    communication::{Message, MessageType},
    config::{Config, Sound},
    dialog::DialogNotifier,
    shell::Shell,
    sound::{RingSettings, Ringer},
    time::LocalClock,
    Scheduler, SharedStore,
};
use clap::{Parser, Subcommand};
use log::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Write the default config
    Init {
        #[clap(long, short)]
        force: bool,
    },
    /// Register a sound file under a name usable as an alarm tone
    NewSound { name: String, path: PathBuf },
    /// Start the alarm clock (the default)
    Run,
}

fn main() -> Result<(), Box<dyn Error>> {
    // initilize the logger
    simple_file_logger::init_logger!("alarm_clock").expect("couldn't initialize logger");

    let args = Args::parse();
    match args.command {
        Some(Command::Init { force }) => {
            if force || !Config::is_config_present() {
                let path = Config::config_path()?;
                Config::new().save(path.clone())?;
                println!("wrote config to {}", path.display());
            } else {
                println!("config already exists, use --force to overwrite it");
            }
            Ok(())
        }
        Some(Command::NewSound { name, path }) => {
            let mut config = Config::load_or_default()?;
            let sound = Sound::new(name, path);
            println!("added sound {sound}");
            config.add_sound(sound);
            config.save(Config::config_path()?)?;
            Ok(())
        }
        Some(Command::Run) | None => run(),
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = Config::load_or_default()?;
    let store = SharedStore::new();
    let ringer = Arc::new(Ringer::rodio(
        config.volume,
        RingSettings::from(&config.beep),
    ));

    let (tx, rx) = mpsc::channel();
    let handle = Scheduler::new(store.clone(), Arc::clone(&ringer), DialogNotifier, LocalClock)
        .with_messages(tx)
        .spawn(Duration::from_millis(config.poll_interval_ms))?;
    thread::spawn(move || {
        for Message { kind, alarm_id } in rx {
            match kind {
                MessageType::AlarmTriggered { time } => {
                    println!("\nalarm {alarm_id} for {} is ringing", time.format("%I:%M %p"));
                }
                MessageType::PlaybackFailed(e) => {
                    println!("\nalarm {alarm_id} couldn't play its tone: {e}");
                }
                MessageType::AlarmStopped => println!("\nalarm {alarm_id} stopped"),
            }
        }
    });

    info!("alarm clock started");
    let mut shell = Shell::new(
        store,
        ringer,
        config,
        Config::config_path().ok(),
        LocalClock,
    );
    if let Err(e) = shell.run() {
        error!("shell stopped: {e}");
    }
    handle.shutdown();
    Ok(())
}
