use std::{
    fs::File,
    io::BufReader,
    path::PathBuf,
    sync::{
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
        Arc, Mutex, PoisonError,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, error};
use rodio::{source::SineWave, Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use crate::{alarm::Tone, config::Beep, error::PlaybackError};

/// something a [`TonePlayer`] can play
#[derive(Debug, Clone, PartialEq)]
pub enum ToneSource {
    Beep { frequency: f32, duration: Duration },
    File(PathBuf),
}

pub trait TonePlayer {
    /// Replaces whatever was loaded before. Nothing plays until [`TonePlayer::play`].
    ///
    /// # Errors
    /// if the source can't be opened or decoded
    fn load(&mut self, source: &ToneSource) -> Result<(), PlaybackError>;
    fn play(&mut self);
    fn is_playing(&self) -> bool;
    fn stop(&mut self);
}

/// Plays through the default audio output.
pub struct RodioPlayer {
    // dropping the stream silences every sink on it
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
    volume: f32,
}

impl RodioPlayer {
    /// `volume` is a percentage.
    ///
    /// # Errors
    /// if there is no audio output device
    pub fn open(volume: f32) -> Result<Self, PlaybackError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
            sink: None,
            volume: volume / 100.0,
        })
    }
}

impl TonePlayer for RodioPlayer {
    fn load(&mut self, source: &ToneSource) -> Result<(), PlaybackError> {
        let sink = Sink::try_new(&self.handle)?;
        sink.pause();
        sink.set_volume(self.volume);
        match source {
            ToneSource::Beep {
                frequency,
                duration,
            } => sink.append(
                SineWave::new(*frequency)
                    .take_duration(*duration)
                    .amplify(0.3),
            ),
            ToneSource::File(path) => {
                let file = File::open(path).map_err(|source| PlaybackError::Open {
                    path: path.clone(),
                    source,
                })?;
                sink.append(Decoder::new(BufReader::new(file))?);
            }
        }
        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        Ok(())
    }

    fn play(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|sink| !sink.is_paused() && !sink.empty())
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

/// Creates a player on the thread that will use it.
/// Audio output streams can't move between threads so each ring opens its own.
pub type OpenPlayer = Arc<dyn Fn() -> Result<Box<dyn TonePlayer>, PlaybackError> + Send + Sync>;

/// How the built in tone is played
#[derive(Debug, Clone, PartialEq)]
pub struct RingSettings {
    pub frequency: f32,
    pub duration: Duration,
    /// how many times the default tone plays
    pub repeats: u32,
    /// silence between two plays of the default tone
    pub pause: Duration,
    /// how often we check whether the player finished
    pub check_every: Duration,
}

impl Default for RingSettings {
    fn default() -> Self {
        Self::from(&Beep::default())
    }
}

impl From<&Beep> for RingSettings {
    fn from(beep: &Beep) -> Self {
        Self {
            frequency: beep.frequency,
            duration: Duration::from_millis(beep.duration_ms),
            repeats: beep.repeats,
            pause: Duration::from_millis(beep.pause_ms),
            check_every: Duration::from_millis(100),
        }
    }
}

/// Plays alarm tones on their own thread.
/// Keeps hold of the tone that is ringing right now so anyone can silence it.
pub struct Ringer {
    open: OpenPlayer,
    settings: RingSettings,
    current: Mutex<Option<Sender<()>>>,
}

impl std::fmt::Debug for Ringer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ringer")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Ringer {
    #[must_use]
    pub fn new(open: OpenPlayer, settings: RingSettings) -> Self {
        Self {
            open,
            settings,
            current: Mutex::new(None),
        }
    }

    /// A ringer playing through the default audio output.
    #[must_use]
    pub fn rodio(volume: f32, settings: RingSettings) -> Self {
        Self::new(
            Arc::new(move || {
                RodioPlayer::open(volume).map(|player| Box::new(player) as Box<dyn TonePlayer>)
            }),
            settings,
        )
    }

    /// Starts playing `tone` in the background.
    pub fn ring(&self, tone: &Tone) -> Ringing {
        let (stop_tx, stop_rx) = mpsc::channel();
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(stop_tx.clone());
        let open = Arc::clone(&self.open);
        let settings = self.settings.clone();
        let tone = tone.clone();
        let handle = thread::Builder::new()
            .name("alarm-tone".to_string())
            .spawn(move || {
                let result = open().and_then(|mut player| {
                    let result = play_tone(&mut *player, &tone, &settings, &stop_rx);
                    player.stop();
                    result
                });
                if let Err(e) = &result {
                    error!("error playing alarm tone: {e}");
                }
                result
            })
            .map_err(|e| {
                error!("couldn't start alarm tone thread: {e}");
                PlaybackError::Spawn(e)
            });
        Ringing {
            stop: stop_tx,
            handle,
        }
    }

    /// Silences whatever tone is ringing, if any.
    pub fn stop(&self) {
        if let Some(stop) = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            debug!("stopping alarm tone");
            // already finished if nobody is listening
            let _ = stop.send(());
        }
    }
}

/// A tone playing in the background.
/// If the player thread never started the alarm goes on without sound.
#[derive(Debug)]
pub struct Ringing {
    stop: Sender<()>,
    handle: Result<JoinHandle<Result<(), PlaybackError>>, PlaybackError>,
}

impl Ringing {
    /// Stops the tone and waits for the player to finish.
    ///
    /// # Errors
    /// whatever went wrong while playing
    pub fn stop(self) -> Result<(), PlaybackError> {
        let _ = self.stop.send(());
        self.handle?
            .join()
            .map_err(|_| PlaybackError::Unavailable("playback thread panicked".to_string()))?
    }
}

/// true if we were asked to stop within `timeout`
fn stop_requested(stop: &Receiver<()>, timeout: Duration) -> bool {
    !matches!(stop.recv_timeout(timeout), Err(RecvTimeoutError::Timeout))
}

/// true if we were asked to stop before the player finished
fn wait_while_playing(player: &dyn TonePlayer, stop: &Receiver<()>, every: Duration) -> bool {
    while player.is_playing() {
        if stop_requested(stop, every) {
            return true;
        }
    }
    false
}

fn play_tone(
    player: &mut dyn TonePlayer,
    tone: &Tone,
    settings: &RingSettings,
    stop: &Receiver<()>,
) -> Result<(), PlaybackError> {
    match tone {
        Tone::Default => {
            let beep = ToneSource::Beep {
                frequency: settings.frequency,
                duration: settings.duration,
            };
            for _ in 0..settings.repeats {
                player.load(&beep)?;
                player.play();
                if wait_while_playing(player, stop, settings.check_every)
                    || stop_requested(stop, settings.pause)
                {
                    break;
                }
            }
        }
        Tone::Custom(path) => {
            player.load(&ToneSource::File(path.clone()))?;
            player.play();
            wait_while_playing(player, stop, settings.check_every);
        }
    }
    Ok(())
}
