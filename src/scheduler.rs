use std::{
    sync::{
        mpsc::{self, RecvTimeoutError, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{error, info, warn};

use crate::{
    alarm::Alarm,
    communication::{Message, MessageType},
    dialog::Notifier,
    sound::Ringer,
    store::SharedStore,
    time::TimeSource,
};

/// Polls the store and rings alarms once they are due.
///
/// An alarm is deactivated before it rings so it can only ring once.
/// Alarms that are due together ring one after another in the order they were added,
/// each waiting for the previous one to be dismissed.
pub struct Scheduler<N, T> {
    store: SharedStore,
    ringer: Arc<Ringer>,
    notifier: N,
    clock: T,
    messages: Option<Sender<Message>>,
}

impl<N: Notifier, T: TimeSource> Scheduler<N, T> {
    #[must_use]
    pub fn new(store: SharedStore, ringer: Arc<Ringer>, notifier: N, clock: T) -> Self {
        Self {
            store,
            ringer,
            notifier,
            clock,
            messages: None,
        }
    }

    /// Report what happens to each alarm on `sender`.
    #[must_use]
    pub fn with_messages(mut self, sender: Sender<Message>) -> Self {
        self.messages = Some(sender);
        self
    }

    /// Rings every alarm due at the current time. Returns how many rang.
    pub fn tick(&self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        // the lock is only held while picking the alarm, not while it rings
        loop {
            let next = self.store.lock().take_next_due(now);
            let Some(alarm) = next else {
                break;
            };
            self.trigger(&alarm);
            fired += 1;
        }
        fired
    }

    fn trigger(&self, alarm: &Alarm) {
        info!("alarm {} for {} triggered", alarm.id(), alarm.time());
        self.send(alarm, MessageType::AlarmTriggered { time: alarm.time() });
        let ringing = self.ringer.ring(alarm.tone());
        self.notifier.show(&alarm.ring_message());
        if let Err(e) = ringing.stop() {
            warn!("alarm {} rang silently: {e}", alarm.id());
            self.send(alarm, MessageType::PlaybackFailed(e.to_string()));
        }
        info!("alarm {} stopped", alarm.id());
        self.send(alarm, MessageType::AlarmStopped);
    }

    fn send(&self, alarm: &Alarm, kind: MessageType) {
        if let Some(sender) = &self.messages {
            // nobody listening is fine
            let _ = sender.send(Message::new(kind, alarm.id()));
        }
    }
}

impl<N, T> Scheduler<N, T>
where
    N: Notifier + 'static,
    T: TimeSource + 'static,
{
    /// Runs [`Scheduler::tick`] every `interval` on a background thread.
    ///
    /// # Errors
    /// if the thread can't be spawned
    pub fn spawn(self, interval: Duration) -> std::io::Result<SchedulerHandle> {
        let (shutdown, shutdown_rx) = mpsc::channel::<()>();
        let thread = thread::Builder::new()
            .name("alarm-scheduler".to_string())
            .spawn(move || {
                info!("scheduler polling every {interval:?}");
                loop {
                    self.tick();
                    match shutdown_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("scheduler stopped");
            })?;
        Ok(SchedulerHandle { shutdown, thread })
    }
}

#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown: Sender<()>,
    thread: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stops polling and waits for the scheduler thread.
    /// An alarm that is ringing has to be dismissed first.
    pub fn shutdown(self) {
        let _ = self.shutdown.send(());
        if self.thread.join().is_err() {
            error!("scheduler thread panicked");
        }
    }
}
