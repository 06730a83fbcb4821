use chrono::NaiveDateTime;

/// What the scheduler reports about an alarm it is handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageType,
    pub alarm_id: u64,
}

impl Message {
    #[must_use]
    pub const fn new(kind: MessageType, alarm_id: u64) -> Self {
        Self { kind, alarm_id }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageType {
    /// the alarm was due and is now ringing
    AlarmTriggered { time: NaiveDateTime },
    /// the tone couldn't be played, the notice was still shown
    PlaybackFailed(String),
    /// the user dismissed the alarm
    AlarmStopped,
}
