use std::{fmt, path::PathBuf};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::AlarmError;

/// represents an alarm
/// contains the time that the alarm should go off at,
/// the tone to ring with and how long a snooze of it lasts.
///
/// The time of an alarm never changes once it is created,
/// snoozing makes a new alarm instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    /// set by the store when the alarm is added
    pub(crate) id: u64,
    time: NaiveDateTime,
    tone: Tone,
    snooze_minutes: u32,
    pub(crate) active: bool,
}

impl Alarm {
    /// Creates a new active alarm.
    ///
    /// # Errors
    /// if `time` is not after `now` or `snooze_minutes` is zero
    pub fn new(
        time: NaiveDateTime,
        tone: Tone,
        snooze_minutes: u32,
        now: NaiveDateTime,
    ) -> Result<Self, AlarmError> {
        if time <= now {
            return Err(AlarmError::InPast { time });
        }
        if snooze_minutes == 0 {
            return Err(AlarmError::ZeroSnooze);
        }
        Ok(Self {
            id: 0,
            time,
            tone,
            snooze_minutes,
            active: true,
        })
    }

    /// The alarm that snoozing this one at `now` creates:
    /// same tone and snooze length, due `snooze_minutes` after `now`.
    #[must_use]
    pub fn snoozed(&self, now: NaiveDateTime) -> Self {
        Self {
            id: 0,
            time: now + Duration::minutes(i64::from(self.snooze_minutes)),
            tone: self.tone.clone(),
            snooze_minutes: self.snooze_minutes,
            active: true,
        }
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub const fn time(&self) -> NaiveDateTime {
        self.time
    }

    #[must_use]
    pub const fn tone(&self) -> &Tone {
        &self.tone
    }

    #[must_use]
    pub const fn snooze_minutes(&self) -> u32 {
        self.snooze_minutes
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// active and at or before `now`
    #[must_use]
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.active && self.time <= now
    }

    /// text shown to the user when the alarm goes off
    #[must_use]
    pub fn ring_message(&self) -> String {
        format!(
            "Alarm! It's {}\n\nClick OK to stop the alarm.",
            self.time.format("%I:%M %p")
        )
    }

    /// one line summary of the alarm for listings
    #[must_use]
    pub fn describe(&self, time_format: &str) -> String {
        format!(
            "{} | {} tone | Snooze: {} min | {}",
            self.time.format(time_format),
            self.tone,
            self.snooze_minutes,
            if self.active { "Active" } else { "Inactive" }
        )
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Tone {
    /// the built in beep
    #[default]
    Default,
    Custom(PathBuf),
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::Custom(_) => write!(f, "Custom"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TimeOfDay {
    #[default]
    AM,
    PM,
}

/// what the user entered for a new alarm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmBuilder {
    pub date: NaiveDate,
    /// 1 to 12
    pub hour: u8,
    pub minute: u8,
    pub time_of_day: TimeOfDay,
    pub tone: Tone,
    pub snooze_minutes: u32,
}

impl AlarmBuilder {
    #[must_use]
    pub fn new(date: NaiveDate, snooze_minutes: u32) -> Self {
        Self {
            date,
            hour: 12,
            minute: 0,
            time_of_day: TimeOfDay::PM,
            tone: Tone::Default,
            snooze_minutes,
        }
    }

    /// Parses `HH:MM` as 12 hour time when `time_of_day` is given and as 24 hour time otherwise.
    ///
    /// # Errors
    /// if the time doesn't parse or is out of range
    pub fn time(mut self, time: &str, time_of_day: Option<TimeOfDay>) -> Result<Self, AlarmError> {
        let invalid = || AlarmError::InvalidTime(time.to_string());
        let (hour, minute) = time.trim().split_once(':').ok_or_else(invalid)?;
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        if minute > 59 {
            return Err(invalid());
        }
        match time_of_day {
            Some(time_of_day) => {
                if !(1..=12).contains(&hour) {
                    return Err(invalid());
                }
                self.hour = hour;
                self.time_of_day = time_of_day;
            }
            None => {
                if hour > 23 {
                    return Err(invalid());
                }
                // 0 and 12 both show as 12 on a 12 hour clock
                self.hour = match hour % 12 {
                    0 => 12,
                    h => h,
                };
                self.time_of_day = if hour < 12 {
                    TimeOfDay::AM
                } else {
                    TimeOfDay::PM
                };
            }
        }
        self.minute = minute;
        Ok(self)
    }

    /// # Errors
    /// if `date` is not `YYYY-MM-DD`
    pub fn date(mut self, date: &str) -> Result<Self, AlarmError> {
        self.date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| AlarmError::InvalidDate(date.to_string()))?;
        Ok(self)
    }

    #[must_use]
    pub fn tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    #[must_use]
    pub const fn snooze_minutes(mut self, snooze_minutes: u32) -> Self {
        self.snooze_minutes = snooze_minutes;
        self
    }

    /// 24 hour version of the entered hour
    const fn hour24(&self) -> u8 {
        match (self.time_of_day, self.hour) {
            (TimeOfDay::AM, 12) => 0,
            (TimeOfDay::AM, h) => h,
            (TimeOfDay::PM, 12) => 12,
            (TimeOfDay::PM, h) => h + 12,
        }
    }

    /// # Errors
    /// if the entered time is invalid or not after `now`
    pub fn build(self, now: NaiveDateTime) -> Result<Alarm, AlarmError> {
        let invalid = || AlarmError::InvalidTime(format!("{}:{:02}", self.hour, self.minute));
        // the fields are public so they may never have gone through `time`
        if !(1..=12).contains(&self.hour) || self.minute > 59 {
            return Err(invalid());
        }
        let time = NaiveTime::from_hms_opt(u32::from(self.hour24()), u32::from(self.minute), 0)
            .ok_or_else(invalid)?;
        Alarm::new(self.date.and_time(time), self.tone, self.snooze_minutes, now)
    }
}
