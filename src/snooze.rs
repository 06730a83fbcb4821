use chrono::NaiveDateTime;
use log::info;

use crate::{alarm::Alarm, error::AlarmError, sound::Ringer, store::SharedStore};

/// Snoozes the alarm at `index`.
///
/// A new alarm is added `snooze_minutes` after `now` with the same tone,
/// the snoozed alarm itself is left as is.
/// Whatever tone is ringing is silenced.
///
/// # Errors
/// if there is no alarm at `index`, then nothing changes
pub fn snooze(
    store: &SharedStore,
    ringer: &Ringer,
    index: usize,
    now: NaiveDateTime,
) -> Result<Alarm, AlarmError> {
    let snoozed = {
        let mut store = store.lock();
        let source = store.get(index).ok_or(AlarmError::NoSuchAlarm {
            index,
            len: store.len(),
        })?;
        let mut snoozed = source.snoozed(now);
        snoozed.id = store.add(snoozed.clone());
        snoozed
    };
    ringer.stop();
    info!(
        "snoozed for {} minutes, new alarm {} at {}",
        snoozed.snooze_minutes(),
        snoozed.id(),
        snoozed.time()
    );
    Ok(snoozed)
}
