use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDateTime;

use crate::{alarm::Alarm, error::AlarmError};

/// The alarms of this process in the order they were added.
#[derive(Debug, Default)]
pub struct AlarmStore {
    alarms: Vec<Alarm>,
    next_id: u64,
}

impl AlarmStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an alarm and returns the id it was given.
    pub fn add(&mut self, mut alarm: Alarm) -> u64 {
        self.next_id += 1;
        alarm.id = self.next_id;
        self.alarms.push(alarm);
        self.next_id
    }

    #[must_use]
    pub fn list(&self) -> &[Alarm] {
        &self.alarms
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Alarm> {
        self.alarms.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    /// # Errors
    /// if there is no alarm at `index`, nothing is removed then
    pub fn remove(&mut self, index: usize) -> Result<Alarm, AlarmError> {
        if index >= self.alarms.len() {
            return Err(AlarmError::NoSuchAlarm {
                index,
                len: self.alarms.len(),
            });
        }
        Ok(self.alarms.remove(index))
    }

    /// Marks the alarm as done. Returns false if no alarm has this id.
    pub fn deactivate(&mut self, id: u64) -> bool {
        self.alarms
            .iter_mut()
            .find(|alarm| alarm.id == id)
            .map(|alarm| alarm.active = false)
            .is_some()
    }

    /// Deactivates the first due alarm and hands back a copy of it.
    pub fn take_next_due(&mut self, now: NaiveDateTime) -> Option<Alarm> {
        let alarm = self.alarms.iter_mut().find(|alarm| alarm.is_due(now))?;
        alarm.active = false;
        Some(alarm.clone())
    }
}

/// Handle to an [`AlarmStore`] shared between the scheduler thread and the shell.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<AlarmStore>>,
}

impl SharedStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A panic while holding the lock can't leave the alarms half updated,
    /// so a poisoned lock is still used.
    pub fn lock(&self) -> MutexGuard<'_, AlarmStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// copy of the alarms for rendering
    #[must_use]
    pub fn snapshot(&self) -> Vec<Alarm> {
        self.lock().list().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::Tone;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn alarm_in(minutes: i64) -> Alarm {
        Alarm::new(now() + Duration::minutes(minutes), Tone::Default, 5, now()).unwrap()
    }

    fn times(store: &AlarmStore) -> Vec<NaiveDateTime> {
        store.list().iter().map(Alarm::time).collect()
    }

    #[test]
    fn add_keeps_insertion_order_and_duplicates() {
        let mut store = AlarmStore::new();
        let first = store.add(alarm_in(10));
        let second = store.add(alarm_in(1));
        let third = store.add(alarm_in(10));
        assert_ne!(first, second);
        assert_ne!(second, third);
        let t = now();
        assert_eq!(
            times(&store),
            vec![
                t + Duration::minutes(10),
                t + Duration::minutes(1),
                t + Duration::minutes(10)
            ]
        );
    }

    #[test]
    fn remove_keeps_relative_order() {
        let mut store = AlarmStore::new();
        for m in 1..=4 {
            store.add(alarm_in(m));
        }
        let removed = store.remove(1).unwrap();
        assert_eq!(removed.time(), now() + Duration::minutes(2));
        let t = now();
        assert_eq!(
            times(&store),
            vec![
                t + Duration::minutes(1),
                t + Duration::minutes(3),
                t + Duration::minutes(4)
            ]
        );
    }

    #[test]
    fn remove_out_of_range_changes_nothing() {
        let mut store = AlarmStore::new();
        store.add(alarm_in(1));
        store.add(alarm_in(2));
        let before = store.list().to_vec();
        assert_eq!(
            store.remove(2),
            Err(AlarmError::NoSuchAlarm { index: 2, len: 2 })
        );
        assert_eq!(store.list(), before.as_slice());
    }

    #[test]
    fn deactivate_is_idempotent() {
        let mut store = AlarmStore::new();
        let id = store.add(alarm_in(1));
        assert!(store.deactivate(id));
        assert!(store.deactivate(id));
        assert!(!store.list()[0].is_active());
        assert!(!store.deactivate(id + 100));
    }

    #[test]
    fn take_next_due_goes_in_insertion_order() {
        let mut store = AlarmStore::new();
        let later = store.add(alarm_in(2));
        let earlier = store.add(alarm_in(1));
        store.add(alarm_in(30));
        let when = now() + Duration::minutes(5);
        assert_eq!(store.take_next_due(when).map(|a| a.id()), Some(later));
        assert_eq!(store.take_next_due(when).map(|a| a.id()), Some(earlier));
        assert_eq!(store.take_next_due(when), None);
        assert!(store.list()[2].is_active());
    }

    #[test]
    fn snapshot_is_a_copy() {
        let store = SharedStore::new();
        let id = store.lock().add(alarm_in(1));
        let snapshot = store.snapshot();
        store.lock().deactivate(id);
        assert!(snapshot[0].is_active());
        assert!(!store.snapshot()[0].is_active());
    }
}
