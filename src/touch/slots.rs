use super::{
    error::GestureError,
    types::{FingerSample, FingerState},
};

/// Read-only view of one populated slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotSnapshot {
    pub current: FingerSample,
    /// The sample that was `current` before the latest update.
    pub previous: FingerSample,
    pub pressed_frame_count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotAdvance {
    /// `current` as it was before the call; the new sample on first observation.
    pub old_current: FingerSample,
    pub first_observation: bool,
}

#[derive(Clone, Copy, Debug)]
struct SlotEntry {
    current: FingerSample,
    previous: FingerSample,
    pressed_frames: u32,
}

/// Fixed-capacity per-slot current/previous sample store.
///
/// An entry is either absent or holds both samples, so a slot can never be
/// half-seeded. Entries are never evicted. Not synchronised; the engine
/// serialises access.
#[derive(Debug)]
pub struct FingerSlotTable {
    entries: Vec<Option<SlotEntry>>,
}

impl FingerSlotTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn check_slot(&self, slot: usize) -> Result<(), GestureError> {
        if slot < self.entries.len() {
            Ok(())
        } else {
            Err(GestureError::SlotOutOfRange {
                slot,
                capacity: self.entries.len(),
            })
        }
    }

    pub fn get(&self, slot: usize) -> Result<Option<SlotSnapshot>, GestureError> {
        self.check_slot(slot)?;
        Ok(self.entries[slot].map(|entry| SlotSnapshot {
            current: entry.current,
            previous: entry.previous,
            pressed_frame_count: entry.pressed_frames,
        }))
    }

    /// Seeds an unseen slot with `sample` in both positions, or shifts
    /// `current` into `previous` and stores `sample` as the new `current`.
    pub fn seed_or_advance(
        &mut self,
        slot: usize,
        sample: FingerSample,
    ) -> Result<SlotAdvance, GestureError> {
        self.check_slot(slot)?;
        if let Some(entry) = self.entries[slot].as_mut() {
            let old_current = entry.current;
            entry.previous = old_current;
            entry.current = sample;
            return Ok(SlotAdvance {
                old_current,
                first_observation: false,
            });
        }

        self.entries[slot] = Some(SlotEntry {
            current: sample,
            previous: sample,
            pressed_frames: 0,
        });
        Ok(SlotAdvance {
            old_current: sample,
            first_observation: true,
        })
    }

    /// No-op for a slot that has not been seeded.
    pub fn set_pressed_frames(&mut self, slot: usize, frames: u32) -> Result<(), GestureError> {
        self.check_slot(slot)?;
        if let Some(entry) = &mut self.entries[slot] {
            entry.pressed_frames = frames;
        }
        Ok(())
    }

    pub fn count_in_state(&self, state: FingerState) -> usize {
        self.entries
            .iter()
            .flatten()
            .filter(|entry| entry.current.state == state)
            .count()
    }

    /// First slot in scan order, other than `exclude`, whose current sample is in `state`.
    pub fn find_other_in_state(&self, exclude: usize, state: FingerState) -> Option<usize> {
        self.entries.iter().enumerate().find_map(|(slot, entry)| {
            entry
                .filter(|e| slot != exclude && e.current.state == state)
                .map(|_| slot)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::touch::types::Vec2;

    fn sample(slot: usize, frame: u64, state: FingerState, x: f32) -> FingerSample {
        FingerSample::new(slot, frame, frame as f64 * 0.01, state, Vec2::new(x, 0.5))
    }

    #[test]
    fn first_observation_seeds_both_positions() {
        let mut table = FingerSlotTable::new(4);
        assert_eq!(table.get(2).expect("in range"), None);

        let first = sample(2, 1, FingerState::Hover, 0.1);
        let advance = table.seed_or_advance(2, first).expect("in range");
        assert!(advance.first_observation);
        assert_eq!(advance.old_current, first);

        let snap = table.get(2).expect("in range").expect("seeded");
        assert_eq!(snap.current, first);
        assert_eq!(snap.previous, first);
        assert_eq!(snap.pressed_frame_count, 0);
    }

    #[test]
    fn advance_keeps_a_one_step_lag() {
        let mut table = FingerSlotTable::new(4);
        let a = sample(0, 1, FingerState::Pressed, 0.1);
        let b = sample(0, 2, FingerState::Pressed, 0.2);
        let c = sample(0, 3, FingerState::Pressed, 0.3);
        table.seed_or_advance(0, a).expect("in range");
        let advance = table.seed_or_advance(0, b).expect("in range");
        assert!(!advance.first_observation);
        assert_eq!(advance.old_current, a);

        let advance = table.seed_or_advance(0, c).expect("in range");
        assert_eq!(advance.old_current, b);
        let snap = table.get(0).expect("in range").expect("seeded");
        assert_eq!(snap.previous, b);
        assert_eq!(snap.current, c);
    }

    #[test]
    fn out_of_range_slots_are_rejected() {
        let mut table = FingerSlotTable::new(2);
        let err = table
            .seed_or_advance(2, sample(2, 1, FingerState::Pressed, 0.0))
            .expect_err("slot 2 is out of range");
        assert_eq!(
            err,
            GestureError::SlotOutOfRange {
                slot: 2,
                capacity: 2
            }
        );
        assert!(table.get(7).is_err());
    }

    #[test]
    fn state_scans_follow_slot_order() {
        let mut table = FingerSlotTable::new(5);
        table
            .seed_or_advance(1, sample(1, 1, FingerState::Pressed, 0.1))
            .expect("in range");
        table
            .seed_or_advance(3, sample(3, 1, FingerState::Pressed, 0.3))
            .expect("in range");
        table
            .seed_or_advance(4, sample(4, 1, FingerState::Hover, 0.4))
            .expect("in range");

        assert_eq!(table.count_in_state(FingerState::Pressed), 2);
        assert_eq!(table.count_in_state(FingerState::Hover), 1);
        assert_eq!(table.count_in_state(FingerState::Released), 0);
        assert_eq!(table.find_other_in_state(1, FingerState::Pressed), Some(3));
        assert_eq!(table.find_other_in_state(3, FingerState::Pressed), Some(1));
        assert_eq!(table.find_other_in_state(4, FingerState::Hover), None);
    }

    #[test]
    fn pressed_frames_only_stick_to_seeded_slots() {
        let mut table = FingerSlotTable::new(3);
        table.set_pressed_frames(0, 4).expect("in range");
        assert_eq!(table.get(0).expect("in range"), None);

        table
            .seed_or_advance(0, sample(0, 1, FingerState::Pressed, 0.0))
            .expect("in range");
        table.set_pressed_frames(0, 4).expect("in range");
        let snap = table.get(0).expect("in range").expect("seeded");
        assert_eq!(snap.pressed_frame_count, 4);
        assert!(table.set_pressed_frames(3, 1).is_err());
    }
}
