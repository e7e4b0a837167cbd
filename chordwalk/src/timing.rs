// Piano-roll timing: beat-relative roll ticks <-> seconds.
//
// The piano-roll front end stores notes on a grid of 96 ticks per beat at a
// user-set tempo, while generators work in seconds. Incoming roll notes are
// converted at 60 / (96 * bpm) seconds per tick. Generated notes come back
// rounded to the millisecond and then snapped to the nearest roll tick, with
// a minimum length of one tick.

use crate::error::{Error, Result};
use crate::note::Note;
use serde::{Deserialize, Serialize};

/// Roll grid resolution.
pub const TICKS_PER_BEAT: u32 = 96;

/// A note as the piano roll stores it, timed in roll ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollNote {
    pub pitch: u8,
    pub start: u64,
    pub duration: u64,
    pub velocity: u8,
}

impl RollNote {
    pub fn end(&self) -> u64 {
        self.start + self.duration
    }
}

/// Tempo in quarter-note beats per minute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tempo {
    pub bpm: f64,
}

impl Tempo {
    pub fn new(bpm: f64) -> Result<Self> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(Error::invalid(format!("bpm {bpm} must be a positive number")));
        }
        Ok(Tempo { bpm })
    }

    pub fn seconds_per_tick(&self) -> f64 {
        60.0 / (f64::from(TICKS_PER_BEAT) * self.bpm)
    }

    pub fn to_note(&self, roll: &RollNote) -> Note {
        let spt = self.seconds_per_tick();
        Note::new(
            roll.pitch,
            roll.start as f64 * spt,
            roll.duration as f64 * spt,
            roll.velocity,
        )
    }

    pub fn to_roll(&self, note: &Note) -> RollNote {
        let spt = self.seconds_per_tick();
        let start_secs = round_millis(note.start_time);
        let end_secs = round_millis(start_secs + note.duration);
        let start = (start_secs / spt).round().max(0.0) as u64;
        let end = ((end_secs / spt).round().max(0.0) as u64).max(start + 1);
        RollNote {
            pitch: note.pitch,
            start,
            duration: end - start,
            velocity: note.velocity,
        }
    }

    pub fn notes_from_roll(&self, roll: &[RollNote]) -> Vec<Note> {
        roll.iter().map(|r| self.to_note(r)).collect()
    }

    pub fn roll_from_notes(&self, notes: &[Note]) -> Vec<RollNote> {
        notes.iter().map(|n| self.to_roll(n)).collect()
    }
}

fn round_millis(t: f64) -> f64 {
    (t * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_per_tick_at_120_bpm() {
        let tempo = Tempo::new(120.0).unwrap();
        assert!((tempo.seconds_per_tick() - 0.5 / 96.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_tempo() {
        assert!(Tempo::new(0.0).unwrap_err().is_invalid_argument());
        assert!(Tempo::new(-60.0).is_err());
        assert!(Tempo::new(f64::NAN).is_err());
    }

    #[test]
    fn roll_note_converts_to_seconds() {
        let tempo = Tempo::new(60.0).unwrap();
        let note = tempo.to_note(&RollNote {
            pitch: 72,
            start: 96,
            duration: 48,
            velocity: 100,
        });
        assert_eq!(note.pitch, 72);
        assert!((note.start_time - 1.0).abs() < 1e-12);
        assert!((note.duration - 0.5).abs() < 1e-12);
        assert_eq!(note.velocity, 100);
    }

    #[test]
    fn generated_note_snaps_to_roll_grid() {
        let tempo = Tempo::new(120.0).unwrap();
        let roll = tempo.to_roll(&Note::new(64, 1.0004, 0.2496, 80));
        // 1.000 s = 192 ticks, 1.250 s = 240 ticks at 120 bpm
        assert_eq!(roll.start, 192);
        assert_eq!(roll.end(), 240);
    }

    #[test]
    fn very_short_note_keeps_one_tick() {
        let tempo = Tempo::new(120.0).unwrap();
        let roll = tempo.to_roll(&Note::new(64, 2.0, 0.0001, 80));
        assert_eq!(roll.duration, 1);
    }

    #[test]
    fn roll_round_trip_is_stable() {
        let tempo = Tempo::new(90.0).unwrap();
        let roll = vec![
            RollNote {
                pitch: 60,
                start: 0,
                duration: 96,
                velocity: 80,
            },
            RollNote {
                pitch: 67,
                start: 96,
                duration: 24,
                velocity: 64,
            },
        ];
        assert_eq!(tempo.roll_from_notes(&tempo.notes_from_roll(&roll)), roll);
    }
}
