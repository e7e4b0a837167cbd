// The flat note record shared by every generator back end.
//
// Times are in seconds. The JSON form uses `pitch`, `start_time`, `duration`
// and `velocity`; the piano-roll front end historically sent the pitch under
// `note`, which is accepted as an alias.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Highest legal MIDI pitch / velocity value.
pub const MIDI_MAX: u8 = 127;

/// A single timed note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// MIDI pitch (0-127).
    #[serde(alias = "note")]
    pub pitch: u8,
    /// Onset in seconds, >= 0.
    pub start_time: f64,
    /// Length in seconds, > 0.
    pub duration: f64,
    /// MIDI velocity (0-127).
    pub velocity: u8,
}

impl Note {
    pub fn new(pitch: u8, start_time: f64, duration: f64, velocity: u8) -> Self {
        Note {
            pitch,
            start_time,
            duration,
            velocity,
        }
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Check the field ranges a note must satisfy before it can be segmented.
    pub fn validate(&self) -> Result<()> {
        if self.pitch > MIDI_MAX {
            return Err(Error::invalid(format!("pitch {} is outside 0-127", self.pitch)));
        }
        if self.velocity > MIDI_MAX {
            return Err(Error::invalid(format!(
                "velocity {} is outside 0-127",
                self.velocity
            )));
        }
        if !self.start_time.is_finite() || self.start_time < 0.0 {
            return Err(Error::invalid(format!(
                "start_time {} must be a finite number >= 0",
                self.start_time
            )));
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(Error::invalid(format!(
                "duration {} must be a finite number > 0",
                self.duration
            )));
        }
        Ok(())
    }
}

/// Latest end time over a note list, or 0.0 for an empty list.
pub fn latest_end(notes: &[Note]) -> f64 {
    notes.iter().map(Note::end_time).fold(0.0, f64::max)
}
