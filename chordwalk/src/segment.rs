// Chord segmentation: slicing overlapping notes into a gapless chord timeline.
//
// Every note contributes its quantized start and end as boundaries, plus
// time 0 so a leading silence becomes a rest segment. Between each pair of
// consecutive boundaries, the chord is the set of notes spanning the whole
// interval. A note that only partially covers an interval does not count,
// so a note that quantizes to zero length never sounds in any segment.
//
// Each pitched segment keeps one velocity, drawn uniformly from the
// qualifying notes' velocities in input order. Per-note velocities within a
// chord are deliberately not preserved.

use crate::chord::Chord;
use crate::error::{Error, Result};
use crate::note::Note;
use crate::quantize::{check_tick, grid_seconds, to_grid};
use rand::Rng;
use tracing::debug;

/// One interval of the chord timeline, in grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub chord: Chord,
    /// Grid index of the segment start.
    pub start: u64,
    /// Length in grid units, always > 0.
    pub duration: u64,
    /// Representative velocity; `None` exactly when the chord is a rest.
    pub velocity: Option<u8>,
}

impl Segment {
    /// Grid index just past the segment. Saturates instead of wrapping for
    /// hand-built segments; segments from this crate stay far below the cap.
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.duration)
    }

    pub fn start_time(&self, tick: f64) -> f64 {
        grid_seconds(self.start, tick)
    }

    pub fn duration_secs(&self, tick: f64) -> f64 {
        grid_seconds(self.duration, tick)
    }
}

/// A note's quantized extent on the grid.
#[derive(Debug, Clone, Copy)]
struct GridSpan {
    start: u64,
    end: u64,
    pitch: u8,
    velocity: u8,
}

/// Sorted, de-duplicated boundary indices: 0 plus every quantized note start
/// and end.
pub fn boundaries(notes: &[Note], tick: f64) -> Result<Vec<u64>> {
    let mut times = vec![0];
    for note in notes {
        times.push(to_grid(note.start_time, tick)?);
        times.push(to_grid(note.end_time(), tick)?);
    }
    times.sort_unstable();
    times.dedup();
    Ok(times)
}

/// Partition the input's timeline into chord segments.
///
/// Fails with `InvalidArgument` on an empty note list, a bad tick, any note
/// with out-of-range fields, or a note ending beyond the grid.
pub fn segment_notes(notes: &[Note], tick: f64, rng: &mut impl Rng) -> Result<Vec<Segment>> {
    if notes.is_empty() {
        return Err(Error::invalid("notes must be non-empty"));
    }
    check_tick(tick)?;
    for note in notes {
        note.validate()?;
    }

    let spans = notes
        .iter()
        .map(|n| {
            Ok(GridSpan {
                start: to_grid(n.start_time, tick)?,
                end: to_grid(n.end_time(), tick)?,
                pitch: n.pitch,
                velocity: n.velocity,
            })
        })
        .collect::<Result<Vec<GridSpan>>>()?;
    let times = boundaries(notes, tick)?;

    let mut segments = Vec::with_capacity(times.len().saturating_sub(1));
    let mut velocities: Vec<u8> = Vec::new();
    for pair in times.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let mut chord = Chord::REST;
        velocities.clear();
        for span in spans.iter().filter(|s| s.start <= from && s.end >= to) {
            chord = chord.with_pitch(span.pitch);
            velocities.push(span.velocity);
        }
        let velocity = if velocities.is_empty() {
            None
        } else {
            Some(velocities[rng.random_range(0..velocities.len())])
        };
        segments.push(Segment {
            chord,
            start: from,
            duration: to - from,
            velocity,
        });
    }

    debug!(
        notes = notes.len(),
        boundaries = times.len(),
        segments = segments.len(),
        "segmented input"
    );
    Ok(segments)
}
