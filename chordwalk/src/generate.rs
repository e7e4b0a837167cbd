// Stochastic continuation: walk the frequency model past the input's end.
//
// The walk state is the last chord, duration and velocity plus the current
// end time, seeded from the final input segment. Each step samples the three
// streams independently, in the order chord, duration, velocity. For each
// stream a uniform draw `r` is taken first; if the current symbol has
// outgoing transitions and `r >= variation` the next symbol comes from that
// bigram row, otherwise from the stream's global unigram pool. So
// `variation = 1.0` is a pure unigram walk.
//
// With `include_new`, every sampled symbol and transition is counted back
// into the model before the next step, so the walk reinforces itself.
//
// The loop runs while the end time is short of `input_end + extend_duration`
// and never clips the final segment: the output may overshoot the target by
// less than one sampled duration. Every sampled duration is positive, so the
// loop always terminates.
//
// The walk runs on the grid, starting at the last quantized boundary. Output
// times are measured from the input end in seconds, the later of the raw
// latest note end and that boundary, so no generated note starts before the
// input finishes even when the final note end rounds down. Rest segments
// produce no notes; each pitched segment produces one note per pitch, all
// sharing the segment's timing and velocity.

use crate::chord::Chord;
use crate::error::{Error, Result};
use crate::model::{Model, SymbolModel};
use crate::note::{Note, latest_end};
use crate::quantize::{MAX_GRID_INDEX, check_tick, grid_seconds};
use crate::sample::weighted_choice;
use crate::segment::{Segment, segment_notes};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{debug, trace};

/// Parameters of one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateParams {
    /// Quantization grain in seconds.
    pub tick: f64,
    /// Seconds to extend past the input's end.
    pub extend_duration: f64,
    /// Probability of ignoring learned transitions for unigram sampling.
    pub variation: f64,
    /// Count every sub-chord of each chord.
    pub loosen: bool,
    /// Feed generated symbols back into the model while walking.
    pub include_new: bool,
}

impl Default for GenerateParams {
    fn default() -> Self {
        GenerateParams {
            tick: 1.0 / 96.0,
            extend_duration: 20.0,
            variation: 0.0,
            loosen: false,
            include_new: false,
        }
    }
}

impl GenerateParams {
    pub fn new(tick: f64, extend_duration: f64) -> Self {
        GenerateParams {
            tick,
            extend_duration,
            ..Default::default()
        }
    }

    pub fn with_variation(mut self, variation: f64) -> Self {
        self.variation = variation;
        self
    }

    pub fn with_loosen(mut self, loosen: bool) -> Self {
        self.loosen = loosen;
        self
    }

    pub fn with_include_new(mut self, include_new: bool) -> Self {
        self.include_new = include_new;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_tick(self.tick)?;
        if !self.extend_duration.is_finite() || self.extend_duration <= 0.0 {
            return Err(Error::invalid(format!(
                "extend_duration {} must be a positive number",
                self.extend_duration
            )));
        }
        if self.extend_duration / self.tick > MAX_GRID_INDEX as f64 {
            return Err(Error::invalid(format!(
                "extend_duration {} spans more than 2^53 ticks of {}",
                self.extend_duration, self.tick
            )));
        }
        if !(0.0..=1.0).contains(&self.variation) {
            return Err(Error::invalid(format!(
                "variation {} must be between 0 and 1 inclusive",
                self.variation
            )));
        }
        Ok(())
    }
}

/// Everything one generation call produced.
#[derive(Debug, Clone)]
pub struct Continuation {
    /// Generated segments in time order, rests included.
    pub segments: Vec<Segment>,
    /// Generated notes only; the input is not echoed.
    pub notes: Vec<Note>,
    /// Input end in seconds: the later of the raw latest note end and the
    /// last quantized boundary. Generated times count from here.
    pub input_end: f64,
    /// Grid index of the last quantized input boundary.
    pub origin: u64,
    /// `input_end + extend_duration`.
    pub target_end: f64,
    /// The model after the walk (reinforced when `include_new` was set).
    pub model: Model,
}

impl Continuation {
    /// End of the last generated segment, in seconds.
    pub fn generated_end(&self, tick: f64) -> f64 {
        self.segments
            .last()
            .map(|s| self.input_end + grid_seconds(s.end().saturating_sub(self.origin), tick))
            .unwrap_or(self.input_end)
    }
}

/// Walk state carried between steps.
#[derive(Debug, Clone, Copy)]
struct WalkState {
    chord: Chord,
    duration: u64,
    velocity: Option<u8>,
    end: u64,
}

/// Extend `notes` by roughly `params.extend_duration` seconds and return
/// only the new notes.
pub fn generate(notes: &[Note], params: &GenerateParams, rng: &mut impl Rng) -> Result<Vec<Note>> {
    continue_notes(notes, params, rng).map(|c| c.notes)
}

/// Like [`generate`], but also returns the generated segments and the final
/// model.
pub fn continue_notes(
    notes: &[Note],
    params: &GenerateParams,
    rng: &mut impl Rng,
) -> Result<Continuation> {
    if notes.is_empty() {
        return Err(Error::invalid("notes must be non-empty"));
    }
    params.validate()?;

    let segments = segment_notes(notes, params.tick, rng)?;
    let Some(last) = segments.last().copied() else {
        return Err(Error::invalid("no note lasts a full tick after quantization"));
    };
    let mut model = Model::build(&segments, params.loosen);
    if model.velocities.unigram().is_empty() {
        return Err(Error::invalid("no note lasts a full tick after quantization"));
    }

    let origin = last.end();
    let input_end = latest_end(notes).max(grid_seconds(origin, params.tick));
    let target_end = input_end + params.extend_duration;
    let mut state = WalkState {
        chord: last.chord,
        duration: last.duration,
        velocity: last.velocity,
        end: origin,
    };

    let mut generated = Vec::new();
    while grid_seconds(state.end - origin, params.tick) < params.extend_duration {
        let chord = next_symbol(&model.chords, Some(state.chord), params.variation, rng)?;
        let duration = next_symbol(&model.durations, Some(state.duration), params.variation, rng)?;
        let velocity = next_symbol(&model.velocities, state.velocity, params.variation, rng)?;

        if params.include_new {
            model.chords.reinforce(Some(state.chord), chord);
            model.durations.reinforce(Some(state.duration), duration);
            model.velocities.reinforce(state.velocity, velocity);
        }

        let segment = Segment {
            chord,
            start: state.end,
            duration,
            velocity: (!chord.is_rest()).then_some(velocity),
        };
        let end = state.end.checked_add(duration).ok_or_else(|| {
            Error::invalid(format!("continuation passed grid index {}", state.end))
        })?;
        trace!(%chord, start = segment.start, duration, velocity, "generated segment");
        generated.push(segment);

        state = WalkState {
            chord,
            duration,
            velocity: Some(velocity),
            end,
        };
    }

    let new_notes = assemble_from(&generated, params.tick, origin, input_end);
    debug!(
        segments = generated.len(),
        notes = new_notes.len(),
        input_end,
        target_end,
        "generated continuation"
    );
    Ok(Continuation {
        segments: generated,
        notes: new_notes,
        input_end,
        origin,
        target_end,
        model,
    })
}

/// Sample the next symbol of one stream.
///
/// Always consumes two draws: the variation draw, then the choice draw.
fn next_symbol<K: Copy + Ord + Display>(
    model: &SymbolModel<K>,
    current: Option<K>,
    variation: f64,
    rng: &mut impl Rng,
) -> Result<K> {
    let r: f64 = rng.random();
    let choice: f64 = rng.random();

    if let Some(current) = current {
        let row = model.transitions_from(&current)?;
        if !row.is_empty() && r >= variation {
            return weighted_choice(row, choice).ok_or_else(|| Error::ModelLookup {
                family: model.family(),
                symbol: format!("successors of {current}"),
            });
        }
    }

    model.sample_unigram(choice).ok_or_else(|| Error::ModelLookup {
        family: model.family(),
        symbol: "the unigram pool".to_string(),
    })
}

/// Flatten segments back into notes, dropping rests.
pub fn assemble(segments: &[Segment], tick: f64) -> Vec<Note> {
    assemble_from(segments, tick, 0, 0.0)
}

/// Like [`assemble`], with grid index `origin` placed at `origin_time`
/// seconds. Segments must not start before `origin`.
pub fn assemble_from(
    segments: &[Segment],
    tick: f64,
    origin: u64,
    origin_time: f64,
) -> Vec<Note> {
    let mut notes = Vec::new();
    for segment in segments {
        let Some(velocity) = segment.velocity else {
            continue;
        };
        let start_time = origin_time + grid_seconds(segment.start.saturating_sub(origin), tick);
        let duration = segment.duration_secs(tick);
        for pitch in segment.chord.pitches() {
            notes.push(Note::new(pitch, start_time, duration, velocity));
        }
    }
    notes
}
