// Chordwalk: Markov-chain continuation of symbolic note sequences.
//
// Given timed notes (pitch, start, duration, velocity), chordwalk produces a
// plausible extension using only the statistics of the input itself. No
// model is trained or loaded; everything is rebuilt per call.
//
// Architecture (data flows top to bottom):
// - quantize.rs: rounding note boundaries onto the tick grid
// - chord.rs: chord symbols as 128-bit pitch sets, sub-chord expansion
// - segment.rs: slicing overlapping notes into a gapless chord timeline
// - model.rs: unigram/bigram tables for chords, durations and velocities
// - sample.rs: weighted choice by cumulative-weight inversion
// - generate.rs: the stochastic walk, online learning, note assembly
//
// Around the core:
// - note.rs: the shared note record and its JSON schema
// - config.rs: JSON-loadable generation settings
// - backend.rs: the interchangeable-generator trait and the Markov back end
// - timing.rs: piano-roll tick/tempo conversion
// - error.rs: error taxonomy
//
// All randomness comes from an RNG handle passed in by the caller, so output
// is reproducible given a seed.

pub mod backend;
pub mod chord;
pub mod config;
pub mod error;
pub mod generate;
pub mod model;
pub mod note;
pub mod quantize;
pub mod sample;
pub mod segment;
pub mod timing;

pub use backend::{ContinuationBackend, MarkovBackend};
pub use chord::Chord;
pub use config::ContinuationConfig;
pub use error::{Error, Result};
pub use generate::{Continuation, GenerateParams, continue_notes, generate};
pub use note::Note;
pub use quantize::round_to_tick;
pub use segment::{Segment, segment_notes};
