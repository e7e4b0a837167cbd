// Frequency model: unigram and bigram counts for the three symbol streams.
//
// A segment sequence yields three independent streams (chords, durations,
// velocities). Each stream gets a unigram table (symbol -> weight) and a
// bigram table (previous symbol -> next symbol -> weight). Weights are raw
// counts; normalization happens at sampling time.
//
// Loosening expands every chord into all of its non-empty sub-chords before
// counting. A transition between an n-pitch and an m-pitch chord then adds
// (2^n - 1) * (2^m - 1) bigram increments, which lets the walk match on
// partial chord recurrence.
//
// Rest velocities are never counted, so a rest can never be sampled as a
// velocity. Every counted symbol gets a (possibly empty) bigram row, which
// keeps row lookups total for any symbol the walk can reach.
//
// A `Model` is built per generation call and owned by it. Online learning
// mutates it in place through `reinforce`; it is never cached or shared.

use crate::chord::{Chord, LOOSEN_WARN_PITCHES};
use crate::error::{Error, Result};
use crate::sample::weighted_choice;
use crate::segment::Segment;
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::{debug, warn};

/// Symbol -> weight. BTreeMap keeps iteration order, and therefore sampling,
/// reproducible.
pub type FrequencyTable<K> = BTreeMap<K, f64>;

/// Unigram and bigram tables for one symbol stream.
#[derive(Debug, Clone)]
pub struct SymbolModel<K> {
    family: &'static str,
    unigram: FrequencyTable<K>,
    bigram: BTreeMap<K, FrequencyTable<K>>,
}

impl<K: Copy + Ord + Display> SymbolModel<K> {
    pub fn new(family: &'static str) -> Self {
        SymbolModel {
            family,
            unigram: FrequencyTable::new(),
            bigram: BTreeMap::new(),
        }
    }

    /// Stream name used in logs and errors ("chord", "duration", "velocity").
    pub fn family(&self) -> &'static str {
        self.family
    }

    /// Add `weight` to the unigram count of `symbol`.
    pub fn count(&mut self, symbol: K, weight: f64) {
        *self.unigram.entry(symbol).or_insert(0.0) += weight;
        self.bigram.entry(symbol).or_default();
    }

    /// Add `weight` to the `prev -> next` transition.
    pub fn count_transition(&mut self, prev: K, next: K, weight: f64) {
        *self
            .bigram
            .entry(prev)
            .or_default()
            .entry(next)
            .or_insert(0.0) += weight;
        self.bigram.entry(next).or_default();
    }

    /// Online learning: count `next` once, and the `prev -> next` transition
    /// once when there is a previous symbol.
    pub fn reinforce(&mut self, prev: Option<K>, next: K) {
        self.count(next, 1.0);
        if let Some(prev) = prev {
            self.count_transition(prev, next, 1.0);
        }
    }

    pub fn unigram(&self) -> &FrequencyTable<K> {
        &self.unigram
    }

    pub fn unigram_weight(&self, symbol: &K) -> f64 {
        self.unigram.get(symbol).copied().unwrap_or(0.0)
    }

    pub fn transition_weight(&self, prev: &K, next: &K) -> f64 {
        self.bigram
            .get(prev)
            .and_then(|row| row.get(next))
            .copied()
            .unwrap_or(0.0)
    }

    /// Outgoing transitions of `prev`. The row may be empty; a missing row
    /// means the model never saw `prev` at all.
    pub fn transitions_from(&self, prev: &K) -> Result<&FrequencyTable<K>> {
        self.bigram.get(prev).ok_or_else(|| Error::ModelLookup {
            family: self.family,
            symbol: prev.to_string(),
        })
    }

    /// Sum of every transition weight in the bigram table.
    pub fn transition_total(&self) -> f64 {
        self.bigram.values().flat_map(|row| row.values()).sum()
    }

    /// Number of bigram rows with at least one outgoing entry.
    pub fn live_rows(&self) -> usize {
        self.bigram.values().filter(|row| !row.is_empty()).count()
    }

    /// Draw from the global unigram pool, ignoring history.
    pub fn sample_unigram(&self, rng_val: f64) -> Option<K> {
        weighted_choice(&self.unigram, rng_val)
    }
}

/// Chord, duration and velocity models built from one segment sequence.
#[derive(Debug, Clone)]
pub struct Model {
    pub chords: SymbolModel<Chord>,
    /// Durations in grid units.
    pub durations: SymbolModel<u64>,
    pub velocities: SymbolModel<u8>,
}

impl Model {
    /// Count unigrams and first-order transitions over `segments`.
    pub fn build(segments: &[Segment], loosen: bool) -> Self {
        let mut model = Model {
            chords: SymbolModel::new("chord"),
            durations: SymbolModel::new("duration"),
            velocities: SymbolModel::new("velocity"),
        };

        let expanded: Vec<Vec<Chord>> = segments
            .iter()
            .map(|s| {
                if loosen {
                    if s.chord.pitch_count() > LOOSEN_WARN_PITCHES {
                        warn!(
                            chord = %s.chord,
                            pitches = s.chord.pitch_count(),
                            "loosening a large chord; sub-chord count grows as 2^n"
                        );
                    }
                    s.chord.sub_chords()
                } else {
                    vec![s.chord]
                }
            })
            .collect();

        for (segment, chords) in segments.iter().zip(&expanded) {
            for &chord in chords {
                model.chords.count(chord, 1.0);
            }
            model.durations.count(segment.duration, 1.0);
            if let Some(velocity) = segment.velocity {
                model.velocities.count(velocity, 1.0);
            }
        }

        for (i, pair) in segments.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            for &from in &expanded[i] {
                for &to in &expanded[i + 1] {
                    model.chords.count_transition(from, to, 1.0);
                }
            }
            model
                .durations
                .count_transition(prev.duration, next.duration, 1.0);
            if let (Some(from), Some(to)) = (prev.velocity, next.velocity) {
                model.velocities.count_transition(from, to, 1.0);
            }
        }

        debug!(
            loosen,
            chords = model.chords.unigram().len(),
            chord_rows = model.chords.live_rows(),
            chord_transitions = model.chords.transition_total(),
            durations = model.durations.unigram().len(),
            velocities = model.velocities.unigram().len(),
            "built frequency model"
        );
        model
    }
}
