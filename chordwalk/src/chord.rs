// Chord symbols: the set of pitches sounding through one segment.
//
// A chord is a 128-bit pitch set, bit `p` set when MIDI pitch `p` sounds.
// The empty set is the rest symbol, so a rest can never be mixed with real
// pitches. Equality, hashing and ordering are structural on the bitmask,
// which gives a total order for reproducible table iteration.

use std::fmt;

/// Pitch count above which loosening is worth a warning: 2^12 - 1 sub-chords
/// per occurrence, squared for every transition.
pub const LOOSEN_WARN_PITCHES: u32 = 12;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Chord(u128);

impl Chord {
    /// The reserved "no note sounding" symbol.
    pub const REST: Chord = Chord(0);

    /// Build a chord from pitches in any order. Duplicates collapse; pitches
    /// above 127 are ignored.
    pub fn from_pitches<I: IntoIterator<Item = u8>>(pitches: I) -> Self {
        pitches.into_iter().fold(Chord::REST, Chord::with_pitch)
    }

    /// This chord plus one more pitch.
    pub fn with_pitch(self, pitch: u8) -> Self {
        Chord(self.0 | 1u128.checked_shl(u32::from(pitch)).unwrap_or(0))
    }

    pub fn is_rest(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, pitch: u8) -> bool {
        pitch < 128 && self.0 & (1u128 << pitch) != 0
    }

    /// Number of distinct pitches (0 for the rest).
    pub fn pitch_count(self) -> u32 {
        self.0.count_ones()
    }

    /// Pitches in ascending order.
    pub fn pitches(self) -> impl Iterator<Item = u8> {
        (0u8..128).filter(move |&p| self.contains(p))
    }

    /// Every non-empty sub-chord, in ascending symbol order: `2^n - 1`
    /// symbols for an `n`-pitch chord. The rest expands to itself.
    pub fn sub_chords(self) -> Vec<Chord> {
        if self.is_rest() {
            return vec![Chord::REST];
        }
        let mut subs = Vec::with_capacity((1usize << self.pitch_count().min(20)) - 1);
        let mut sub = self.0;
        while sub != 0 {
            subs.push(Chord(sub));
            sub = (sub - 1) & self.0;
        }
        subs.reverse();
        subs
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_rest() {
            return write!(f, "rest");
        }
        write!(f, "(")?;
        for (i, p) in self.pitches().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chord{self}")
    }
}
