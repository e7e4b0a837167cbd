// Continuation back ends.
//
// The composition front end treats every generator as the same black box:
// a note list in, newly generated notes out. Remote model services implement
// this elsewhere; `MarkovBackend` is the local, statistics-only back end.
//
// Each backend owns its RNG, so two backends used side by side never
// interleave draws. Each call builds a fresh model from the notes it is
// given; nothing learned in one call carries into the next.

use crate::config::ContinuationConfig;
use crate::error::Result;
use crate::generate::{GenerateParams, generate};
use crate::note::Note;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// A note-sequence continuation strategy.
pub trait ContinuationBackend {
    /// Short identifier shown in the front end's model picker.
    fn name(&self) -> &str;

    /// Produce notes that continue `notes` for about `extend_duration`
    /// seconds past the input's end. Returns only the new notes.
    fn extend(&mut self, notes: &[Note], extend_duration: f64) -> Result<Vec<Note>>;
}

/// Markov chord/duration/velocity walk over the input's own statistics.
pub struct MarkovBackend {
    params: GenerateParams,
    rng: StdRng,
}

impl MarkovBackend {
    pub fn new(params: GenerateParams, seed: u64) -> Self {
        MarkovBackend {
            params,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Build from a config, seeding from the OS when it has no seed.
    pub fn from_config(config: &ContinuationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        MarkovBackend {
            params: config.params,
            rng,
        }
    }

    pub fn params(&self) -> &GenerateParams {
        &self.params
    }
}

impl ContinuationBackend for MarkovBackend {
    fn name(&self) -> &str {
        "markov_chain"
    }

    fn extend(&mut self, notes: &[Note], extend_duration: f64) -> Result<Vec<Note>> {
        let params = GenerateParams {
            extend_duration,
            ..self.params
        };
        generate(notes, &params, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn melody() -> Vec<Note> {
        vec![
            Note::new(60, 0.0, 1.0, 80),
            Note::new(64, 1.0, 1.0, 70),
            Note::new(67, 2.0, 2.0, 90),
            Note::new(64, 4.0, 1.0, 70),
        ]
    }

    #[test]
    fn same_seed_same_output() {
        let params = GenerateParams::new(0.25, 8.0).with_variation(0.3);
        let mut a = MarkovBackend::new(params, 17);
        let mut b = MarkovBackend::new(params, 17);
        assert_eq!(a.extend(&melody(), 8.0).unwrap(), b.extend(&melody(), 8.0).unwrap());
        assert_eq!(a.name(), "markov_chain");
    }

    #[test]
    fn extend_duration_overrides_params() {
        let mut backend = MarkovBackend::new(GenerateParams::new(0.25, 1.0), 3);
        let out = backend.extend(&melody(), 30.0).unwrap();
        let end = out.iter().map(Note::end_time).fold(0.0, f64::max);
        assert!(end >= 35.0);
        assert_eq!(backend.params().extend_duration, 1.0);
    }

    #[test]
    fn usable_as_trait_object() {
        let config = ContinuationConfig {
            seed: Some(1),
            ..ContinuationConfig::piano_roll()
        };
        let mut backends: Vec<Box<dyn ContinuationBackend>> =
            vec![Box::new(MarkovBackend::from_config(&config))];
        for backend in &mut backends {
            let out = backend.extend(&melody(), 4.0).unwrap();
            assert!(out.iter().all(|n| n.start_time >= 5.0));
        }
    }

    #[test]
    fn invalid_extend_duration_is_rejected() {
        let mut backend = MarkovBackend::new(GenerateParams::default(), 0);
        assert!(backend.extend(&melody(), 0.0).unwrap_err().is_invalid_argument());
    }
}
