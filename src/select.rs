//! Bounded random candidate selection.
//!
//! When a run discovers more photos than `max_photos`, a uniform random
//! subset of exactly that size is processed instead of the full set. The
//! random source is injected by the caller so that subset selection is
//! reproducible under test (seed a [`rand::rngs::StdRng`]).

use rand::Rng;
use rand::seq::SliceRandom;
use std::path::PathBuf;

/// Choose at most `cap` candidates.
///
/// With `candidates.len() <= cap` the input is returned unchanged, order
/// preserved. Otherwise exactly `cap` distinct elements are drawn without
/// replacement; the order among sampled elements is unspecified.
pub fn select_candidates<R: Rng>(
    candidates: Vec<PathBuf>,
    cap: usize,
    rng: &mut R,
) -> Vec<PathBuf> {
    if candidates.len() <= cap {
        log::info!(
            "selected all {} photos (at or below the {} cap)",
            candidates.len(),
            cap
        );
        return candidates;
    }

    let selected: Vec<PathBuf> = candidates
        .choose_multiple(rng, cap)
        .cloned()
        .collect();
    log::info!(
        "randomly selected {} of {} photos",
        selected.len(),
        candidates.len()
    );
    selected
}
