//! Shared helpers for the game state machines.
//!
//! Every game builds its RNG the same way, shuffles content the same way, and
//! turns millisecond event stamps into whole seconds the same way; keeping
//! those here leaves each game file to its own rules and scoring.
//!
//! ## RNG ordering
//!
//! Games draw from their RNG only inside event handlers, in a fixed order per
//! event. A seeded game replayed with the same events therefore produces the
//! same grids, words, sequences, and cards.

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Milliseconds on the presenter's monotonic clock.
pub type Millis = u64;

/// Seeded when `seed` is given, otherwise from entropy.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None       => StdRng::from_entropy(),
    }
}

/// Fisher-Yates shuffle in place.
pub fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// A shuffled copy of `pool`.
pub fn shuffled<T: Clone, R: Rng>(pool: &[T], rng: &mut R) -> Vec<T> {
    let mut items = pool.to_vec();
    shuffle(&mut items, rng);
    items
}

/// `count` distinct items from `pool` in random order (fewer if the pool is short).
pub fn sample<T: Clone, R: Rng>(pool: &[T], count: usize, rng: &mut R) -> Vec<T> {
    let mut items = shuffled(pool, rng);
    items.truncate(count);
    items
}

/// Elapsed time between two stamps in fractional seconds. Out-of-order stamps give 0.
pub fn elapsed_secs(start: Millis, end: Millis) -> f64 {
    end.saturating_sub(start) as f64 / 1000.0
}

/// Whole seconds, rounded.
pub fn whole_secs(start: Millis, end: Millis) -> u32 {
    elapsed_secs(start, end).round() as u32
}

/// Clamp a computed score into `0..=100` and round it.
pub fn final_score(raw: f64) -> u32 {
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, 100.0).round() as u32
}

/// `part / whole × 100`, or 0 when `whole` is 0.
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_keeps_every_item() {
        let mut rng = make_rng(Some(42));
        let mut items: Vec<u32> = (0..25).collect();
        shuffle(&mut items, &mut rng);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn seeded_shuffles_are_deterministic() {
        let make = |seed| shuffled(&[1, 2, 3, 4, 5, 6, 7], &mut make_rng(Some(seed)));
        assert_eq!(make(99), make(99));
    }

    #[test]
    fn sample_is_bounded_by_pool() {
        let mut rng = make_rng(Some(1));
        assert_eq!(sample(&[1, 2, 3], 10, &mut rng).len(), 3);
        assert_eq!(sample(&[1, 2, 3], 2, &mut rng).len(), 2);
    }

    #[test]
    fn timing_helpers() {
        assert_eq!(elapsed_secs(1_000, 3_500), 2.5);
        assert_eq!(elapsed_secs(5_000, 1_000), 0.0);
        assert_eq!(whole_secs(0, 2_600), 3);
        assert_eq!(final_score(140.2), 100);
        assert_eq!(final_score(-3.0), 0);
        assert_eq!(percent(1.0, 0.0), 0.0);
    }
}
