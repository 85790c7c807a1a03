//! Source of randomness shared by every generator.
//!
//! Production runs hand in a seeded or entropy-backed `rand` RNG; tests can
//! hand in a [`ScriptedSource`] to force specific branches.

use chrono::{Duration, NaiveDate};
use rand::{Rng, RngCore};

/// The helpers are derived from `next_f64` instead of `gen_range`,
/// `SliceRandom::choose` or `WeightedIndex` so a [`ScriptedSource`] drives
/// every draw one value at a time.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform integer in `[min, max]`.
    fn between(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f64;
        let value = (self.next_f64() * span).floor() as i64 + min;
        value.min(max)
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Uniform day in `[start, end]`; `start` when the window is empty.
    fn date_between(&mut self, start: NaiveDate, end: NaiveDate) -> NaiveDate {
        let days = (end - start).num_days();
        if days <= 0 {
            return start;
        }
        start + Duration::days(self.between(0, days))
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.between(0, items.len() as i64 - 1) as usize;
        items.get(index)
    }

    /// Draws a key with probability proportional to its weight. Falls back
    /// to the first key when the weights do not cover the draw.
    fn weighted<'a, K>(&mut self, options: &'a [(K, f64)]) -> Option<&'a K> {
        let total: f64 = options.iter().map(|(_, weight)| weight).sum();
        let threshold = self.next_f64() * total;
        let mut cumulative = 0.0;
        for (key, weight) in options {
            cumulative += weight;
            if threshold <= cumulative {
                return Some(key);
            }
        }
        options.first().map(|(key, _)| key)
    }
}

impl<R: RngCore> RandomSource for R {
    fn next_f64(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Replays a fixed list of samples, cycling when it runs out.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedSource {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 0.999_999)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn between_is_inclusive_at_both_ends() {
        assert_eq!(ScriptedSource::constant(0.0).between(3, 7), 3);
        assert_eq!(ScriptedSource::constant(0.999).between(3, 7), 7);
        assert_eq!(ScriptedSource::constant(0.5).between(4, 4), 4);
    }

    #[test]
    fn date_between_stays_in_window() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 22).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let date = rng.date_between(start, end);
            assert!(date >= start && date <= end);
        }
        assert_eq!(ScriptedSource::constant(0.5).date_between(end, start), end);
    }

    #[test]
    fn weighted_follows_cumulative_thresholds() {
        let options = [("a", 0.85), ("b", 0.12), ("c", 0.03)];
        assert_eq!(ScriptedSource::constant(0.10).weighted(&options), Some(&"a"));
        assert_eq!(ScriptedSource::constant(0.90).weighted(&options), Some(&"b"));
        assert_eq!(ScriptedSource::constant(0.99).weighted(&options), Some(&"c"));
    }

    #[test]
    fn scripted_source_cycles() {
        let mut source = ScriptedSource::new(vec![0.1, 0.2]);
        assert_eq!(source.next_f64(), 0.1);
        assert_eq!(source.next_f64(), 0.2);
        assert_eq!(source.next_f64(), 0.1);
    }

    #[test]
    fn seeded_rngs_repeat() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let xs: Vec<i64> = (0..10).map(|_| a.between(0, 100)).collect();
        let ys: Vec<i64> = (0..10).map(|_| b.between(0, 100)).collect();
        assert_eq!(xs, ys);
    }
}
