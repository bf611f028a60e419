//! Hash functions and probe sequences.
//!
//! The primary hash is the 32-bit avalanche mix
//!
//! ```text
//! x = ((x >> 16) ^ x) * 0x045d9f3b
//! x = ((x >> 16) ^ x) * 0x045d9f3b
//! x =  (x >> 16) ^ x
//! ```
//!
//! evaluated with wrapping `u32` arithmetic on the key's two's-complement bit
//! pattern, then reduced modulo the table size. Snapshots produced by other
//! implementations of the same mix line up slot for slot.

use crate::strategy::Strategy;

const MIX_MULTIPLIER: u32 = 0x045d_9f3b;

#[inline(always)]
fn mix(key: i32) -> u32 {
    let mut x = key as u32;
    x = ((x >> 16) ^ x).wrapping_mul(MIX_MULTIPLIER);
    x = ((x >> 16) ^ x).wrapping_mul(MIX_MULTIPLIER);
    (x >> 16) ^ x
}

/// Maps `key` to its home slot in `[0, table_size)`.
///
/// `table_size` must be non-zero.
#[inline]
pub fn primary_hash(key: i32, table_size: usize) -> usize {
    debug_assert!(table_size > 0);
    mix(key) as usize % table_size
}

/// Maps `key` to a double-hashing step in `[1, table_size - 1]`.
///
/// Computed as `1 + (key mod (table_size - 1))` over the key's unsigned bit
/// pattern. Never returns zero; for `table_size <= 2` the step is always 1.
///
/// # Examples
///
/// ```rust
/// use probe_hash::hashing::secondary_hash;
///
/// assert_eq!(secondary_hash(0, 7), 1);
/// assert_eq!(secondary_hash(5, 7), 6);
/// assert_eq!(secondary_hash(6, 7), 1);
/// assert_eq!(secondary_hash(42, 2), 1);
/// ```
#[inline]
pub fn secondary_hash(key: i32, table_size: usize) -> usize {
    if table_size <= 2 {
        return 1;
    }
    1 + (key as u32 as usize % (table_size - 1))
}

/// The probe-sequence shape of an open-addressing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Probing {
    Linear,
    Quadratic,
    Double,
}

impl Probing {
    pub(crate) fn for_strategy(strategy: Strategy) -> Option<Self> {
        match strategy {
            Strategy::Chaining => None,
            Strategy::LinearProbing => Some(Probing::Linear),
            Strategy::QuadraticProbing => Some(Probing::Quadratic),
            Strategy::DoubleHashing => Some(Probing::Double),
        }
    }
}

/// The slot indices visited by an open-addressing probe, in order.
///
/// Yields exactly `table_size` indices: attempt `i` visits
/// `(h + step(i)) mod table_size`, where `step(i)` is `i`, `i + i²` or `i·h2`
/// depending on the strategy. Offsets are advanced incrementally modulo the
/// table size, so large tables never overflow.
#[derive(Debug, Clone)]
pub struct ProbeSequence {
    home: usize,
    offset: usize,
    attempt: usize,
    table_size: usize,
    probing: Probing,
    step: usize,
}

impl ProbeSequence {
    /// Builds the probe sequence for `key` under an open-addressing
    /// `strategy`.
    ///
    /// Returns `None` for [`Strategy::Chaining`], which does not probe.
    ///
    /// # Panics
    ///
    /// Panics if `table_size` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::Strategy;
    /// use probe_hash::hashing::ProbeSequence;
    ///
    /// let slots: Vec<usize> = ProbeSequence::new(Strategy::LinearProbing, 10, 5)
    ///     .unwrap()
    ///     .collect();
    /// assert_eq!(slots, [4, 0, 1, 2, 3]);
    /// ```
    pub fn new(strategy: Strategy, key: i32, table_size: usize) -> Option<Self> {
        Probing::for_strategy(strategy).map(|probing| Self::with_probing(probing, key, table_size))
    }

    pub(crate) fn with_probing(probing: Probing, key: i32, table_size: usize) -> Self {
        let step = match probing {
            Probing::Linear => 1,
            Probing::Quadratic => 0,
            Probing::Double => secondary_hash(key, table_size) % table_size,
        };

        Self {
            home: primary_hash(key, table_size),
            offset: 0,
            attempt: 0,
            table_size,
            probing,
            step,
        }
    }

    /// The slot visited by the first attempt.
    pub fn home(&self) -> usize {
        self.home
    }
}

impl Iterator for ProbeSequence {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.attempt >= self.table_size {
            return None;
        }

        if self.attempt > 0 {
            let delta = match self.probing {
                // (i + i²) - ((i - 1) + (i - 1)²) = 2i
                Probing::Quadratic => (2 * self.attempt) % self.table_size,
                Probing::Linear | Probing::Double => self.step,
            };
            self.offset = (self.offset + delta) % self.table_size;
        }
        self.attempt += 1;

        Some((self.home + self.offset) % self.table_size)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.table_size - self.attempt;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ProbeSequence {}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn primary_hash_reference_values() {
        // Fixed outputs of the avalanche mix; snapshots depend on these.
        assert_eq!(mix(0), 0);
        assert_eq!(mix(-1), 539_527_247);
        assert_eq!(mix(i32::MAX), 3_192_437_470);
        assert_eq!(mix(i32::MIN), 1_029_333_365);

        assert_eq!(primary_hash(10, 5), 4);
        assert_eq!(primary_hash(15, 5), 4);
        assert_eq!(primary_hash(1, 3), 1);
        assert_eq!(primary_hash(4, 3), 1);
        assert_eq!(primary_hash(7, 3), 0);
    }

    #[test]
    fn primary_hash_is_in_range_and_deterministic() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        for _ in 0..10_000 {
            let key: i32 = rng.random();
            let size = rng.random_range(1..=4096usize);
            let index = primary_hash(key, size);
            assert!(index < size);
            assert_eq!(index, primary_hash(key, size));
        }
    }

    #[test]
    fn primary_hash_spreads_sequential_keys() {
        let size = 101;
        let mut counts = alloc::vec![0usize; size];
        for key in 0..(size as i32 * 100) {
            counts[primary_hash(key, size)] += 1;
        }
        // Every bucket should see roughly 100 keys.
        assert!(counts.iter().all(|&c| (50..=150).contains(&c)), "{counts:?}");
    }

    #[test]
    fn secondary_hash_is_never_zero() {
        let mut rng = SmallRng::seed_from_u64(7);
        for size in 3..200usize {
            for _ in 0..200 {
                let key: i32 = rng.random();
                let step = secondary_hash(key, size);
                assert!((1..size).contains(&step), "key {key} size {size} step {step}");
            }
        }

        for key in [0, 1, -1, i32::MAX, i32::MIN] {
            assert_eq!(secondary_hash(key, 0), 1);
            assert_eq!(secondary_hash(key, 1), 1);
            assert_eq!(secondary_hash(key, 2), 1);
        }
    }

    #[test]
    fn chaining_has_no_probe_sequence() {
        assert!(ProbeSequence::new(Strategy::Chaining, 1, 7).is_none());
    }

    #[test]
    fn linear_sequence_visits_every_slot() {
        let seq = ProbeSequence::new(Strategy::LinearProbing, 10, 5).unwrap();
        assert_eq!(seq.home(), 4);
        assert_eq!(seq.collect::<Vec<_>>(), [4, 0, 1, 2, 3]);
    }

    #[test]
    fn quadratic_sequence_matches_closed_form() {
        for size in [3usize, 5, 7, 11, 16, 101] {
            for key in [1, 2, 99, -5] {
                let h = primary_hash(key, size);
                let seq = ProbeSequence::new(Strategy::QuadraticProbing, key, size).unwrap();
                let expected = (0..size).map(|i| (h + i + i * i) % size).collect::<Vec<_>>();
                assert_eq!(seq.collect::<Vec<_>>(), expected, "key {key} size {size}");
            }
        }
    }

    #[test]
    fn double_sequence_matches_closed_form() {
        for size in [3usize, 5, 7, 11, 16, 101] {
            for key in [1, 2, 99, -5] {
                let h = primary_hash(key, size);
                let h2 = secondary_hash(key, size);
                let seq = ProbeSequence::new(Strategy::DoubleHashing, key, size).unwrap();
                let expected = (0..size).map(|i| (h + i * h2) % size).collect::<Vec<_>>();
                assert_eq!(seq.collect::<Vec<_>>(), expected, "key {key} size {size}");
            }
        }
    }

    #[test]
    fn sequences_are_bounded_by_table_size() {
        for strategy in [
            Strategy::LinearProbing,
            Strategy::QuadraticProbing,
            Strategy::DoubleHashing,
        ] {
            let seq = ProbeSequence::new(strategy, 12345, 13).unwrap();
            assert_eq!(seq.len(), 13);
            assert_eq!(seq.count(), 13);
        }
    }
}
