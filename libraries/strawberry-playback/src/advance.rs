//! Advance policy
//!
//! Pure index selection shared by manual "next" and automatic end-of-track.
//! Nothing in here touches playback intent; callers decide whether the
//! selected index plays or stops.

use rand::Rng;

/// Pick the index that follows `current` in a catalog of `len` tracks
///
/// - Sequential: `(current + 1) % len`
/// - Shuffled: uniformly random index, never `current` when `len > 1`
///
/// Returns `None` for an empty catalog.
pub fn next_index<R: Rng + ?Sized>(
    current: usize,
    len: usize,
    shuffled: bool,
    rng: &mut R,
) -> Option<usize> {
    if len == 0 {
        return None;
    }

    if !shuffled {
        return Some((current + 1) % len);
    }

    if len == 1 {
        return Some(0);
    }

    // Retry until different; expected attempts stay below 2 for len >= 2
    loop {
        let candidate = rng.gen_range(0..len);
        if candidate != current {
            return Some(candidate);
        }
    }
}

/// Index before `current`, wrapping from the first track to the last
pub fn previous_index(current: usize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some((current % len + len - 1) % len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn sequential_wraps() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(next_index(0, 3, false, &mut rng), Some(1));
        assert_eq!(next_index(1, 3, false, &mut rng), Some(2));
        assert_eq!(next_index(2, 3, false, &mut rng), Some(0));
    }

    #[test]
    fn empty_catalog_has_no_next() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(next_index(0, 0, false, &mut rng), None);
        assert_eq!(next_index(0, 0, true, &mut rng), None);
        assert_eq!(previous_index(0, 0), None);
    }

    #[test]
    fn single_track_returns_itself() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(next_index(0, 1, false, &mut rng), Some(0));
        for _ in 0..50 {
            assert_eq!(next_index(0, 1, true, &mut rng), Some(0));
        }
    }

    #[test]
    fn shuffle_never_repeats_current() {
        let mut rng = StdRng::seed_from_u64(42);
        for current in 0..5 {
            for _ in 0..200 {
                let next = next_index(current, 5, true, &mut rng).unwrap();
                assert_ne!(next, current);
                assert!(next < 5);
            }
        }
    }

    #[test]
    fn shuffle_reaches_every_other_index() {
        let mut rng = StdRng::seed_from_u64(3);
        let seen: HashSet<usize> = (0..500)
            .map(|_| next_index(2, 6, true, &mut rng).unwrap())
            .collect();
        assert_eq!(seen, HashSet::from([0, 1, 3, 4, 5]));
    }

    #[test]
    fn previous_wraps_to_last() {
        assert_eq!(previous_index(0, 4), Some(3));
        assert_eq!(previous_index(3, 4), Some(2));
        assert_eq!(previous_index(0, 1), Some(0));
    }
}
