//! The two randomization primitives the assignment is built from.

use rand::Rng;
use rand::seq::{SliceRandom, index};

/// Full Fisher-Yates shuffle, returning the shuffled vector.
pub fn shuffled<T>(mut items: Vec<T>, rng: &mut impl Rng) -> Vec<T> {
    items.shuffle(rng);
    items
}

/// Draw `amount` distinct elements in random order.
/// Returns `None` when the slice holds fewer than `amount` elements.
pub fn sample_without_replacement<T: Clone>(
    items: &[T],
    amount: usize,
    rng: &mut impl Rng,
) -> Option<Vec<T>> {
    if amount > items.len() {
        return None;
    }
    Some(
        index::sample(rng, items.len(), amount)
            .into_iter()
            .map(|i| items[i].clone())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::HashSet;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let items: Vec<u32> = (0..50).collect();
        let mut out = shuffled(items.clone(), &mut rng());
        assert_ne!(out, items, "50 elements should not stay in order");
        out.sort();
        assert_eq!(out, items);
    }

    #[test]
    fn test_sample_distinct() {
        let items: Vec<u32> = (0..60).collect();
        let sample = sample_without_replacement(&items, 12, &mut rng()).unwrap();
        assert_eq!(sample.len(), 12);
        let unique: HashSet<_> = sample.iter().collect();
        assert_eq!(unique.len(), 12);
    }

    #[test]
    fn test_sample_too_many() {
        let items = vec![1, 2, 3];
        assert!(sample_without_replacement(&items, 4, &mut rng()).is_none());
        assert_eq!(
            sample_without_replacement(&items, 3, &mut rng()).unwrap().len(),
            3
        );
    }

    #[test]
    fn test_same_seed_same_result() {
        let items: Vec<u32> = (0..30).collect();
        let a = sample_without_replacement(&items, 10, &mut rng());
        let b = sample_without_replacement(&items, 10, &mut rng());
        assert_eq!(a, b);
    }
}
