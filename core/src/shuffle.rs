use rand::Rng;

/// In-place Fisher-Yates shuffle.
///
/// Walks from the last element down to the second, swapping each position `i` with a uniformly drawn `j` in
/// `[0, i]`. With an unbiased source every permutation is equally likely.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::vec::Vec;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn shuffle_keeps_every_element() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut items: Vec<u16> = (0..100).collect();

        shuffle(&mut items, &mut rng);

        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..100).collect::<Vec<u16>>());
    }

    #[test]
    fn shuffle_handles_short_inputs() {
        let mut rng = SmallRng::seed_from_u64(7);

        let mut empty: [u8; 0] = [];
        shuffle(&mut empty, &mut rng);

        let mut single = [42];
        shuffle(&mut single, &mut rng);
        assert_eq!(single, [42]);
    }

    #[test]
    fn shuffle_is_close_to_uniform_over_permutations() {
        const ROUNDS: u32 = 24_000;
        // chi-square critical value for 23 degrees of freedom at p = 0.001
        const CRITICAL: f64 = 49.73;

        let mut rng = SmallRng::seed_from_u64(0x5eed);
        let mut seen: BTreeMap<[u8; 4], u32> = BTreeMap::new();
        for _ in 0..ROUNDS {
            let mut items = [0u8, 1, 2, 3];
            shuffle(&mut items, &mut rng);
            *seen.entry(items).or_default() += 1;
        }

        assert_eq!(seen.len(), 24, "every permutation should show up");

        let expected = f64::from(ROUNDS) / 24.0;
        let chi_square: f64 = seen
            .values()
            .map(|&observed| {
                let diff = f64::from(observed) - expected;
                diff * diff / expected
            })
            .sum();
        assert!(chi_square < CRITICAL, "chi-square too high: {chi_square}");
    }

    #[test]
    fn shuffle_spreads_each_element_over_all_positions() {
        const ROUNDS: u32 = 10_000;

        let mut rng = SmallRng::seed_from_u64(99);
        let mut positions = [[0u32; 5]; 5];
        for _ in 0..ROUNDS {
            let mut items = [0usize, 1, 2, 3, 4];
            shuffle(&mut items, &mut rng);
            for (pos, &item) in items.iter().enumerate() {
                positions[item][pos] += 1;
            }
        }

        // expected 2000 per slot, allow a generous margin
        for row in positions {
            for count in row {
                assert!((1700..2300).contains(&count), "skewed position count {count}");
            }
        }
    }
}
