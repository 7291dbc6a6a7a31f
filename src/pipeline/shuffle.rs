use rand::Rng;

/// In-place Fisher–Yates shuffle.
pub fn fisher_yates<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Returns a randomly permuted copy, leaving `items` untouched.
pub fn shuffled<T: Clone>(items: &[T]) -> Vec<T> {
    let mut copy = items.to_vec();
    fisher_yates(&mut copy, &mut rand::rng());
    copy
}
