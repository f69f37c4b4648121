//! Stratified train/test split

use crate::dataset::Dataset;
use pwstrength_core::{Error, Result, NUM_CLASSES};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

/// Split `dataset` into `(train, test)`, preserving class proportions
///
/// The test set holds `ceil(test_size * n)` rows. Rows are shared out to the
/// classes by largest remainder, and every class keeps at least one training
/// row.
pub fn train_test_split(dataset: &Dataset, test_size: f64, seed: u64) -> Result<(Dataset, Dataset)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(Error::config(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }
    let n = dataset.len();
    if n < 2 {
        return Err(Error::dataset(format!(
            "need at least 2 rows to split, got {}",
            n
        )));
    }

    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); NUM_CLASSES];
    for (i, label) in dataset.labels().iter().enumerate() {
        by_class[*label].push(i);
    }

    let n_test = ((test_size * n as f64).ceil() as usize).min(n - 1);
    let allocation = allocate_test_rows(&by_class, n_test, n);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);
    for (indices, take) in by_class.iter_mut().zip(allocation) {
        indices.shuffle(&mut rng);
        test.extend_from_slice(&indices[..take]);
        train.extend_from_slice(&indices[take..]);
    }
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    debug!("Split {} rows into {} train / {} test", n, train.len(), test.len());
    Ok((dataset.subset(&train), dataset.subset(&test)))
}

/// Per-class test counts summing to `n_test` (as far as class sizes allow)
fn allocate_test_rows(by_class: &[Vec<usize>], n_test: usize, n: usize) -> Vec<usize> {
    let quotas: Vec<f64> = by_class
        .iter()
        .map(|rows| n_test as f64 * rows.len() as f64 / n as f64)
        .collect();
    let caps: Vec<usize> = by_class
        .iter()
        .map(|rows| rows.len().saturating_sub(1))
        .collect();

    let mut allocation: Vec<usize> = quotas
        .iter()
        .zip(&caps)
        .map(|(quota, cap)| (quota.floor() as usize).min(*cap))
        .collect();

    let mut order: Vec<usize> = (0..by_class.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = quotas[a] - quotas[a].floor();
        let rb = quotas[b] - quotas[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });

    let mut remaining = n_test.saturating_sub(allocation.iter().sum());
    while remaining > 0 {
        let before = remaining;
        for &class in &order {
            if remaining == 0 {
                break;
            }
            if allocation[class] < caps[class] {
                allocation[class] += 1;
                remaining -= 1;
            }
        }
        if remaining == before {
            break;
        }
    }

    allocation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{build_dataset, generate_raw};
    use crate::features::FeatureExtractor;

    fn corpus() -> Dataset {
        build_dataset(&generate_raw(50, Some(42)), &FeatureExtractor::default())
    }

    #[test]
    fn test_stratified_proportions() {
        let (train, test) = train_test_split(&corpus(), 0.2, 42).unwrap();
        assert_eq!(test.len(), 200);
        assert_eq!(train.len(), 800);
        assert_eq!(test.class_counts(), [80, 60, 60]);
        assert_eq!(train.class_counts(), [320, 240, 240]);
    }

    #[test]
    fn test_split_is_deterministic() {
        let data = corpus();
        let a = train_test_split(&data, 0.2, 7).unwrap();
        let b = train_test_split(&data, 0.2, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rounding_up_test_size() {
        let extractor = FeatureExtractor::default();
        let data = build_dataset(&generate_raw(1, Some(0)), &extractor);
        // 20 rows: 8 weak, 6 medium, 6 strong; ceil(0.25 * 20) = 5
        let (train, test) = train_test_split(&data, 0.25, 0).unwrap();
        assert_eq!(test.len(), 5);
        assert_eq!(train.len(), 15);
        assert_eq!(test.class_counts().iter().sum::<usize>(), 5);
        assert_eq!(test.class_counts()[0], 2);
    }

    #[test]
    fn test_every_class_keeps_training_rows() {
        let data = Dataset::new(
            vec!["length".into()],
            vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]],
            vec![0, 0, 0, 2],
        )
        .unwrap();
        let (train, _) = train_test_split(&data, 0.5, 1).unwrap();
        assert_eq!(train.class_counts()[2], 1);
    }

    #[test]
    fn test_invalid_test_size() {
        let data = corpus();
        assert!(matches!(train_test_split(&data, 0.0, 1), Err(Error::Config(_))));
        assert!(matches!(train_test_split(&data, 1.0, 1), Err(Error::Config(_))));
    }
}
