//! Quantile-based matching of the non-regulated pool to a treatment group's
//! baseline PSI distribution.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::error::AnalysisError;

/// Empirical quantile with linear interpolation between order statistics
/// (the standard continuous estimator). `sorted` must be ascending.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = h - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Resample `pool` to mimic the score distribution of `target_scores`.
///
/// The pool is partitioned at the target's empirical quantiles (cut
/// probabilities supplied by the caller; bin i holds scores in
/// `[cut[i], cut[i+1])`, the last bin closed on both ends) and
/// `target_size / n_bins` members are drawn from each bin without
/// replacement. The floor division can return fewer than `target_size`
/// elements in total; that shortfall is intentional and kept. A bin that
/// cannot supply its draw fails with `InsufficientPool` naming the bin.
///
/// Each bin draws from its own random stream derived from `seed`, so the
/// selection is byte-identical across runs and independent of evaluation
/// order.
pub fn match_controls(
    pool: &[(String, f64)],
    target_scores: &[f64],
    cutpoints: &[f64],
    target_size: usize,
    seed: u64,
) -> Result<Vec<(String, f64)>, AnalysisError> {
    if cutpoints.len() < 2 || target_scores.is_empty() {
        return Ok(Vec::new());
    }

    let mut sorted = target_scores.to_vec();
    sorted.sort_by(f64::total_cmp);
    let cuts: Vec<f64> = cutpoints.iter().map(|&p| quantile(&sorted, p)).collect();

    let n_bins = cuts.len() - 1;
    let per_bin = target_size / n_bins;

    // Pool members outside the target's score range fall in no bin.
    let mut bins: Vec<Vec<usize>> = vec![Vec::new(); n_bins];
    for (idx, (_, score)) in pool.iter().enumerate() {
        for i in 0..n_bins {
            let last = i == n_bins - 1;
            let below_upper = if last {
                *score <= cuts[i + 1]
            } else {
                *score < cuts[i + 1]
            };
            if *score >= cuts[i] && below_upper {
                bins[i].push(idx);
                break;
            }
        }
    }

    let mut selected: Vec<usize> = Vec::with_capacity(per_bin * n_bins);
    for (i, members) in bins.iter().enumerate() {
        if members.len() < per_bin {
            return Err(AnalysisError::InsufficientPool {
                bin: i,
                requested: per_bin,
                available: members.len(),
            });
        }
        debug!(
            "bin {}: drawing {} of {} pool members in [{:.4}, {:.4}]",
            i,
            per_bin,
            members.len(),
            cuts[i],
            cuts[i + 1]
        );

        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
        let mut picks: Vec<usize> = rand::seq::index::sample(&mut rng, members.len(), per_bin)
            .into_iter()
            .map(|k| members[k])
            .collect();
        picks.sort_unstable();
        selected.extend(picks);
    }

    Ok(selected.into_iter().map(|i| pool[i].clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_pool(n: usize) -> Vec<(String, f64)> {
        (0..n)
            .map(|i| (format!("ctrl{}", i), i as f64 / (n - 1) as f64))
            .collect()
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let sorted = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(quantile(&sorted, 0.0), 0.0);
        assert_eq!(quantile(&sorted, 1.0), 3.0);
        assert_eq!(quantile(&sorted, 0.5), 1.5);
    }

    #[test]
    fn draws_equal_counts_per_bin() {
        let pool = uniform_pool(20);
        let target: Vec<f64> = (0..20).map(|i| i as f64 / 19.0).collect();
        let matched = match_controls(&pool, &target, &[0.0, 0.5, 1.0], 10, 7).unwrap();
        assert_eq!(matched.len(), 10);

        let mut sorted = target.clone();
        sorted.sort_by(f64::total_cmp);
        let median = quantile(&sorted, 0.5);
        let lower = matched.iter().filter(|(_, s)| *s < median).count();
        assert_eq!(lower, 5);
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        let pool = uniform_pool(40);
        let target: Vec<f64> = (0..25).map(|i| i as f64 / 24.0).collect();
        let cuts = [0.0, 0.25, 0.5, 0.75, 1.0];
        let a = match_controls(&pool, &target, &cuts, 20, 99).unwrap();
        let b = match_controls(&pool, &target, &cuts, 20, 99).unwrap();
        assert_eq!(a, b);

        let c = match_controls(&pool, &target, &cuts, 20, 100).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn never_repeats_a_pool_member() {
        let pool = uniform_pool(30);
        let target: Vec<f64> = (0..30).map(|i| i as f64 / 29.0).collect();
        let matched = match_controls(&pool, &target, &[0.0, 0.5, 1.0], 20, 3).unwrap();
        let mut ids: Vec<&str> = matched.iter().map(|(id, _)| id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), matched.len());
    }

    #[test]
    fn floor_division_shortfall_is_kept() {
        let pool = uniform_pool(60);
        let target: Vec<f64> = (0..30).map(|i| i as f64 / 29.0).collect();
        // 10 / 3 bins -> 3 per bin, 9 in total
        let matched =
            match_controls(&pool, &target, &[0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0], 10, 11).unwrap();
        assert_eq!(matched.len(), 9);
    }

    #[test]
    fn starved_bin_fails_with_its_index() {
        // upper half of the score range holds only 3 pool members
        let mut pool = uniform_pool(20);
        pool.retain(|(_, s)| *s < 0.5);
        pool.push(("hi1".into(), 0.6));
        pool.push(("hi2".into(), 0.7));
        pool.push(("hi3".into(), 0.8));

        let target: Vec<f64> = (0..20).map(|i| i as f64 / 19.0).collect();
        let err = match_controls(&pool, &target, &[0.0, 0.5, 1.0], 10, 5).unwrap_err();
        match err {
            AnalysisError::InsufficientPool {
                bin,
                requested,
                available,
            } => {
                assert_eq!(bin, 1);
                assert_eq!(requested, 5);
                assert_eq!(available, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
