//! Rank statistics shared by the RNA-map tester and the TCGA correlation table.

use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::function::erf::erfc;

/// Assign 1-based ranks with ties sharing their average rank.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j < order.len() && values[order[j]] == values[order[i]] {
            j += 1;
        }
        // positions i..j share ranks i+1 ..= j
        let avg = (i + 1 + j) as f64 / 2.0;
        for &k in &order[i..j] {
            ranks[k] = avg;
        }
        i = j;
    }
    ranks
}

fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / std::f64::consts::SQRT_2)
}

/// One-sided Mann-Whitney U test, alternative: `treatment` stochastically
/// greater than `control`. Normal approximation with tie-corrected variance;
/// degenerate inputs (empty group, all values tied) return p = 1.
pub fn mann_whitney_greater(treatment: &[f64], control: &[f64]) -> f64 {
    if treatment.is_empty() || control.is_empty() {
        return 1.0;
    }
    let n1 = treatment.len() as f64;
    let n2 = control.len() as f64;
    let n = n1 + n2;

    let mut all: Vec<f64> = Vec::with_capacity(treatment.len() + control.len());
    all.extend_from_slice(treatment);
    all.extend_from_slice(control);
    let ranks = average_ranks(&all);

    let r1: f64 = ranks[..treatment.len()].iter().sum();
    let u = r1 - n1 * (n1 + 1.0) / 2.0;

    // tie term: sum of t^3 - t over runs of tied values
    let mut sorted = all;
    sorted.sort_by(f64::total_cmp);
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        let t = (j - i) as f64;
        tie_term += t * t * t - t;
        i = j;
    }

    let mu = n1 * n2 / 2.0;
    let var = n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if var <= 0.0 {
        return 1.0;
    }
    let z = (u - mu) / var.sqrt();
    normal_sf(z)
}

/// Benjamini-Hochberg adjusted p-values, returned in input order.
pub fn benjamini_hochberg(p_values: &[f64]) -> Vec<f64> {
    let n = p_values.len();
    if n == 0 {
        return Vec::new();
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let mut adjusted = vec![0.0; n];
    let mut running = 1.0_f64;
    for (rank, &idx) in order.iter().enumerate().rev() {
        let q = (p_values[idx] * n as f64 / (rank + 1) as f64).min(1.0);
        running = running.min(q);
        adjusted[idx] = running;
    }
    adjusted
}

/// Spearman rank correlation with a Student-t approximation for the two-sided
/// p-value. Returns `None` for fewer than 3 paired observations or when either
/// side has zero rank variance.
pub fn spearman(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    if x.len() != y.len() || x.len() < 3 {
        return None;
    }
    let n = x.len() as f64;
    let rx = average_ranks(x);
    let ry = average_ranks(y);

    let mean = (n + 1.0) / 2.0;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in rx.iter().zip(ry.iter()) {
        cov += (a - mean) * (b - mean);
        var_x += (a - mean) * (a - mean);
        var_y += (b - mean) * (b - mean);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    let rho = (cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0);
    if rho.abs() >= 1.0 {
        return Some((rho, 0.0));
    }

    let t = rho * ((n - 2.0) / (1.0 - rho * rho)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, n - 2.0).ok()?;
    let p = 2.0 * (1.0 - dist.cdf(t.abs()));
    Some((rho, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_average_over_ties() {
        let ranks = average_ranks(&[1.0, 2.0, 2.0, 5.0]);
        assert_eq!(ranks, vec![1.0, 2.5, 2.5, 4.0]);
    }

    #[test]
    fn mann_whitney_matches_hand_value() {
        // treatment {3,4,5} vs control {1,2,2.5}: U = 9, z = 4.5/sqrt(5.25)
        let p = mann_whitney_greater(&[3.0, 4.0, 5.0], &[1.0, 2.0, 2.5]);
        assert!((p - 0.0248).abs() < 1e-3, "p = {}", p);

        // reversed direction must be far from significant
        let p_rev = mann_whitney_greater(&[1.0, 2.0, 2.5], &[3.0, 4.0, 5.0]);
        assert!(p_rev > 0.9, "p_rev = {}", p_rev);
    }

    #[test]
    fn mann_whitney_degenerate_is_one() {
        assert_eq!(mann_whitney_greater(&[], &[1.0]), 1.0);
        assert_eq!(mann_whitney_greater(&[2.0, 2.0], &[2.0, 2.0]), 1.0);
    }

    #[test]
    fn bh_matches_reference() {
        let adj = benjamini_hochberg(&[0.005, 0.1, 0.5]);
        assert!((adj[0] - 0.015).abs() < 1e-12);
        assert!((adj[1] - 0.15).abs() < 1e-12);
        assert!((adj[2] - 0.5).abs() < 1e-12);

        // equal raw p-values all collapse to the same adjusted value
        let adj = benjamini_hochberg(&[0.01, 0.02, 0.03, 0.04]);
        for q in &adj {
            assert!((q - 0.04).abs() < 1e-12);
        }
    }

    #[test]
    fn bh_is_monotone_and_capped() {
        let adj = benjamini_hochberg(&[0.9, 0.8, 0.01]);
        assert!(adj.iter().all(|&q| q <= 1.0));
        assert!(adj[2] < adj[1] && adj[1] <= adj[0]);
    }

    #[test]
    fn spearman_detects_monotone_association() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [2.0, 4.0, 5.0, 9.0, 11.0, 20.0];
        let (rho, p) = spearman(&x, &y).unwrap();
        assert!((rho - 1.0).abs() < 1e-12);
        assert_eq!(p, 0.0);

        let y_anti: Vec<f64> = y.iter().map(|v| -v).collect();
        let (rho, _) = spearman(&x, &y_anti).unwrap();
        assert!((rho + 1.0).abs() < 1e-12);
    }

    #[test]
    fn spearman_rejects_degenerate_input() {
        assert!(spearman(&[1.0, 2.0], &[1.0, 2.0]).is_none());
        assert!(spearman(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
    }
}
