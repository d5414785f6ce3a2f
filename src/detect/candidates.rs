use crate::surface::PowerSurface;

/// Two-pass candidate filter.
///
/// Pass A keeps candidates whose power reaches the per-frequency threshold and
/// whose frequency lies inside `peak_freqs` (inclusive). Pass B resolves
/// temporal near-duplicates: peaks closer than the event gap are treated as one
/// underlying burst detected at several nearby maxima.
///
/// Pass B is deliberately per-candidate, not a connected-components merge.
/// Each candidate forms its own cluster of everything within
/// `event_gap_samples` of it (inclusive, absolute time-index distance) and is
/// excluded iff its time index is not the cluster's winner. Chains of
/// candidates spaced just under the gap can therefore resolve differently than
/// a transitive merge would; that grouping is intentional and must not be
/// "fixed" into a transitive closure.
///
/// Finally, anything inside the first second of data is dropped outright, for
/// the same edge-artifact reason the threshold baseline skips it. Survivors
/// are returned in ascending time order.
pub fn filter_candidates(
    candidates: &[(usize, usize)],
    surface: &PowerSurface,
    thresholds: &[f64],
    peak_freqs: (f64, f64),
    event_gap_samples: usize,
) -> Vec<(usize, usize)> {
    let accepted: Vec<(usize, usize)> = candidates
        .iter()
        .copied()
        .filter(|&(fi, ti)| {
            let f0 = surface.f0s[fi];
            surface.power[fi][ti] >= thresholds[fi] && f0 >= peak_freqs.0 && f0 <= peak_freqs.1
        })
        .collect();
    log::debug!(
        "Pass A kept {} of {} candidates (threshold + {}..{} Hz band)",
        accepted.len(),
        candidates.len(),
        peak_freqs.0,
        peak_freqs.1
    );

    let mut kept: Vec<(usize, usize)> = accepted
        .iter()
        .copied()
        .filter(|&(_, ti)| cluster_winner(&accepted, surface, event_gap_samples, ti) == ti)
        .filter(|&(_, ti)| ti >= surface.sample_rate as usize)
        .collect();
    kept.sort_by_key(|&(fi, ti)| (ti, fi));
    log::debug!("Pass B kept {} events", kept.len());
    kept
}

/// Winning time index of the cluster formed around `ti`: the member column
/// whose frequency-wise maximum power is largest. Ties go to the earliest
/// cluster member encountered.
fn cluster_winner(
    accepted: &[(usize, usize)],
    surface: &PowerSurface,
    event_gap_samples: usize,
    ti: usize,
) -> usize {
    let mut best_t = ti;
    let mut best_power = f64::NEG_INFINITY;
    for &(_, tj) in accepted {
        if ti.abs_diff(tj) <= event_gap_samples {
            let column_power = surface.column_max(tj);
            if column_power > best_power {
                best_power = column_power;
                best_t = tj;
            }
        }
    }
    best_t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(power: Vec<Vec<f64>>, f0s: Vec<f64>, sample_rate: u32) -> PowerSurface {
        PowerSurface::new(power, f0s, sample_rate).unwrap()
    }

    /// 3 frequency rows at 10/20/30 Hz, zero power, 1 Hz sample rate so the
    /// first-second cutoff only removes index 0.
    fn zero_surface(n_times: usize) -> PowerSurface {
        surface(vec![vec![0.0; n_times]; 3], vec![10.0, 20.0, 30.0], 1)
    }

    #[test]
    fn test_threshold_acceptance() {
        let mut s = zero_surface(10);
        s.power[1][4] = 5.0;
        s.power[1][7] = 1.0;
        let thresholds = vec![2.0, 2.0, 2.0];
        let kept = filter_candidates(&[(1, 4), (1, 7)], &s, &thresholds, (0.0, 100.0), 0);
        assert_eq!(kept, vec![(1, 4)], "sub-threshold candidate must be dropped");
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut s = zero_surface(10);
        s.power[1][4] = 2.0;
        let kept = filter_candidates(&[(1, 4)], &s, &[2.0, 2.0, 2.0], (0.0, 100.0), 0);
        assert_eq!(kept, vec![(1, 4)]);
    }

    #[test]
    fn test_frequency_band_acceptance() {
        let mut s = zero_surface(10);
        s.power[0][4] = 9.0;
        s.power[1][6] = 9.0;
        s.power[2][8] = 9.0;
        let thresholds = vec![0.5, 0.5, 0.5];
        // band [20, 30] keeps rows 1 and 2, both bounds inclusive
        let kept = filter_candidates(&[(0, 4), (1, 6), (2, 8)], &s, &thresholds, (20.0, 30.0), 0);
        assert_eq!(kept, vec![(1, 6), (2, 8)]);
    }

    #[test]
    fn test_cluster_keeps_column_max_winner() {
        // Three candidates within one gap of each other; the middle column has
        // the largest column-wise max, so exactly the middle one survives.
        let mut s = zero_surface(20);
        s.power[0][5] = 3.0;
        s.power[1][7] = 8.0;
        s.power[2][9] = 4.0;
        let thresholds = vec![1.0; 3];
        let kept = filter_candidates(&[(0, 5), (1, 7), (2, 9)], &s, &thresholds, (0.0, 100.0), 4);
        assert_eq!(kept, vec![(1, 7)], "only the cluster's power maximizer survives");
    }

    #[test]
    fn test_candidates_at_winning_column_all_survive() {
        // Two candidates share the winning time index; neither is excluded.
        let mut s = zero_surface(20);
        s.power[0][6] = 5.0;
        s.power[2][6] = 7.0;
        s.power[1][8] = 2.0;
        let thresholds = vec![1.0; 3];
        let kept = filter_candidates(&[(0, 6), (2, 6), (1, 8)], &s, &thresholds, (0.0, 100.0), 4);
        assert_eq!(kept, vec![(0, 6), (2, 6)]);
    }

    #[test]
    fn test_gap_is_inclusive_and_symmetric() {
        let mut s = zero_surface(20);
        s.power[0][5] = 3.0;
        s.power[1][9] = 8.0;
        let thresholds = vec![1.0; 3];
        // distance 4 == gap: still one cluster, weaker candidate excluded
        let kept = filter_candidates(&[(0, 5), (1, 9)], &s, &thresholds, (0.0, 100.0), 4);
        assert_eq!(kept, vec![(1, 9)]);
        // distance 4 > gap 3: independent events, both survive
        let kept = filter_candidates(&[(0, 5), (1, 9)], &s, &thresholds, (0.0, 100.0), 3);
        assert_eq!(kept, vec![(0, 5), (1, 9)]);
    }

    #[test]
    fn test_per_candidate_clusters_are_not_transitive() {
        // Chain at t = 4, 8, 12 with gap 4: every candidate sees the t=8
        // column (largest) in its own cluster, so only t=8 survives even
        // though 4 and 12 never see each other.
        let mut s = zero_surface(20);
        s.power[0][4] = 3.0;
        s.power[1][8] = 9.0;
        s.power[2][12] = 5.0;
        let thresholds = vec![1.0; 3];
        let kept = filter_candidates(
            &[(0, 4), (1, 8), (2, 12)],
            &s,
            &thresholds,
            (0.0, 100.0),
            4,
        );
        assert_eq!(kept, vec![(1, 8)]);

        // Same chain but the ends are the strong columns: the middle candidate
        // loses to t=4 inside its own cluster, while the ends each win their
        // own cluster. A transitive merge would have kept a single event.
        let mut s = zero_surface(20);
        s.power[0][4] = 9.0;
        s.power[1][8] = 3.0;
        s.power[2][12] = 8.0;
        let kept = filter_candidates(
            &[(0, 4), (1, 8), (2, 12)],
            &s,
            &thresholds,
            (0.0, 100.0),
            4,
        );
        assert_eq!(kept, vec![(0, 4), (2, 12)]);
    }

    #[test]
    fn test_first_second_always_excluded() {
        // sample_rate 5: indices 0..4 are inside the first second
        let mut s = surface(vec![vec![0.0; 12]; 3], vec![10.0, 20.0, 30.0], 5);
        s.power[1][3] = 100.0;
        s.power[1][9] = 4.0;
        let thresholds = vec![1.0; 3];
        let kept = filter_candidates(&[(1, 3), (1, 9)], &s, &thresholds, (0.0, 100.0), 0);
        assert_eq!(kept, vec![(1, 9)], "power never rescues a first-second candidate");
    }

    #[test]
    fn test_survivors_sorted_by_time() {
        let mut s = zero_surface(30);
        s.power[2][25] = 5.0;
        s.power[0][10] = 5.0;
        s.power[1][18] = 5.0;
        let thresholds = vec![1.0; 3];
        let kept = filter_candidates(
            &[(2, 25), (0, 10), (1, 18)],
            &s,
            &thresholds,
            (0.0, 100.0),
            2,
        );
        assert_eq!(kept, vec![(0, 10), (1, 18), (2, 25)]);
    }

    #[test]
    fn test_empty_input() {
        let s = zero_surface(10);
        let kept = filter_candidates(&[], &s, &[1.0; 3], (0.0, 100.0), 4);
        assert!(kept.is_empty());
    }
}
