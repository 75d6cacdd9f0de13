// src/analysis/peak_finder.rs
//
// Constrained local-maximum detection over a 1-D signal.
//
// Stages, in order:
//   1. local maxima: samples strictly above both neighbours. A flat top is
//      one maximum (at its middle sample) when both sides drop away.
//   2. distance: when two maxima are closer than `distance` samples the
//      higher one wins, and of two equal maxima the later one. Resolved
//      greedily from the highest peak down, which leaves no remaining
//      violations.
//   3. prominence: height above the higher of the two bases, where each base
//      is the lowest sample between the peak and the next strictly higher
//      sample (or the signal edge) on that side.

#[derive(Debug, Clone, Copy)]
pub struct PeakConstraints {
    /// Minimum index gap between accepted maxima (values < 1 behave as 1)
    pub distance: usize,
    pub prominence: f64,
}

/// Indices of all local maxima, ascending.
pub fn local_maxima(signal: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if signal.len() < 3 {
        return peaks;
    }

    let last = signal.len() - 1;
    let mut i = 1;
    while i < last {
        if signal[i - 1] < signal[i] {
            // Walk across a possible plateau
            let mut ahead = i + 1;
            while ahead < last && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                let left_edge = i;
                let right_edge = ahead - 1;
                peaks.push((left_edge + right_edge) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    peaks
}

/// Drop maxima closer than `distance` to a higher one. Ties keep the
/// later peak.
pub fn select_by_distance(signal: &[f64], peaks: &[usize], distance: usize) -> Vec<usize> {
    if distance <= 1 || peaks.len() < 2 {
        return peaks.to_vec();
    }

    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| {
        signal[peaks[b]]
            .partial_cmp(&signal[peaks[a]])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.cmp(&a))
    });

    let mut keep = vec![true; peaks.len()];
    for &i in &order {
        if !keep[i] {
            continue;
        }
        let mut j = i;
        while j > 0 && peaks[i] - peaks[j - 1] < distance {
            j -= 1;
            keep[j] = false;
        }
        let mut j = i + 1;
        while j < peaks.len() && peaks[j] - peaks[i] < distance {
            keep[j] = false;
            j += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, k)| k.then_some(p))
        .collect()
}

/// Prominence of the sample at `peak`.
pub fn prominence(signal: &[f64], peak: usize) -> f64 {
    let height = signal[peak];

    let mut left_base = height;
    for &v in signal[..peak].iter().rev() {
        if v > height {
            break;
        }
        left_base = left_base.min(v);
    }

    let mut right_base = height;
    for &v in &signal[peak + 1..] {
        if v > height {
            break;
        }
        right_base = right_base.min(v);
    }

    height - left_base.max(right_base)
}

/// Full detection: local maxima → distance → prominence.
pub fn find_peaks(signal: &[f64], constraints: PeakConstraints) -> Vec<usize> {
    let maxima = local_maxima(signal);
    let spaced = select_by_distance(signal, &maxima, constraints.distance);
    spaced
        .into_iter()
        .filter(|&p| prominence(signal, p) >= constraints.prominence)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_maxima_strict_and_plateau() {
        let signal = [0.0, 1.0, 0.0, 2.0, 2.0, 2.0, 0.0, 1.0, 1.0];
        // Index 1 is a strict peak, 3..=5 a plateau (middle = 4).
        // The trailing 1.0, 1.0 runs into the edge and is not a peak.
        assert_eq!(local_maxima(&signal), vec![1, 4]);
    }

    #[test]
    fn test_edges_are_never_peaks() {
        assert_eq!(local_maxima(&[5.0, 1.0, 0.0, 1.0, 5.0]), Vec::<usize>::new());
        assert!(local_maxima(&[1.0, 2.0]).is_empty());
    }

    #[test]
    fn test_distance_keeps_higher_peak() {
        let signal = [0.0, 1.0, 0.0, 3.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 1.5, 0.0];
        let maxima = local_maxima(&signal);
        assert_eq!(maxima, vec![1, 3, 5, 10]);
        assert_eq!(select_by_distance(&signal, &maxima, 4), vec![3, 10]);
    }

    #[test]
    fn test_distance_tie_keeps_later() {
        let signal = [0.0, 1.0, 0.0, 1.0, 0.0];
        assert_eq!(select_by_distance(&signal, &[1, 3], 3), vec![3]);
    }

    #[test]
    fn test_equal_bounce_bottoms_resolve_to_later_sample() {
        // Integer pixel rows give exact ties like 780/779/780 at a bottom.
        let mut signal = vec![0.0, 0.2, 1.0, 0.9, 1.0, 0.2];
        signal.extend(std::iter::repeat(0.0).take(10));
        let constraints = PeakConstraints {
            distance: 10,
            prominence: 0.1,
        };
        assert_eq!(find_peaks(&signal, constraints), vec![4]);
    }

    #[test]
    fn test_prominence_uses_higher_base() {
        // Peak at 3 (height 4): left base 1 (stops at 5), right base 0.
        let signal = [0.0, 5.0, 1.0, 4.0, 2.0, 0.0];
        assert!((prominence(&signal, 3) - 3.0).abs() < 1e-12);
        // Global maximum: bases run to the edges.
        assert!((prominence(&signal, 1) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_find_peaks_filters_small_bumps() {
        let signal = [0.0, 0.5, 0.0, 0.05, 0.0, 0.6, 0.0];
        let constraints = PeakConstraints {
            distance: 1,
            prominence: 0.1,
        };
        assert_eq!(find_peaks(&signal, constraints), vec![1, 5]);
    }

    #[test]
    fn test_find_peaks_is_deterministic() {
        let signal: Vec<f64> = (0..200)
            .map(|i| ((i as f64) * 0.3).sin() + 0.1 * ((i as f64) * 1.7).cos())
            .collect();
        let constraints = PeakConstraints {
            distance: 10,
            prominence: 0.1,
        };
        let first = find_peaks(&signal, constraints);
        for _ in 0..5 {
            assert_eq!(find_peaks(&signal, constraints), first);
        }
        for pair in first.windows(2) {
            assert!(pair[1] - pair[0] >= 10);
        }
    }
}
