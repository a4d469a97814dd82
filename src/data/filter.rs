use super::model::PeakSet;

// ---------------------------------------------------------------------------
// Moving-average smoothing
// ---------------------------------------------------------------------------

/// Centered moving average with a clipped window.
///
/// Sample `i` is replaced by the mean of the closed range
/// `[i - window_size / 2, i + window_size / 2]` intersected with the signal
/// bounds. The half-width uses integer division, so an even `window_size`
/// covers `window_size + 1` samples and an odd one covers `window_size`.
/// Near the edges the window shrinks instead of padding; it always contains
/// at least sample `i` itself.
pub fn moving_average(signal: &[f64], window_size: usize) -> Vec<f64> {
    let half = window_size / 2;
    let last = signal.len().saturating_sub(1);

    (0..signal.len())
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half).min(last);
            let window = &signal[start..=end];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Peak detection
// ---------------------------------------------------------------------------

/// Interior strict local maxima above `threshold`.
///
/// Index `i` qualifies when `1 <= i <= n - 2` and the value is strictly
/// greater than both neighbours and than `threshold`. Plateaus never
/// qualify. Signals shorter than three samples have no peaks.
pub fn find_peaks(filtered: &[f64], threshold: f64) -> PeakSet {
    filtered
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > w[0] && w[1] > w[2] && w[1] > threshold)
        .map(|(i, _)| i + 1)
        .collect()
}
