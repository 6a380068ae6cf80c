//! Time-domain YIN pitch estimation, one frame at a time.

/// CMNDF trough threshold. Lags whose normalized difference drops below
/// this are accepted as periodic.
const TROUGH_THRESHOLD: f64 = 0.1;

/// Estimate the fundamental frequency of one frame, restricted to
/// `[fmin_hz, fmax_hz]`.
///
/// Convention for frames without a clear trough: the lag of the global
/// CMNDF minimum inside the band is used, so every frame yields an
/// estimate within the band and the caller can average over all frames.
/// Returns `None` only when the band maps to an empty lag range for this
/// frame and sample rate.
pub(crate) fn yin_frame(
    frame: &[f32],
    sample_rate_hz: u32,
    fmin_hz: f32,
    fmax_hz: f32,
) -> Option<f32> {
    let window = frame.len() / 2;
    let (tau_min, tau_max) = lag_bounds(window, frame.len(), sample_rate_hz, fmin_hz, fmax_hz)?;

    // Squared difference function d(tau) over the first half-window.
    let mut diff = vec![0.0f64; tau_max + 1];
    for (tau, d) in diff.iter_mut().enumerate().skip(1) {
        let mut acc = 0.0f64;
        for j in 0..window {
            let delta = f64::from(frame[j]) - f64::from(frame[j + tau]);
            acc += delta * delta;
        }
        *d = acc;
    }

    // Cumulative mean normalized difference.
    let mut cmndf = vec![1.0f64; tau_max + 1];
    let mut running_sum = 0.0f64;
    for tau in 1..=tau_max {
        running_sum += diff[tau];
        cmndf[tau] = if running_sum > 0.0 {
            diff[tau] * tau as f64 / running_sum
        } else {
            1.0
        };
    }

    let mut tau = first_trough(&cmndf, tau_min, tau_max).unwrap_or_else(|| {
        // No trough below threshold: take the in-band global minimum.
        (tau_min..=tau_max)
            .min_by(|&a, &b| cmndf[a].partial_cmp(&cmndf[b]).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap_or(tau_min)
    });

    // Walk down to the local minimum before interpolating.
    while tau + 1 <= tau_max && cmndf[tau + 1] < cmndf[tau] {
        tau += 1;
    }

    let refined = parabolic_interpolation(&cmndf, tau);
    let pitch = f64::from(sample_rate_hz) / refined;
    Some((pitch as f32).clamp(fmin_hz, fmax_hz))
}

/// Map the frequency band to an inclusive lag range, bounded so the
/// difference function never reads past the frame.
pub(crate) fn lag_bounds(
    window: usize,
    frame_len: usize,
    sample_rate_hz: u32,
    fmin_hz: f32,
    fmax_hz: f32,
) -> Option<(usize, usize)> {
    if window == 0 || sample_rate_hz == 0 || fmin_hz <= 0.0 || fmax_hz <= fmin_hz {
        return None;
    }
    let sr = f64::from(sample_rate_hz);
    let tau_min = ((sr / f64::from(fmax_hz)).floor() as usize).max(1);
    let tau_max = ((sr / f64::from(fmin_hz)).ceil() as usize).min(frame_len - window - 1);
    if tau_min >= tau_max {
        return None;
    }
    Some((tau_min, tau_max))
}

fn first_trough(cmndf: &[f64], tau_min: usize, tau_max: usize) -> Option<usize> {
    (tau_min..=tau_max).find(|&tau| cmndf[tau] < TROUGH_THRESHOLD)
}

fn parabolic_interpolation(cmndf: &[f64], tau: usize) -> f64 {
    if tau == 0 || tau + 1 >= cmndf.len() {
        return tau as f64;
    }
    let a = cmndf[tau - 1];
    let b = cmndf[tau];
    let c = cmndf[tau + 1];
    let denom = a - 2.0 * b + c;
    if denom.abs() < f64::EPSILON {
        return tau as f64;
    }
    tau as f64 + 0.5 * (a - c) / denom
}
