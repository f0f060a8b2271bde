//! Window Functions

use std::f64::consts::PI;

/// Hann window coefficients `0.5 * (1 - cos(2*pi*i / (N-1)))`
pub fn hann_window(len: usize) -> Vec<f64> {
    if len < 2 {
        return vec![1.0; len];
    }
    let denom = (len - 1) as f64;
    (0..len)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_endpoints_and_peak() {
        let w = hann_window(9);
        assert!(w[0].abs() < 1e-12);
        assert!(w[8].abs() < 1e-12);
        assert!((w[4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hann_symmetric() {
        let w = hann_window(64);
        for i in 0..32 {
            assert!((w[i] - w[63 - i]).abs() < 1e-12);
        }
    }
}
