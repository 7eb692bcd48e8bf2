//! Global utility functions, publicly re-exported in `prelude.rs`.

pub mod general;
pub mod window;

pub use general::*;
pub use window::{hann, hann_in_place, multiply_buffers};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_to_db() {
        assert!(pow2db(0.0).is_nan());
        assert!(pow2db(-3.0).is_nan());
        assert!(within_tolerance(pow2db(1.0), 0.0, f64::EPSILON));
        assert!(within_tolerance(pow2db(100.0), 20.0, 1e-12));
        assert!(within_tolerance(pow2db(0.5), -3.010_299_956_639_812, 1e-12));
    }

    #[test]
    fn test_power_to_db_in_place() {
        let mut powers = [0.0, 1.0, 10.0, -1.0];
        pow2db_in_place(&mut powers);

        assert!(powers[0].is_nan());
        assert!(within_tolerance(powers[1], 0.0, f64::EPSILON));
        assert!(within_tolerance(powers[2], 10.0, 1e-12));
        assert!(powers[3].is_nan());
    }

    #[test]
    fn test_median() {
        assert!(within_tolerance(median(&[3.0, 1.0, 2.0]), 2.0, f64::EPSILON));
        assert!(within_tolerance(median(&[4.0, 1.0, 2.0, 3.0]), 2.5, f64::EPSILON));
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_fft_len() {
        assert_eq!(fft_len(1280, 0).unwrap(), 2048);
        assert_eq!(fft_len(512, 0).unwrap(), 512);
        assert_eq!(fft_len(512, 600).unwrap(), 1024);
        assert_eq!(fft_len(300, 100).unwrap(), 512);
    }

    #[test]
    fn test_fft_len_overflow() {
        assert!(fft_len(16, usize::MAX).is_err());
        assert!(fft_len(16, (usize::MAX >> 1) + 2).is_err());
        assert_eq!(fft_len(16, 1 << 20).unwrap(), 1 << 20);
    }
}
