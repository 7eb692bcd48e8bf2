//! Project-wide exports for easy access.

pub use crate::error::{Error, Result};
pub use crate::settings::*;
pub use crate::util::*;
pub use realfft::num_complex::Complex;
pub use std::f64::consts::{PI, TAU};
