//! Baseband line coding schemes
//!
//! Each scheme maps a bit sequence to a waveform of `+1.0`/`-1.0` levels sampled at a fixed rate,
//! with every bit occupying a signaling interval of `bit_duration` seconds.

use serde::{Deserialize, Serialize};

use crate::{Bit, Error, Waveform};

/// Enumeration of line coding schemes
#[derive(Clone, Eq, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub enum EncodingKind {
    /// Non-return-to-zero: a constant level per bit
    Nrz,
    /// Manchester: a mid-bit transition per bit, high-to-low for `Zero`
    Manchester,
    /// Differential Manchester: a transition at the bit boundary encodes `Zero`
    DifferentialManchester,
}

impl std::fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nrz => write!(f, "NRZ"),
            Self::Manchester => write!(f, "Manchester"),
            Self::DifferentialManchester => write!(f, "Differential Manchester"),
        }
    }
}

/// Returns the number of samples in one signaling interval.
///
/// # Errors
///
/// Returns an error if the interval or sample rate is not positive, or if the interval is too
/// short to hold even one sample.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn samples_per_interval(interval: f64, sample_rate: f64) -> Result<usize, Error> {
    if interval <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "Signaling interval must be positive (found {interval})"
        )));
    }
    if sample_rate <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "Sample rate must be positive (found {sample_rate})"
        )));
    }
    let num_samples = (interval * sample_rate).floor() as usize;
    if num_samples == 0 {
        return Err(Error::InvalidArgument(format!(
            "Signaling interval of {interval} s at {sample_rate} Hz yields zero samples"
        )));
    }
    Ok(num_samples)
}

/// Returns the waveform for a bit sequence under the given line coding scheme.
///
/// # Parameters
///
/// - `bits`: Bits to encode. An empty sequence yields an empty waveform.
///
/// - `kind`: Line coding scheme to apply.
///
/// - `bit_duration`: Signaling interval per bit (seconds).
///
/// - `sample_rate`: Sampling rate (Hz).
///
/// # Errors
///
/// Returns an error if `bit_duration` or `sample_rate` is not positive, or if a signaling
/// interval spans zero samples.
///
/// # Examples
///
/// ```
/// use commsim::{encode, Bit, EncodingKind};
///
/// let waveform = encode(&[Bit::One, Bit::Zero], EncodingKind::Nrz, 1.0, 4.0)?;
/// assert_eq!(waveform.amplitude(), &[1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, -1.0]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn encode(
    bits: &[Bit],
    kind: EncodingKind,
    bit_duration: f64,
    sample_rate: f64,
) -> Result<Waveform, Error> {
    let spb = samples_per_interval(bit_duration, sample_rate)?;
    match kind {
        EncodingKind::Nrz => Ok(encode_nrz(bits, spb, sample_rate)),
        EncodingKind::Manchester => Ok(encode_manchester(bits, spb, sample_rate)),
        EncodingKind::DifferentialManchester => {
            Ok(encode_differential_manchester(bits, spb, sample_rate))
        }
    }
}

/// Returns the NRZ waveform, `+1.0` for `One` and `-1.0` for `Zero` over the full interval.
fn encode_nrz(bits: &[Bit], spb: usize, sample_rate: f64) -> Waveform {
    let mut time = Vec::with_capacity(bits.len() * spb);
    let mut amplitude = Vec::with_capacity(bits.len() * spb);
    for (bit_index, &bit) in bits.iter().enumerate() {
        let level = if bit == Bit::One { 1.0 } else { -1.0 };
        for sample_index in 0 .. spb {
            time.push(sample_instant(bit_index * spb + sample_index, sample_rate));
            amplitude.push(level);
        }
    }
    Waveform::from_parts(time, amplitude)
}

/// Returns the Manchester waveform, `Zero` as high-then-low and `One` as low-then-high.
fn encode_manchester(bits: &[Bit], spb: usize, sample_rate: f64) -> Waveform {
    let mut time = Vec::with_capacity(bits.len() * spb);
    let mut amplitude = Vec::with_capacity(bits.len() * spb);
    for (bit_index, &bit) in bits.iter().enumerate() {
        let first_half_level = if bit == Bit::Zero { 1.0 } else { -1.0 };
        for sample_index in 0 .. spb {
            time.push(sample_instant(bit_index * spb + sample_index, sample_rate));
            if in_first_half(sample_index, spb) {
                amplitude.push(first_half_level);
            } else {
                amplitude.push(-first_half_level);
            }
        }
    }
    Waveform::from_parts(time, amplitude)
}

/// Returns the differential Manchester waveform. The polarity starts at `+1.0`, flips at the
/// boundary of every `Zero` bit, and every bit still carries a mid-bit transition.
fn encode_differential_manchester(bits: &[Bit], spb: usize, sample_rate: f64) -> Waveform {
    let mut time = Vec::with_capacity(bits.len() * spb);
    let mut amplitude = Vec::with_capacity(bits.len() * spb);
    let mut polarity = 1.0;
    for (bit_index, &bit) in bits.iter().enumerate() {
        if bit == Bit::Zero {
            polarity = -polarity;
        }
        for sample_index in 0 .. spb {
            time.push(sample_instant(bit_index * spb + sample_index, sample_rate));
            if in_first_half(sample_index, spb) {
                amplitude.push(polarity);
            } else {
                amplitude.push(-polarity);
            }
        }
    }
    Waveform::from_parts(time, amplitude)
}

/// Returns whether a sample index falls in the first half of its signaling interval.
fn in_first_half(sample_index: usize, spb: usize) -> bool {
    sample_index * 2 < spb
}

/// Returns the time instant of a sample index.
fn sample_instant(sample_index: usize, sample_rate: f64) -> f64 {
    crate::math::index_to_f64(sample_index) / sample_rate
}

#[cfg(test)]
mod tests_of_functions {
    use float_eq::assert_float_eq;

    use super::*;
    use Bit::{One, Zero};

    #[test]
    fn test_encode_invalid_input() {
        assert!(encode(&[One], EncodingKind::Nrz, 0.0, 100.0).is_err());
        assert!(encode(&[One], EncodingKind::Nrz, 1.0, 0.0).is_err());
        assert!(encode(&[One], EncodingKind::Nrz, 1.0, -4.0).is_err());
        // Interval too short for a single sample
        assert!(encode(&[One], EncodingKind::Manchester, 0.001, 100.0).is_err());
    }

    #[test]
    fn test_encode_empty() {
        let waveform = encode(&[], EncodingKind::Nrz, 1.0, 4.0).unwrap();
        assert!(waveform.is_empty());
    }

    #[test]
    fn test_encode_nrz() {
        let waveform = encode(&[One, Zero, One], EncodingKind::Nrz, 1.0, 4.0).unwrap();
        assert_eq!(
            waveform.amplitude(),
            &[1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0]
        );
        assert_float_eq!(waveform.time()[5], 1.25, abs <= 1e-12);
    }

    #[test]
    fn test_encode_manchester() {
        // Zero is high-then-low, One is low-then-high
        let waveform = encode(&[Zero], EncodingKind::Manchester, 1.0, 4.0).unwrap();
        assert_eq!(waveform.amplitude(), &[1.0, 1.0, -1.0, -1.0]);
        let waveform = encode(&[One, Zero], EncodingKind::Manchester, 1.0, 4.0).unwrap();
        assert_eq!(
            waveform.amplitude(),
            &[-1.0, -1.0, 1.0, 1.0, 1.0, 1.0, -1.0, -1.0]
        );
        // Odd samples per bit put the extra sample in the second half
        let waveform = encode(&[Zero], EncodingKind::Manchester, 1.0, 5.0).unwrap();
        assert_eq!(waveform.amplitude(), &[1.0, 1.0, -1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_encode_differential_manchester() {
        // Zero flips the polarity at the bit boundary, One keeps it
        let waveform =
            encode(&[One, Zero, Zero], EncodingKind::DifferentialManchester, 1.0, 2.0).unwrap();
        assert_eq!(waveform.amplitude(), &[1.0, -1.0, -1.0, 1.0, 1.0, -1.0]);
    }

    #[test]
    fn test_encode_sample_instants() {
        let waveform = encode(&[One, Zero], EncodingKind::Nrz, 0.5, 8.0).unwrap();
        assert_eq!(waveform.len(), 8);
        let expected: Vec<f64> = (0 .. 8).map(|i| f64::from(i) / 8.0).collect();
        assert_float_eq!(waveform.time().to_vec(), expected, abs_all <= 1e-12);
    }
}
