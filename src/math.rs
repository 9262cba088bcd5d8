//! Signal math kernel: axis generation, a recursive spectral transform, noise injection,
//! attenuation, low-pass filtering, and SNR/BER statistics
//!
//! Every function here is a pure transformation of its inputs, except [`add_noise`], which draws
//! from the random source passed to it. Passing a seeded generator makes the output reproducible.

use std::f64::consts::TAU;
use std::ops::{Add, Mul, Sub};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{utils, Bit, Error};

/// Complex value with `f64` components
#[derive(Clone, PartialEq, Debug, Copy, Default)]
pub struct Complex {
    /// Real part
    pub re: f64,
    /// Imaginary part
    pub im: f64,
}

impl Complex {
    /// Returns complex value with given real and imaginary parts.
    #[must_use]
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Returns the magnitude `sqrt(re^2 + im^2)`.
    #[must_use]
    pub fn magnitude(self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Returns the phase `atan2(im, re)` in radians.
    #[must_use]
    pub fn phase(self) -> f64 {
        self.im.atan2(self.re)
    }
}

impl Add for Complex {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.re + other.re, self.im + other.im)
    }
}

impl Sub for Complex {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.re - other.re, self.im - other.im)
    }
}

impl Mul for Complex {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        Self::new(
            self.re * other.re - self.im * other.im,
            self.re * other.im + self.im * other.re,
        )
    }
}

/// Enumeration of noise distributions
#[derive(Clone, Eq, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub enum NoiseKind {
    /// Zero-mean, unit-variance gaussian noise
    Gaussian,
    /// Uniform noise on `[-1, 1)`
    Uniform,
}

/// Returns uniformly spaced sample instants starting at `0`.
///
/// # Parameters
///
/// - `sample_rate`: Sampling rate (Hz).
///
/// - `duration`: Span to cover (seconds). The axis holds `floor(sample_rate * duration)` samples
///   at step `1 / sample_rate`.
///
/// # Errors
///
/// Returns an error if `sample_rate` is not positive or `duration` is negative.
///
/// # Examples
///
/// ```
/// use commsim::math;
///
/// let time = math::time_axis(10.0, 0.5)?;
/// assert_eq!(time.len(), 5);
/// assert_eq!(time[1], 0.1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn time_axis(sample_rate: f64, duration: f64) -> Result<Vec<f64>, Error> {
    if sample_rate <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "Sample rate must be positive (found {sample_rate})"
        )));
    }
    if duration < 0.0 {
        return Err(Error::InvalidArgument(format!(
            "Duration cannot be negative (found {duration})"
        )));
    }
    let num_samples = (sample_rate * duration).floor() as usize;
    Ok((0 .. num_samples).map(|i| index_to_f64(i) / sample_rate).collect())
}

/// Returns frequency bin centers for a spectrum of `num_samples` bins.
///
/// The bin step is `sample_rate / num_samples`; an empty axis is returned for zero bins.
#[must_use]
pub fn frequency_axis(sample_rate: f64, num_samples: usize) -> Vec<f64> {
    if num_samples == 0 {
        return Vec::new();
    }
    let freq_step = sample_rate / index_to_f64(num_samples);
    (0 .. num_samples).map(|i| index_to_f64(i) * freq_step).collect()
}

/// Returns the discrete Fourier transform of the input, computed by recursive radix-2
/// decomposition.
///
/// # Parameters
///
/// - `input`: Samples to transform. The length must be a power of two; the result is unspecified
///   otherwise (the input is never padded).
///
/// # Examples
///
/// ```
/// use commsim::math::{self, Complex};
///
/// let spectrum = math::fft(&[Complex::new(1.0, 0.0); 4]);
/// assert_eq!(spectrum[0].magnitude(), 4.0);
/// ```
#[must_use]
pub fn fft(input: &[Complex]) -> Vec<Complex> {
    let num_samples = input.len();
    if num_samples <= 1 {
        return input.to_vec();
    }
    let even: Vec<Complex> = input.iter().copied().step_by(2).collect();
    let odd: Vec<Complex> = input.iter().copied().skip(1).step_by(2).collect();
    let even_fft = fft(&even);
    let odd_fft = fft(&odd);
    let mut output = vec![Complex::default(); num_samples];
    for k in 0 .. num_samples / 2 {
        let angle = -TAU * index_to_f64(k) / index_to_f64(num_samples);
        let twiddle = Complex::new(angle.cos(), angle.sin()) * odd_fft[k];
        output[k] = even_fft[k] + twiddle;
        output[k + num_samples / 2] = even_fft[k] - twiddle;
    }
    output
}

/// Returns the input samples with additive noise of the given kind.
///
/// # Parameters
///
/// - `samples`: Samples to corrupt.
///
/// - `kind`: Noise distribution. Gaussian draws come from a Box–Muller transform of two
///   independent uniform draws per sample; uniform draws cover `[-1, 1)`.
///
/// - `power`: Scale applied to each noise draw before it is added.
///
/// - `rng`: Random number generator to be used.
pub fn add_noise<R: Rng + ?Sized>(
    samples: &[f64],
    kind: NoiseKind,
    power: f64,
    rng: &mut R,
) -> Vec<f64> {
    samples
        .iter()
        .map(|&sample| {
            let noise = match kind {
                NoiseKind::Gaussian => {
                    // 1 - U keeps the logarithm away from zero
                    let u1 = 1.0 - rng.random::<f64>();
                    let u2 = rng.random::<f64>();
                    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
                }
                NoiseKind::Uniform => (rng.random::<f64>() - 0.5) * 2.0,
            };
            sample + noise * power
        })
        .collect()
}

/// Returns the input samples scaled elementwise by `factor`.
#[must_use]
pub fn attenuate(samples: &[f64], factor: f64) -> Vec<f64> {
    samples.iter().map(|&sample| sample * factor).collect()
}

/// Returns the input samples passed through a single-pole low-pass IIR filter.
///
/// The filter coefficient is `alpha = cutoff_freq / (cutoff_freq + sample_rate)`, with
/// `y[0] = x[0]` and `y[i] = alpha * x[i] + (1 - alpha) * y[i - 1]`.
#[must_use]
pub fn low_pass_filter(samples: &[f64], cutoff_freq: f64, sample_rate: f64) -> Vec<f64> {
    let alpha = cutoff_freq / (cutoff_freq + sample_rate);
    let mut filtered = Vec::with_capacity(samples.len());
    for (i, &sample) in samples.iter().enumerate() {
        if i == 0 {
            filtered.push(sample);
        } else {
            filtered.push(alpha * sample + (1.0 - alpha) * filtered[i - 1]);
        }
    }
    filtered
}

/// Returns the signal-to-noise ratio (dB) of a noisy sequence relative to the original.
///
/// The ratio is mean signal power over mean squared-error power, `10 * log10(Psig / Pnoise)`.
///
/// # Errors
///
/// Returns an error if the sequences have different lengths or are empty.
pub fn snr(original: &[f64], noisy: &[f64]) -> Result<f64, Error> {
    if original.len() != noisy.len() {
        return Err(Error::LengthMismatch(original.len(), noisy.len()));
    }
    if original.is_empty() {
        return Err(Error::InvalidArgument(
            "Cannot compute SNR over empty sequences".to_string(),
        ));
    }
    let num_samples = index_to_f64(original.len());
    let signal_power = original.iter().map(|&x| x * x).sum::<f64>() / num_samples;
    let noise_power = original
        .iter()
        .zip(noisy)
        .map(|(&x, &y)| (y - x) * (y - x))
        .sum::<f64>()
        / num_samples;
    Ok(10.0 * (signal_power / noise_power).log10())
}

/// Returns the bit error rate between a received bit sequence and the original.
///
/// # Errors
///
/// Returns an error if the sequences have different lengths or are empty.
///
/// # Examples
///
/// ```
/// use commsim::math;
/// use commsim::Bit::{One, Zero};
///
/// let ber = math::ber(&[One, Zero, One], &[One, One, One])?;
/// assert!((ber - 1.0 / 3.0).abs() < 1e-12);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn ber(original_bits: &[Bit], received_bits: &[Bit]) -> Result<f64, Error> {
    if original_bits.len() != received_bits.len() {
        return Err(Error::LengthMismatch(
            original_bits.len(),
            received_bits.len(),
        ));
    }
    if original_bits.is_empty() {
        return Err(Error::InvalidArgument(
            "Cannot compute BER over empty sequences".to_string(),
        ));
    }
    let num_errors = utils::error_count(received_bits, original_bits);
    Ok(index_to_f64(num_errors) / index_to_f64(original_bits.len()))
}

/// Returns an index or count as `f64`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn index_to_f64(index: usize) -> f64 {
    index as f64
}

#[cfg(test)]
mod tests_of_functions {
    use float_eq::assert_float_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use Bit::{One, Zero};

    #[test]
    fn test_time_axis() {
        // Invalid input
        assert!(time_axis(0.0, 1.0).is_err());
        assert!(time_axis(-10.0, 1.0).is_err());
        assert!(time_axis(10.0, -1.0).is_err());
        // Valid input
        assert!(time_axis(10.0, 0.0).unwrap().is_empty());
        let time = time_axis(10.0, 0.5).unwrap();
        assert_float_eq!(time, vec![0.0, 0.1, 0.2, 0.3, 0.4], abs_all <= 1e-12);
    }

    #[test]
    fn test_frequency_axis() {
        assert!(frequency_axis(8.0, 0).is_empty());
        let freq = frequency_axis(8.0, 4);
        assert_float_eq!(freq, vec![0.0, 2.0, 4.0, 6.0], abs_all <= 1e-12);
    }

    #[test]
    fn test_complex_arithmetic() {
        let x = Complex::new(1.0, 2.0);
        let y = Complex::new(3.0, -1.0);
        assert_eq!(x + y, Complex::new(4.0, 1.0));
        assert_eq!(x - y, Complex::new(-2.0, 3.0));
        assert_eq!(x * y, Complex::new(5.0, 5.0));
        assert_float_eq!(Complex::new(3.0, 4.0).magnitude(), 5.0, abs <= 1e-12);
        assert_float_eq!(
            Complex::new(0.0, 1.0).phase(),
            std::f64::consts::FRAC_PI_2,
            abs <= 1e-12
        );
    }

    #[test]
    fn test_fft() {
        // Single sample passes through unchanged
        let single = [Complex::new(0.7, -0.3)];
        assert_eq!(fft(&single), single);
        // Constant input concentrates in bin 0
        let constant = [Complex::new(1.0, 0.0); 8];
        let spectrum = fft(&constant);
        assert_float_eq!(spectrum[0].magnitude(), 8.0, abs <= 1e-9);
        for bin in &spectrum[1 ..] {
            assert_float_eq!(bin.magnitude(), 0.0, abs <= 1e-9);
        }
        // Bin 0 magnitude equals the magnitude of the input sum
        let input: Vec<Complex> = (0 .. 16)
            .map(|i| Complex::new(f64::from(i) * 0.25 - 1.0, 0.0))
            .collect();
        let sum = input
            .iter()
            .fold(Complex::default(), |acc, &x| acc + x);
        assert_float_eq!(fft(&input)[0].magnitude(), sum.magnitude(), abs <= 1e-9);
    }

    #[test]
    fn test_add_noise() {
        let mut rng = StdRng::seed_from_u64(31);
        let samples = [0.5, -0.5, 1.0, 0.0];
        // Zero power leaves the samples unchanged
        let clean = add_noise(&samples, NoiseKind::Gaussian, 0.0, &mut rng);
        assert_float_eq!(clean, samples.to_vec(), abs_all <= 1e-12);
        // Uniform noise stays within the power bound
        let noisy = add_noise(&samples, NoiseKind::Uniform, 0.25, &mut rng);
        assert_eq!(noisy.len(), samples.len());
        for (noisy_sample, sample) in noisy.iter().zip(samples.iter()) {
            assert!((noisy_sample - sample).abs() <= 0.25);
        }
        // Same seed reproduces the same draws
        let mut rng_a = StdRng::seed_from_u64(7);
        let mut rng_b = StdRng::seed_from_u64(7);
        assert_eq!(
            add_noise(&samples, NoiseKind::Gaussian, 1.0, &mut rng_a),
            add_noise(&samples, NoiseKind::Gaussian, 1.0, &mut rng_b)
        );
    }

    #[test]
    fn test_attenuate() {
        assert!(attenuate(&[], 0.5).is_empty());
        assert_float_eq!(
            attenuate(&[1.0, -2.0, 0.5], 0.5),
            vec![0.5, -1.0, 0.25],
            abs_all <= 1e-12
        );
    }

    #[test]
    fn test_low_pass_filter() {
        assert!(low_pass_filter(&[], 10.0, 100.0).is_empty());
        // A constant input passes through unchanged
        let constant = [2.0; 5];
        assert_float_eq!(
            low_pass_filter(&constant, 10.0, 100.0),
            constant.to_vec(),
            abs_all <= 1e-12
        );
        // First output sample equals the first input sample
        let filtered = low_pass_filter(&[1.0, 0.0, 0.0], 100.0, 100.0);
        assert_float_eq!(filtered[0], 1.0, abs <= 1e-12);
        assert_float_eq!(filtered[1], 0.5, abs <= 1e-12);
        assert_float_eq!(filtered[2], 0.25, abs <= 1e-12);
    }

    #[test]
    fn test_snr() {
        // Invalid input
        assert!(snr(&[1.0, 1.0], &[1.0]).is_err());
        assert!(snr(&[], &[]).is_err());
        // Valid input
        let original = [1.0, 1.0, 1.0, 1.0];
        let noisy = [1.0, 1.0, 1.0, 2.0];
        // Psig = 1, Pnoise = 0.25
        assert_float_eq!(
            snr(&original, &noisy).unwrap(),
            10.0 * 4f64.log10(),
            abs <= 1e-12
        );
    }

    #[test]
    fn test_ber() {
        // Invalid input
        assert!(ber(&[One, Zero], &[One]).is_err());
        assert!(ber(&[], &[]).is_err());
        // Valid input
        assert_float_eq!(
            ber(&[One, Zero, One], &[One, One, One]).unwrap(),
            1.0 / 3.0,
            abs <= 1e-12
        );
        assert_float_eq!(ber(&[One, Zero], &[One, Zero]).unwrap(), 0.0, abs <= 1e-12);
    }
}
