//! Reference waveform generators

use serde::{Deserialize, Serialize};

use crate::{math, Error, Waveform};

/// Parameters of a generated reference waveform
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct SignalParams {
    /// Peak amplitude
    pub amplitude: f64,
    /// Frequency (Hz)
    pub frequency: f64,
    /// Phase offset (radians)
    pub phase: f64,
    /// Sampling rate (Hz)
    pub sample_rate: f64,
    /// Span to generate (seconds)
    pub duration: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            frequency: 10.0,
            phase: 0.0,
            sample_rate: 1000.0,
            duration: 1.0,
        }
    }
}

/// Returns a sine wave with the given parameters.
///
/// # Errors
///
/// Returns an error if the sample rate is not positive or the duration is negative.
///
/// # Examples
///
/// ```
/// use commsim::generator::{sine_wave, SignalParams};
///
/// let waveform = sine_wave(&SignalParams::default())?;
/// assert_eq!(waveform.len(), 1000);
/// assert_eq!(waveform.amplitude()[0], 0.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn sine_wave(params: &SignalParams) -> Result<Waveform, Error> {
    generate(params, |angle| angle.sin())
}

/// Returns a cosine wave with the given parameters.
///
/// # Errors
///
/// Returns an error if the sample rate is not positive or the duration is negative.
pub fn cosine_wave(params: &SignalParams) -> Result<Waveform, Error> {
    generate(params, |angle| angle.cos())
}

/// Returns a square wave with the given parameters, taking the sign of the corresponding sine
/// wave (zero where the sine is zero).
///
/// # Errors
///
/// Returns an error if the sample rate is not positive or the duration is negative.
pub fn square_wave(params: &SignalParams) -> Result<Waveform, Error> {
    generate(params, |angle| {
        let s = angle.sin();
        if s > 0.0 {
            1.0
        } else if s < 0.0 {
            -1.0
        } else {
            0.0
        }
    })
}

/// Returns a waveform evaluating the given shape function at each instant's carrier angle.
fn generate(params: &SignalParams, shape: impl Fn(f64) -> f64) -> Result<Waveform, Error> {
    let time = math::time_axis(params.sample_rate, params.duration)?;
    let amplitude = time
        .iter()
        .map(|&t| {
            params.amplitude * shape(std::f64::consts::TAU * params.frequency * t + params.phase)
        })
        .collect();
    Ok(Waveform::from_parts(time, amplitude))
}
