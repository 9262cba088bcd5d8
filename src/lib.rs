//! This crate implements the signal processing and channel simulation engine behind a
//! digital-communications teaching tool. It turns bit sequences into sampled baseband waveforms
//! under three line coding schemes, modulates bit sequences onto a carrier under four keying
//! schemes, derives figure-of-merit metrics for a modulation configuration, and simulates signal
//! packets traversing an impaired physical medium while keeping running transmission statistics
//! (error count, bit error rate, signal-to-noise ratio). All results are returned in memory; a
//! separate visualization layer is expected to render them.

#![warn(
    clippy::complexity,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_allocation,
    unused_import_braces,
    unused_qualifications
)]

use thiserror::Error;

pub mod channel;
pub mod encoding;
pub mod generator;
pub mod math;
pub mod medium;
pub mod metrics;
pub mod modulation;
pub mod sim;
pub mod utils;

pub use channel::{ArrivalEvent, ChannelParams, ChannelSimulator, SignalPacket, TransmissionStats};
pub use encoding::{encode, EncodingKind};
pub use medium::{estimate_link, profile, LinkEstimate, MediumKind, MediumProfile};
pub use metrics::{compute_metrics, ModulationMetrics};
pub use modulation::{modulate, IqPoint, ModulationKind, ModulationParams};

/// Custom error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid argument error
    #[error("{0}")]
    InvalidArgument(String),
    /// Sequence length mismatch error
    #[error("Expected sequences of equal length (found {0} and {1})")]
    LengthMismatch(usize, usize),
    /// File read/write error
    #[error("{0}")]
    FileReadWrite(#[from] std::io::Error),
    /// Serde read/write error
    #[error("{0}")]
    SerdeReadWrite(#[from] serde_json::Error),
}

/// Enumeration of binary symbol values
#[derive(Clone, Eq, PartialEq, Debug, Copy)]
pub enum Bit {
    /// Binary symbol `0`
    Zero = 0,
    /// Binary symbol `1`
    One = 1,
}

/// Sampled waveform as paired time and amplitude sequences
///
/// The two sequences always have equal lengths: the sample at `time()[i]` seconds has amplitude
/// `amplitude()[i]`. Waveforms are produced fresh by each encode/modulate call, owned by the
/// caller, and never mutated by this crate once returned.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Waveform {
    /// Sample instants (seconds, strictly increasing)
    time: Vec<f64>,
    /// Sample amplitudes (unitless)
    amplitude: Vec<f64>,
}

impl Waveform {
    /// Returns waveform holding the given time and amplitude sequences.
    ///
    /// # Parameters
    ///
    /// - `time`: Sample instants (seconds).
    ///
    /// - `amplitude`: Sample amplitudes.
    ///
    /// # Errors
    ///
    /// Returns an error if the two sequences have different lengths.
    ///
    /// # Examples
    ///
    /// ```
    /// use commsim::Waveform;
    ///
    /// let waveform = Waveform::new(vec![0.0, 0.5, 1.0], vec![1.0, -1.0, 1.0])?;
    /// assert_eq!(waveform.len(), 3);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(time: Vec<f64>, amplitude: Vec<f64>) -> Result<Self, Error> {
        if time.len() == amplitude.len() {
            Ok(Self { time, amplitude })
        } else {
            Err(Error::LengthMismatch(time.len(), amplitude.len()))
        }
    }

    /// Returns waveform from sequences known to have equal lengths.
    pub(crate) fn from_parts(time: Vec<f64>, amplitude: Vec<f64>) -> Self {
        debug_assert_eq!(time.len(), amplitude.len());
        Self { time, amplitude }
    }

    /// Returns the sample instants (seconds).
    #[must_use]
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Returns the sample amplitudes.
    #[must_use]
    pub fn amplitude(&self) -> &[f64] {
        &self.amplitude
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Returns `true` if the waveform holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Consumes the waveform and returns its time and amplitude sequences.
    #[must_use]
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.time, self.amplitude)
    }

    /// Returns a copy decimated to at most `max_points` samples.
    ///
    /// Samples are kept at a fixed stride so the overall shape survives; a waveform that already
    /// fits is returned unchanged. A `max_points` of `0` yields an empty waveform.
    #[must_use]
    pub fn downsample(&self, max_points: usize) -> Self {
        if max_points == 0 {
            return Self::default();
        }
        if self.len() <= max_points {
            return self.clone();
        }
        let step = self.len() / max_points;
        let time = self.time.iter().copied().step_by(step).collect();
        let amplitude = self.amplitude.iter().copied().step_by(step).collect();
        Self::from_parts(time, amplitude)
    }
}
