//! Carrier modulation schemes
//!
//! Each scheme keys a sinusoidal carrier with a bit sequence. ASK, FSK, and PSK key one carrier
//! parameter per bit; QAM maps groups of bits to constellation points and mixes the in-phase and
//! quadrature components.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::encoding::samples_per_interval;
use crate::math::index_to_f64;
use crate::{Bit, Error, Waveform};

/// Enumeration of carrier modulation schemes
#[derive(Clone, Eq, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub enum ModulationKind {
    /// Amplitude-shift keying
    Ask,
    /// Frequency-shift keying
    Fsk,
    /// Phase-shift keying
    Psk,
    /// Quadrature amplitude modulation
    Qam,
}

impl std::fmt::Display for ModulationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ask => write!(f, "ASK"),
            Self::Fsk => write!(f, "FSK"),
            Self::Psk => write!(f, "PSK"),
            Self::Qam => write!(f, "QAM"),
        }
    }
}

/// Point in the I/Q plane
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct IqPoint {
    /// In-phase component
    pub i: f64,
    /// Quadrature component
    pub q: f64,
}

impl IqPoint {
    /// Returns the point with the given components.
    #[must_use]
    pub fn new(i: f64, q: f64) -> Self {
        Self { i, q }
    }
}

/// Carrier and keying parameters shared by all modulation schemes
///
/// The defaults reproduce the conventional textbook settings: a unit-amplitude 10 Hz carrier,
/// ASK levels of 0.2 and 1.0, FSK frequencies symmetric about the carrier, antipodal PSK phases,
/// and a 4-point square constellation.
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct ModulationParams {
    /// Carrier frequency (Hz)
    pub carrier_freq: f64,
    /// Carrier amplitude
    pub amplitude: f64,
    /// Carrier phase offset (radians)
    pub phase: f64,
    /// ASK amplitude keyed by a `Zero` bit
    pub ask_amplitude0: f64,
    /// ASK amplitude keyed by a `One` bit
    pub ask_amplitude1: f64,
    /// FSK frequency keyed by a `Zero` bit (Hz)
    pub fsk_freq0: f64,
    /// FSK frequency keyed by a `One` bit (Hz)
    pub fsk_freq1: f64,
    /// PSK phase keyed by a `Zero` bit (radians)
    pub psk_phase0: f64,
    /// PSK phase keyed by a `One` bit (radians)
    pub psk_phase1: f64,
    /// QAM constellation; the length must be a power of two, at least 2
    pub constellation: Vec<IqPoint>,
}

impl Default for ModulationParams {
    fn default() -> Self {
        Self {
            carrier_freq: 10.0,
            amplitude: 1.0,
            phase: 0.0,
            ask_amplitude0: 0.2,
            ask_amplitude1: 1.0,
            fsk_freq0: 8.0,
            fsk_freq1: 12.0,
            psk_phase0: PI,
            psk_phase1: 0.0,
            constellation: default_constellation(),
        }
    }
}

/// Returns the default 4-point square constellation.
#[must_use]
pub fn default_constellation() -> Vec<IqPoint> {
    vec![
        IqPoint::new(-1.0, -1.0),
        IqPoint::new(-1.0, 1.0),
        IqPoint::new(1.0, -1.0),
        IqPoint::new(1.0, 1.0),
    ]
}

/// Checks that a constellation has a power-of-two size of at least 2.
pub(crate) fn check_constellation(constellation: &[IqPoint]) -> Result<(), Error> {
    let size = constellation.len();
    if size < 2 || !size.is_power_of_two() {
        return Err(Error::InvalidArgument(format!(
            "Constellation size must be a power of two, at least 2 (found {size})"
        )));
    }
    Ok(())
}

/// Returns the modulated waveform for a bit sequence.
///
/// # Parameters
///
/// - `bits`: Bits to modulate. An empty sequence yields an empty waveform. For QAM, a trailing
///   group short of a full symbol is padded with `Zero` bits.
///
/// - `kind`: Modulation scheme to apply.
///
/// - `params`: Carrier and keying parameters.
///
/// - `bit_duration`: Signaling interval per bit (seconds).
///
/// - `sample_rate`: Sampling rate (Hz).
///
/// # Errors
///
/// Returns an error if `bit_duration` or `sample_rate` is not positive, if a signaling interval
/// spans zero samples, or if the QAM constellation size is not a power of two of at least 2.
///
/// # Examples
///
/// ```
/// use commsim::{modulate, Bit, ModulationKind, ModulationParams};
///
/// let params = ModulationParams::default();
/// let waveform = modulate(&[Bit::One], ModulationKind::Ask, &params, 1.0, 100.0)?;
/// assert_eq!(waveform.len(), 100);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn modulate(
    bits: &[Bit],
    kind: ModulationKind,
    params: &ModulationParams,
    bit_duration: f64,
    sample_rate: f64,
) -> Result<Waveform, Error> {
    match kind {
        ModulationKind::Ask => keyed_carrier(bits, bit_duration, sample_rate, |bit, t| {
            let amplitude = match bit {
                Bit::Zero => params.ask_amplitude0,
                Bit::One => params.ask_amplitude1,
            };
            amplitude * (TAU * params.carrier_freq * t + params.phase).cos()
        }),
        ModulationKind::Fsk => keyed_carrier(bits, bit_duration, sample_rate, |bit, t| {
            let freq = match bit {
                Bit::Zero => params.fsk_freq0,
                Bit::One => params.fsk_freq1,
            };
            params.amplitude * (TAU * freq * t + params.phase).cos()
        }),
        ModulationKind::Psk => keyed_carrier(bits, bit_duration, sample_rate, |bit, t| {
            let keyed_phase = match bit {
                Bit::Zero => params.psk_phase0,
                Bit::One => params.psk_phase1,
            };
            params.amplitude * (TAU * params.carrier_freq * t + params.phase + keyed_phase).cos()
        }),
        ModulationKind::Qam => modulate_qam(bits, params, bit_duration, sample_rate),
    }
}

/// Returns a waveform whose carrier is keyed bitwise by the given sample function.
fn keyed_carrier(
    bits: &[Bit],
    bit_duration: f64,
    sample_rate: f64,
    sample_fn: impl Fn(Bit, f64) -> f64,
) -> Result<Waveform, Error> {
    let spb = samples_per_interval(bit_duration, sample_rate)?;
    let mut time = Vec::with_capacity(bits.len() * spb);
    let mut amplitude = Vec::with_capacity(bits.len() * spb);
    for (bit_index, &bit) in bits.iter().enumerate() {
        for sample_index in 0 .. spb {
            let t = index_to_f64(bit_index * spb + sample_index) / sample_rate;
            time.push(t);
            amplitude.push(sample_fn(bit, t));
        }
    }
    Ok(Waveform::from_parts(time, amplitude))
}

/// Returns the QAM waveform. Each symbol spans `log2(constellation size)` bit intervals, with the
/// bits of a group read most-significant first as the constellation index.
#[allow(clippy::cast_possible_truncation)]
fn modulate_qam(
    bits: &[Bit],
    params: &ModulationParams,
    bit_duration: f64,
    sample_rate: f64,
) -> Result<Waveform, Error> {
    check_constellation(&params.constellation)?;
    let bits_per_symbol = params.constellation.len().ilog2() as usize;
    let symbol_duration = index_to_f64(bits_per_symbol) * bit_duration;
    let sps = samples_per_interval(symbol_duration, sample_rate)?;
    let num_symbols = bits.len().div_ceil(bits_per_symbol);
    let mut time = Vec::with_capacity(num_symbols * sps);
    let mut amplitude = Vec::with_capacity(num_symbols * sps);
    for symbol_index in 0 .. num_symbols {
        let mut point_index = 0usize;
        for bit_offset in 0 .. bits_per_symbol {
            // Trailing groups are padded with Zero bits
            let bit = bits
                .get(symbol_index * bits_per_symbol + bit_offset)
                .copied()
                .unwrap_or(Bit::Zero);
            point_index = (point_index << 1) | bit as usize;
        }
        let point = params.constellation[point_index];
        for sample_index in 0 .. sps {
            let t = index_to_f64(symbol_index * sps + sample_index) / sample_rate;
            let carrier_angle = TAU * params.carrier_freq * t + params.phase;
            time.push(t);
            amplitude.push(point.i * carrier_angle.cos() + point.q * carrier_angle.sin());
        }
    }
    Ok(Waveform::from_parts(time, amplitude))
}
