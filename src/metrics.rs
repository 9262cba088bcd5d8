//! Figures of merit for carrier modulation schemes
//!
//! The metrics follow the usual first-course approximations: spectral efficiency from bits per
//! symbol, power efficiency from mean constellation power, and a symbol error rate estimated from
//! the minimum constellation distance at a fixed assumed SNR.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::math::index_to_f64;
use crate::modulation::{check_constellation, ModulationKind, ModulationParams};
use crate::Error;

/// Linear SNR assumed by the symbol error rate estimate
const ASSUMED_SNR: f64 = 20.0;

/// Figures of merit for a modulation scheme
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct ModulationMetrics {
    /// Bits per symbol (bit/s/Hz)
    pub spectral_efficiency: f64,
    /// Mean power advantage over a unit-power reference (dB)
    pub power_efficiency_db: f64,
    /// Minimum distance between distinct constellation points
    pub min_distance: f64,
    /// Estimated symbol error rate at the assumed SNR
    pub symbol_error_rate: f64,
}

/// Returns the figures of merit for a modulation scheme.
///
/// Binary schemes (ASK, FSK, PSK) carry one bit per symbol over an antipodal-equivalent
/// constellation of minimum distance 2; ASK mean power comes from the configured amplitude pair.
/// QAM metrics are computed from the configured constellation.
///
/// # Errors
///
/// Returns an error if the QAM constellation size is not a power of two of at least 2.
///
/// # Examples
///
/// ```
/// use commsim::{compute_metrics, ModulationKind, ModulationParams};
///
/// let metrics = compute_metrics(ModulationKind::Qam, &ModulationParams::default())?;
/// assert_eq!(metrics.spectral_efficiency, 2.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn compute_metrics(
    kind: ModulationKind,
    params: &ModulationParams,
) -> Result<ModulationMetrics, Error> {
    let (spectral_efficiency, avg_power, min_distance) = match kind {
        ModulationKind::Ask => {
            let avg_power =
                (params.ask_amplitude0.powi(2) + params.ask_amplitude1.powi(2)) / 2.0;
            (1.0, avg_power, 2.0)
        }
        ModulationKind::Fsk | ModulationKind::Psk => (1.0, 1.0, 2.0),
        ModulationKind::Qam => {
            check_constellation(&params.constellation)?;
            let avg_power = params
                .constellation
                .iter()
                .map(|point| point.i * point.i + point.q * point.q)
                .sum::<f64>()
                / index_to_f64(params.constellation.len());
            let min_distance = params
                .constellation
                .iter()
                .tuple_combinations()
                .map(|(a, b)| (a.i - b.i).hypot(a.q - b.q))
                .fold(f64::INFINITY, f64::min);
            (
                f64::from(params.constellation.len().ilog2()),
                avg_power,
                min_distance,
            )
        }
    };
    Ok(ModulationMetrics {
        spectral_efficiency,
        power_efficiency_db: 10.0 * (1.0 / avg_power).log10(),
        min_distance,
        symbol_error_rate: 0.5 * (-min_distance * min_distance * ASSUMED_SNR / 4.0).exp(),
    })
}
