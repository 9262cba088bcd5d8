//! Batch channel simulations
//!
//! The [`run_sim`] function carries a randomly generated bit sequence across a simulated channel
//! and reports the resulting transmission statistics; the [`run_channel_sims`] function runs a
//! batch of such simulations in parallel and saves their results to a JSON file.

use std::fs::File;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::channel::{ChannelParams, ChannelSimulator, TransmissionStats};
use crate::encoding::{encode, EncodingKind};
use crate::modulation::{modulate, ModulationKind, ModulationParams};
use crate::{utils, Error};

/// Enumeration of transmit schemes
#[derive(Clone, Eq, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub enum Scheme {
    /// Baseband line coding
    Line(EncodingKind),
    /// Carrier modulation
    Carrier(ModulationKind),
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Line(kind) => write!(f, "{kind}"),
            Self::Carrier(kind) => write!(f, "{kind}"),
        }
    }
}

/// Channel simulation parameters
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct SimParams {
    /// Transmit scheme
    pub scheme: Scheme,
    /// Number of bits per packet
    pub num_bits: u32,
    /// Signaling interval per bit (seconds)
    pub bit_duration: f64,
    /// Sampling rate (Hz)
    pub sample_rate: f64,
    /// Channel configuration
    pub channel: ChannelParams,
    /// Multiplier on packet propagation speed
    pub speed_factor: f64,
    /// Simulation step size (seconds)
    pub delta_time: f64,
    /// Number of packets to transmit
    pub num_packets: u32,
    /// Seed for the random number generator
    pub seed: u64,
}

/// Channel simulation results
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct SimResults {
    /// Simulation parameters
    pub params: SimParams,
    /// Transmission statistics at the end of the run
    pub stats: TransmissionStats,
    /// Number of simulation steps taken
    pub num_ticks: u64,
}

impl std::fmt::Display for SimResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} over {} at noise level {}: {}/{} packets in error (PER {:.3}, SNR {:.1} dB)",
            self.params.scheme,
            self.params.channel.medium,
            self.params.channel.noise_level,
            self.stats.errors,
            self.stats.received,
            self.stats.ber,
            self.stats.snr_db,
        )
    }
}

/// Checks the validity of simulation parameters.
fn check_sim_params(params: &SimParams) -> Result<(), Error> {
    if params.num_bits == 0 {
        return Err(Error::InvalidArgument(
            "Number of bits per packet must be positive".to_string(),
        ));
    }
    if params.num_packets == 0 {
        return Err(Error::InvalidArgument(
            "Number of packets must be positive".to_string(),
        ));
    }
    if params.delta_time <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "Step size must be positive (found {})",
            params.delta_time
        )));
    }
    if params.speed_factor <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "Speed factor must be positive (found {})",
            params.speed_factor
        )));
    }
    Ok(())
}

/// Runs one channel simulation and returns its results.
///
/// A random bit sequence is generated from the seed, encoded or modulated per the transmit
/// scheme, and transmitted as `num_packets` packets. The simulation then steps until every
/// packet has arrived.
///
/// # Errors
///
/// Returns an error if the simulation parameters are invalid.
///
/// # Examples
///
/// ```
/// use commsim::sim::{run_sim, Scheme, SimParams};
/// use commsim::{ChannelParams, EncodingKind};
///
/// let params = SimParams {
///     scheme: Scheme::Line(EncodingKind::Nrz),
///     num_bits: 8,
///     bit_duration: 1.0,
///     sample_rate: 100.0,
///     channel: ChannelParams::default(),
///     speed_factor: 1.0,
///     delta_time: 0.5,
///     num_packets: 10,
///     seed: 0,
/// };
/// let results = run_sim(&params)?;
/// assert_eq!(results.stats.received, 10);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn run_sim(params: &SimParams) -> Result<SimResults, Error> {
    check_sim_params(params)?;
    let mut rng = StdRng::seed_from_u64(params.seed);
    let bits = utils::random_bits(params.num_bits as usize, &mut rng);
    let waveform = match params.scheme {
        Scheme::Line(kind) => encode(&bits, kind, params.bit_duration, params.sample_rate)?,
        Scheme::Carrier(kind) => modulate(
            &bits,
            kind,
            &ModulationParams::default(),
            params.bit_duration,
            params.sample_rate,
        )?,
    };
    let mut simulator = ChannelSimulator::with_rng(params.channel, params.speed_factor, rng)?;
    for _ in 0 .. params.num_packets {
        simulator.transmit(&waveform);
    }
    let mut num_ticks = 0;
    while simulator.in_flight() > 0 {
        simulator.step(params.delta_time);
        num_ticks += 1;
    }
    Ok(SimResults {
        params: *params,
        stats: simulator.stats(),
        num_ticks,
    })
}

/// Runs channel simulations for all given parameter values, and saves results to a JSON file.
///
/// The simulations run in parallel, each with its own seeded random number generator; results
/// are reported in the order of the given parameter values.
///
/// # Errors
///
/// Returns an error if any parameter set is invalid, or if the JSON file cannot be written.
pub fn run_channel_sims(all_params: &[SimParams], json_filename: &str) -> Result<(), Error> {
    let all_results: Vec<SimResults> = all_params
        .par_iter()
        .map(run_sim)
        .collect::<Result<Vec<_>, _>>()?;
    for results in &all_results {
        println!("{results}");
    }
    let file = File::create(json_filename)?;
    serde_json::to_writer_pretty(file, &all_results)?;
    Ok(())
}
