//! Tick-driven channel simulator
//!
//! A [`ChannelSimulator`] carries signal packets across a lossy medium. Each call to
//! [`ChannelSimulator::step`] advances every in-flight packet by a fraction of the link and
//! reapplies the channel impairments to its amplitude. A packet whose amplitude has decayed below
//! the detection threshold when it arrives is counted as an error.

use std::collections::HashMap;
use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::medium::{profile, MediumKind};
use crate::{Error, Waveform};

/// Arriving packets below this amplitude are counted as errors.
const ERROR_THRESHOLD: f64 = 0.1;

/// Impairments never push an amplitude below this floor.
const AMPLITUDE_FLOOR: f64 = 0.01;

/// Fraction of the link a packet covers per unit time at unit speed
const BASE_ADVANCE_RATE: f64 = 0.2;

/// Number of arrival waveforms retained for eye diagram rendering
const ARRIVAL_HISTORY_LEN: usize = 50;

/// Channel configuration
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct ChannelParams {
    /// Transmission medium
    pub medium: MediumKind,
    /// Link distance (m)
    pub distance: f64,
    /// Attenuation (dB/km)
    pub attenuation: f64,
    /// Noise level, 0 to 1
    pub noise_level: f64,
    /// Distortion level, 0 to 1
    pub distortion: f64,
    /// Channel bandwidth (Hz)
    pub bandwidth: f64,
}

impl ChannelParams {
    /// Returns the default configuration for a medium: a 100 m link with the medium's typical
    /// attenuation and bandwidth, and mild noise and distortion.
    #[must_use]
    pub fn defaults_for(medium: MediumKind) -> Self {
        let medium_profile = profile(medium);
        Self {
            medium,
            distance: 100.0,
            attenuation: medium_profile.typical_attenuation,
            noise_level: 0.1,
            distortion: 0.1,
            bandwidth: medium_profile.bandwidth,
        }
    }
}

impl Default for ChannelParams {
    fn default() -> Self {
        Self::defaults_for(MediumKind::Coaxial)
    }
}

/// Checks the validity of channel parameters.
fn check_channel_params(params: &ChannelParams) -> Result<(), Error> {
    if params.distance <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "Distance must be positive (found {})",
            params.distance
        )));
    }
    if params.attenuation < 0.0 {
        return Err(Error::InvalidArgument(format!(
            "Attenuation cannot be negative (found {})",
            params.attenuation
        )));
    }
    if !(0.0 ..= 1.0).contains(&params.noise_level) {
        return Err(Error::InvalidArgument(format!(
            "Noise level must be between 0 and 1 (found {})",
            params.noise_level
        )));
    }
    if !(0.0 ..= 1.0).contains(&params.distortion) {
        return Err(Error::InvalidArgument(format!(
            "Distortion must be between 0 and 1 (found {})",
            params.distortion
        )));
    }
    Ok(())
}

/// Signal packet in flight across the channel
#[derive(Clone, PartialEq, Debug)]
pub struct SignalPacket {
    id: u64,
    data: Waveform,
    position: f64,
    amplitude: f64,
    created_at: f64,
}

impl SignalPacket {
    /// Returns the packet identifier.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the waveform the packet carries.
    #[must_use]
    pub fn data(&self) -> &Waveform {
        &self.data
    }

    /// Returns the packet's progress along the link, 0 at the transmitter and 1 at the receiver.
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Returns the packet's current peak amplitude after impairments.
    #[must_use]
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Returns the simulation clock value at which the packet was transmitted.
    #[must_use]
    pub fn created_at(&self) -> f64 {
        self.created_at
    }
}

/// Packet arrival reported by a simulation step
#[derive(Clone, Eq, PartialEq, Debug, Copy)]
pub struct ArrivalEvent {
    /// Identifier of the arrived packet
    pub packet_id: u64,
    /// Whether the packet arrived below the detection threshold
    pub errored: bool,
}

/// Cumulative transmission statistics
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct TransmissionStats {
    /// Packets transmitted
    pub transmitted: u64,
    /// Packets received
    pub received: u64,
    /// Packets received in error
    pub errors: u64,
    /// Packet error fraction over received packets
    pub ber: f64,
    /// Channel SNR implied by the configured noise level (dB)
    pub snr_db: f64,
}

/// Tick-driven simulator carrying signal packets across a channel
///
/// # Examples
///
/// ```
/// use commsim::{ChannelParams, ChannelSimulator, Waveform};
///
/// let mut simulator = ChannelSimulator::new(ChannelParams::default(), 1.0)?;
/// simulator.transmit(&Waveform::new(vec![0.0], vec![1.0])?);
/// while simulator.in_flight() > 0 {
///     simulator.step(1.0);
/// }
/// assert_eq!(simulator.stats().received, 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct ChannelSimulator<R: Rng = StdRng> {
    params: ChannelParams,
    speed_factor: f64,
    rng: R,
    packets: HashMap<u64, SignalPacket>,
    next_packet_id: u64,
    clock: f64,
    transmitted: u64,
    received: u64,
    errors: u64,
    arrivals: VecDeque<Waveform>,
}

impl ChannelSimulator<StdRng> {
    /// Returns a simulator seeded from the operating system's entropy source.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel parameters or speed factor are invalid.
    pub fn new(params: ChannelParams, speed_factor: f64) -> Result<Self, Error> {
        Self::with_rng(params, speed_factor, StdRng::from_os_rng())
    }
}

impl<R: Rng> ChannelSimulator<R> {
    /// Returns a simulator driven by the given random number generator.
    ///
    /// # Parameters
    ///
    /// - `params`: Channel configuration.
    ///
    /// - `speed_factor`: Multiplier on packet propagation speed; must be positive.
    ///
    /// - `rng`: Random number generator to be used for impairments.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel parameters are invalid or `speed_factor` is not positive.
    pub fn with_rng(params: ChannelParams, speed_factor: f64, rng: R) -> Result<Self, Error> {
        check_channel_params(&params)?;
        if speed_factor <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "Speed factor must be positive (found {speed_factor})"
            )));
        }
        Ok(Self {
            params,
            speed_factor,
            rng,
            packets: HashMap::new(),
            next_packet_id: 0,
            clock: 0.0,
            transmitted: 0,
            received: 0,
            errors: 0,
            arrivals: VecDeque::new(),
        })
    }

    /// Returns the channel configuration.
    #[must_use]
    pub fn params(&self) -> &ChannelParams {
        &self.params
    }

    /// Injects a waveform into the channel as a new packet and returns its identifier.
    ///
    /// The packet starts at the transmitter with unit amplitude and counts as transmitted
    /// immediately.
    pub fn transmit(&mut self, data: &Waveform) -> u64 {
        let id = self.next_packet_id;
        self.next_packet_id += 1;
        self.transmitted += 1;
        self.packets.insert(
            id,
            SignalPacket {
                id,
                data: data.clone(),
                position: 0.0,
                amplitude: 1.0,
                created_at: self.clock,
            },
        );
        id
    }

    /// Advances the simulation by `delta_time` seconds and returns the packets that arrived.
    ///
    /// Every in-flight packet moves forward by `speed_factor * delta_time * 0.2` of the link. A
    /// packet reaching the receiver is delivered with the amplitude it held at the end of the
    /// previous step; it is an error if that amplitude is below the detection threshold. Packets
    /// still in flight get their amplitude recomputed from the channel impairments at the new
    /// position.
    pub fn step(&mut self, delta_time: f64) -> Vec<ArrivalEvent> {
        self.clock += delta_time;
        let advance = self.speed_factor * delta_time * BASE_ADVANCE_RATE;
        let mut events = Vec::new();
        let ids: Vec<u64> = self.packets.keys().copied().collect();
        for id in ids {
            let Some(packet) = self.packets.get_mut(&id) else {
                continue;
            };
            packet.position += advance;
            if packet.position >= 1.0 {
                let errored = packet.amplitude < ERROR_THRESHOLD;
                self.received += 1;
                if errored {
                    self.errors += 1;
                }
                let packet = self.packets.remove(&id).unwrap_or_else(|| unreachable!());
                self.arrivals.push_back(packet.data);
                if self.arrivals.len() > ARRIVAL_HISTORY_LEN {
                    self.arrivals.pop_front();
                }
                events.push(ArrivalEvent {
                    packet_id: id,
                    errored,
                });
            } else {
                packet.amplitude =
                    impaired_amplitude(&self.params, &mut self.rng, packet.position);
            }
        }
        events
    }

    /// Drops all in-flight packets without crediting them as received.
    pub fn stop(&mut self) {
        self.packets.clear();
    }

    /// Returns the cumulative transmission statistics.
    #[must_use]
    pub fn stats(&self) -> TransmissionStats {
        let ber = if self.received == 0 {
            0.0
        } else {
            count_to_f64(self.errors) / count_to_f64(self.received)
        };
        let noise_power = (self.params.noise_level * self.params.noise_level).max(0.001);
        TransmissionStats {
            transmitted: self.transmitted,
            received: self.received,
            errors: self.errors,
            ber,
            snr_db: 10.0 * (1.0 / noise_power).log10(),
        }
    }

    /// Zeroes the statistics counters and clears the arrival history. In-flight packets are kept.
    pub fn reset_stats(&mut self) {
        self.transmitted = 0;
        self.received = 0;
        self.errors = 0;
        self.arrivals.clear();
    }

    /// Returns the number of packets currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.packets.len()
    }

    /// Returns an iterator over the packets currently in flight, in no particular order.
    pub fn packets(&self) -> impl Iterator<Item = &SignalPacket> {
        self.packets.values()
    }

    /// Returns the mean amplitude of the packets in flight, or `None` if the channel is empty.
    #[must_use]
    pub fn mean_in_flight_amplitude(&self) -> Option<f64> {
        if self.packets.is_empty() {
            return None;
        }
        let sum: f64 = self.packets.values().map(SignalPacket::amplitude).sum();
        Some(sum / crate::math::index_to_f64(self.packets.len()))
    }

    /// Returns the waveforms of the most recent arrivals, oldest first.
    pub fn arrival_history(&self) -> impl Iterator<Item = &Waveform> {
        self.arrivals.iter()
    }
}

/// Returns the impaired peak amplitude of a packet at the given position along the link.
///
/// Attenuation scales the unit transmit amplitude by the loss accumulated over the distance
/// covered so far; noise adds a uniform perturbation, and distortion a position-dependent ripple.
/// The result never drops below the amplitude floor.
fn impaired_amplitude<R: Rng>(params: &ChannelParams, rng: &mut R, position: f64) -> f64 {
    let loss_db = params.attenuation * (position * params.distance) / 1000.0;
    let mut amplitude = 10f64.powf(-loss_db / 20.0);
    amplitude += (rng.random::<f64>() - 0.5) * params.noise_level * 0.1;
    amplitude *= 1.0 + (position * 4.0 * std::f64::consts::PI).sin() * params.distortion * 0.1;
    amplitude.max(AMPLITUDE_FLOOR)
}

/// Returns a packet count as `f64`.
#[allow(clippy::cast_precision_loss)]
fn count_to_f64(count: u64) -> f64 {
    count as f64
}

#[cfg(test)]
mod tests_of_channel_simulator {
    use float_eq::assert_float_eq;

    use super::*;

    fn quiet_params() -> ChannelParams {
        ChannelParams {
            noise_level: 0.0,
            distortion: 0.0,
            attenuation: 0.0,
            ..ChannelParams::default()
        }
    }

    fn test_waveform() -> Waveform {
        Waveform::new(vec![0.0, 0.1], vec![1.0, -1.0]).unwrap()
    }

    fn seeded_simulator(params: ChannelParams, speed_factor: f64) -> ChannelSimulator {
        ChannelSimulator::with_rng(params, speed_factor, StdRng::seed_from_u64(17)).unwrap()
    }

    #[test]
    fn test_with_rng_invalid_input() {
        let rng = StdRng::seed_from_u64(0);
        let mut params = ChannelParams::default();
        params.distance = 0.0;
        assert!(ChannelSimulator::with_rng(params, 1.0, rng.clone()).is_err());
        params = ChannelParams::default();
        params.noise_level = 1.5;
        assert!(ChannelSimulator::with_rng(params, 1.0, rng.clone()).is_err());
        params = ChannelParams::default();
        params.distortion = -0.1;
        assert!(ChannelSimulator::with_rng(params, 1.0, rng.clone()).is_err());
        params = ChannelParams::default();
        params.attenuation = -1.0;
        assert!(ChannelSimulator::with_rng(params, 1.0, rng.clone()).is_err());
        assert!(ChannelSimulator::with_rng(ChannelParams::default(), 0.0, rng).is_err());
    }

    #[test]
    fn test_transmit_counts_immediately() {
        let mut simulator = seeded_simulator(quiet_params(), 1.0);
        let first = simulator.transmit(&test_waveform());
        let second = simulator.transmit(&test_waveform());
        assert_ne!(first, second);
        assert_eq!(simulator.stats().transmitted, 2);
        assert_eq!(simulator.stats().received, 0);
        assert_eq!(simulator.in_flight(), 2);
    }

    #[test]
    fn test_step_arrival_after_five_ticks() {
        // At unit speed, each one-second tick covers a fifth of the link
        let mut simulator = seeded_simulator(quiet_params(), 1.0);
        let id = simulator.transmit(&test_waveform());
        for _ in 0 .. 4 {
            assert!(simulator.step(1.0).is_empty());
        }
        let events = simulator.step(1.0);
        assert_eq!(events, vec![ArrivalEvent { packet_id: id, errored: false }]);
        assert_eq!(simulator.in_flight(), 0);
        let stats = simulator.stats();
        assert_eq!(stats.received, 1);
        assert_eq!(stats.errors, 0);
        assert_float_eq!(stats.ber, 0.0, abs <= 1e-12);
    }

    #[test]
    fn test_step_arrival_in_one_large_tick() {
        let mut simulator = seeded_simulator(quiet_params(), 1.0);
        simulator.transmit(&test_waveform());
        let events = simulator.step(5.0);
        assert_eq!(events.len(), 1);
        // The transmit-time unit amplitude is above the threshold, so no error
        assert!(!events[0].errored);
    }

    #[test]
    fn test_step_error_on_attenuated_arrival() {
        // 400 dB/km over 100 m is 40 dB, an amplitude of 0.01 after one partial step
        let mut params = quiet_params();
        params.attenuation = 400.0;
        let mut simulator = seeded_simulator(params, 1.0);
        simulator.transmit(&test_waveform());
        assert!(simulator.step(4.0).is_empty());
        let events = simulator.step(1.0);
        assert_eq!(events.len(), 1);
        assert!(events[0].errored);
        let stats = simulator.stats();
        assert_eq!(stats.errors, 1);
        assert_float_eq!(stats.ber, 1.0, abs <= 1e-12);
    }

    #[test]
    fn test_impaired_amplitude() {
        let mut rng = StdRng::seed_from_u64(5);
        // No impairments leave the unit amplitude untouched
        let clean = quiet_params();
        assert_float_eq!(impaired_amplitude(&clean, &mut rng, 0.5), 1.0, abs <= 1e-12);
        // Heavy attenuation pins the amplitude at the floor
        let mut heavy = quiet_params();
        heavy.attenuation = 10000.0;
        assert_float_eq!(
            impaired_amplitude(&heavy, &mut rng, 1.0),
            AMPLITUDE_FLOOR,
            abs <= 1e-12
        );
        // Noise perturbs by at most half the scaled noise level
        let mut noisy = quiet_params();
        noisy.noise_level = 1.0;
        for _ in 0 .. 100 {
            let amplitude = impaired_amplitude(&noisy, &mut rng, 0.5);
            assert!((amplitude - 1.0).abs() <= 0.05 + 1e-12);
        }
    }

    #[test]
    fn test_stop_drops_packets_without_credit() {
        let mut simulator = seeded_simulator(quiet_params(), 1.0);
        simulator.transmit(&test_waveform());
        simulator.transmit(&test_waveform());
        simulator.stop();
        assert_eq!(simulator.in_flight(), 0);
        let stats = simulator.stats();
        assert_eq!(stats.transmitted, 2);
        assert_eq!(stats.received, 0);
        // A second stop is a no-op
        simulator.stop();
        assert_eq!(simulator.stats().transmitted, 2);
    }

    #[test]
    fn test_reset_stats() {
        let mut simulator = seeded_simulator(quiet_params(), 1.0);
        simulator.transmit(&test_waveform());
        simulator.step(5.0);
        simulator.transmit(&test_waveform());
        simulator.reset_stats();
        let stats = simulator.stats();
        assert_eq!(stats.transmitted, 0);
        assert_eq!(stats.received, 0);
        assert_eq!(stats.errors, 0);
        // The in-flight packet survives the reset
        assert_eq!(simulator.in_flight(), 1);
        assert_eq!(simulator.arrival_history().count(), 0);
    }

    #[test]
    fn test_arrival_history_capped() {
        let mut simulator = seeded_simulator(quiet_params(), 1.0);
        for _ in 0 .. ARRIVAL_HISTORY_LEN + 10 {
            simulator.transmit(&test_waveform());
            simulator.step(5.0);
        }
        assert_eq!(simulator.arrival_history().count(), ARRIVAL_HISTORY_LEN);
    }

    #[test]
    fn test_mean_in_flight_amplitude() {
        let mut simulator = seeded_simulator(quiet_params(), 1.0);
        assert!(simulator.mean_in_flight_amplitude().is_none());
        simulator.transmit(&test_waveform());
        simulator.step(1.0);
        assert_float_eq!(
            simulator.mean_in_flight_amplitude().unwrap(),
            1.0,
            abs <= 1e-12
        );
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let mut params = ChannelParams::default();
        params.noise_level = 0.5;
        let run = |seed: u64| {
            let rng = StdRng::seed_from_u64(seed);
            let mut simulator = ChannelSimulator::with_rng(params, 1.0, rng).unwrap();
            simulator.transmit(&test_waveform());
            let mut amplitudes = Vec::new();
            while simulator.in_flight() > 0 {
                simulator.step(1.0);
                amplitudes.extend(simulator.packets().map(SignalPacket::amplitude));
            }
            amplitudes
        };
        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }

    #[test]
    fn test_stats_snr() {
        let mut params = quiet_params();
        params.noise_level = 0.5;
        let simulator = seeded_simulator(params, 1.0);
        assert_float_eq!(simulator.stats().snr_db, 10.0 * 4f64.log10(), abs <= 1e-12);
        // Noise-free channels are clamped to the power floor
        let quiet = seeded_simulator(quiet_params(), 1.0);
        assert_float_eq!(quiet.stats().snr_db, 30.0, abs <= 1e-12);
    }
}
