//! Transmission medium profiles and coarse link budget estimates

use serde::{Deserialize, Serialize};

use crate::channel::ChannelParams;

/// Enumeration of transmission media
#[derive(Clone, Eq, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub enum MediumKind {
    /// Coaxial cable
    Coaxial,
    /// Unshielded twisted pair
    TwistedPair,
    /// Single-mode optical fiber
    OpticalFiber,
    /// Free-space radio link
    Wireless,
}

impl std::fmt::Display for MediumKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coaxial => write!(f, "coaxial"),
            Self::TwistedPair => write!(f, "twisted-pair"),
            Self::OpticalFiber => write!(f, "optical-fiber"),
            Self::Wireless => write!(f, "wireless"),
        }
    }
}

/// Physical characteristics of a transmission medium
#[derive(Clone, PartialEq, Debug, Copy, Serialize)]
pub struct MediumProfile {
    /// Medium this profile describes
    pub kind: MediumKind,
    /// Human-readable medium name
    pub name: &'static str,
    /// Practical maximum link distance (m)
    pub max_distance: f64,
    /// Typical attenuation (dB/km)
    pub typical_attenuation: f64,
    /// Usable bandwidth (Hz)
    pub bandwidth: f64,
    /// Relative cost, 1 (cheap) to 5 (expensive)
    pub relative_cost: u8,
    /// Relative deployment complexity, 1 (simple) to 5 (involved)
    pub relative_complexity: u8,
    /// Human-readable description of the medium's construction and trade-offs
    pub description: &'static str,
}

const COAXIAL: MediumProfile = MediumProfile {
    kind: MediumKind::Coaxial,
    name: "Coaxial cable",
    max_distance: 500.0,
    typical_attenuation: 20.0,
    bandwidth: 1e6,
    relative_cost: 2,
    relative_complexity: 2,
    description: "An inner conductor wrapped in insulation, an outer conductor, and a \
                  protective jacket. Suited to high-frequency signals with good interference \
                  rejection.",
};

const TWISTED_PAIR: MediumProfile = MediumProfile {
    kind: MediumKind::TwistedPair,
    name: "Twisted pair",
    max_distance: 100.0,
    typical_attenuation: 50.0,
    bandwidth: 100e3,
    relative_cost: 1,
    relative_complexity: 1,
    description: "Two insulated conductors twisted around each other. Cheap and simple to \
                  install, but limited in reach and bandwidth.",
};

const OPTICAL_FIBER: MediumProfile = MediumProfile {
    kind: MediumKind::OpticalFiber,
    name: "Optical fiber",
    max_distance: 40000.0,
    typical_attenuation: 0.2,
    bandwidth: 100e6,
    relative_cost: 4,
    relative_complexity: 4,
    description: "Carries signals as light. High bandwidth, low attenuation, and immune to \
                  electromagnetic interference, at a higher cost.",
};

const WIRELESS: MediumProfile = MediumProfile {
    kind: MediumKind::Wireless,
    name: "Wireless link",
    max_distance: 10000.0,
    typical_attenuation: 100.0,
    bandwidth: 10e6,
    relative_cost: 3,
    relative_complexity: 5,
    description: "Carries signals over electromagnetic waves. Very flexible, but exposed to \
                  environmental interference and heavy power loss.",
};

/// Returns the profile for a medium.
#[must_use]
pub fn profile(kind: MediumKind) -> &'static MediumProfile {
    match kind {
        MediumKind::Coaxial => &COAXIAL,
        MediumKind::TwistedPair => &TWISTED_PAIR,
        MediumKind::OpticalFiber => &OPTICAL_FIBER,
        MediumKind::Wireless => &WIRELESS,
    }
}

/// Coarse link budget estimate for a channel configuration
#[derive(Clone, PartialEq, Debug, Copy, Serialize)]
pub struct LinkEstimate {
    /// End-to-end attenuation over the link (dB)
    pub total_attenuation_db: f64,
    /// Noise floor implied by the configured noise level (dBm)
    pub noise_floor_dbm: f64,
    /// Received SNR from a 20 dBm transmit reference (dB)
    pub snr_db: f64,
    /// Bit error rate implied by the received SNR
    pub ber: f64,
    /// One-way propagation delay (s)
    pub propagation_delay: f64,
    /// Share of transmit power lost to attenuation (percent)
    pub power_loss_percent: f64,
    /// Share of the medium's bandwidth the channel occupies, capped at 100 (percent)
    pub bandwidth_utilization_percent: f64,
}

/// Returns a coarse link budget estimate for the given channel configuration.
///
/// The estimate assumes a 20 dBm transmit reference. Signals propagate at two thirds the speed
/// of light in guided media and at the speed of light over wireless links.
///
/// # Examples
///
/// ```
/// use commsim::{estimate_link, ChannelParams, MediumKind};
///
/// let estimate = estimate_link(&ChannelParams::defaults_for(MediumKind::OpticalFiber));
/// assert!(estimate.snr_db > 0.0);
/// ```
#[must_use]
pub fn estimate_link(params: &ChannelParams) -> LinkEstimate {
    let total_attenuation_db = params.attenuation * params.distance / 1000.0;
    let noise_floor_dbm = -80.0 + 20.0 * (params.noise_level + 0.01).log10();
    let snr_db = 20.0 - total_attenuation_db - noise_floor_dbm;
    let ber = 10f64.powf(-(snr_db / 10.0 + 6.0));
    let propagation_speed = match params.medium {
        MediumKind::Wireless => 3e8,
        _ => 2e8,
    };
    let medium_bandwidth = profile(params.medium).bandwidth;
    LinkEstimate {
        total_attenuation_db,
        noise_floor_dbm,
        snr_db,
        ber,
        propagation_delay: params.distance / propagation_speed,
        power_loss_percent: (1.0 - 10f64.powf(-total_attenuation_db / 10.0)) * 100.0,
        bandwidth_utilization_percent: (params.bandwidth / medium_bandwidth * 100.0).min(100.0),
    }
}
