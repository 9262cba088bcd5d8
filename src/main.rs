//! This crate simulates the transmission of line-coded or carrier-modulated packets over a lossy
//! channel, reporting packet error statistics across a sweep of noise levels. Simulation
//! parameters are specified on the command line, and simulation results are saved to a JSON file.
//!
//! Build the executable with `cargo build --release` and then run `./target/release/commsim -h`
//! for help on the command-line interface.

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

use anyhow::Result;
use clap::parser::ValueSource;
use clap::{crate_name, crate_version, value_parser, Arg, ArgMatches, Command};
use commsim::sim::{run_channel_sims, Scheme, SimParams};
use commsim::{ChannelParams, EncodingKind, MediumKind, ModulationKind};
use std::time::Instant;

/// Main function
fn main() -> Result<()> {
    let timer = Instant::now();
    let matches = command_line_parser().get_matches();
    let json_filename = &json_filename_from_matches(&matches);
    run_channel_sims(&all_sim_params(&matches), json_filename)?;
    eprintln!("Elapsed time: {:.3?}", timer.elapsed());
    Ok(())
}

/// Returns command line parser.
fn command_line_parser() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .about("Simulates line-coded and carrier-modulated packets over a lossy channel")
        .arg(num_bits())
        .arg(scheme_name())
        .arg(medium_name())
        .arg(distance())
        .arg(attenuation())
        .arg(first_noise_level())
        .arg(noise_level_step())
        .arg(num_noise_levels())
        .arg(distortion())
        .arg(bit_duration())
        .arg(sample_rate())
        .arg(num_packets())
        .arg(speed_factor())
        .arg(delta_time())
        .arg(seed())
        .arg(json_filename())
}

/// Returns argument for number of bits per packet.
fn num_bits() -> Arg {
    Arg::new("num_bits")
        .short('i')
        .value_parser(value_parser!(u32))
        .default_value("8")
        .help("Number of bits per packet")
}

/// Returns argument for transmit scheme name.
fn scheme_name() -> Arg {
    Arg::new("scheme_name")
        .short('w')
        .value_parser([
            "NRZ",
            "Manchester",
            "DiffManchester",
            "ASK",
            "FSK",
            "PSK",
            "QAM",
        ])
        .default_value("NRZ")
        .help("Transmit scheme name")
}

/// Returns argument for transmission medium name.
fn medium_name() -> Arg {
    Arg::new("medium_name")
        .short('u')
        .value_parser(["coaxial", "twisted-pair", "optical-fiber", "wireless"])
        .default_value("coaxial")
        .help("Transmission medium name")
}

/// Returns argument for link distance (m).
fn distance() -> Arg {
    Arg::new("distance")
        .short('d')
        .value_parser(value_parser!(f64))
        .default_value("100.0")
        .help("Link distance (m)")
}

/// Returns argument for attenuation (dB/km).
fn attenuation() -> Arg {
    Arg::new("attenuation")
        .short('a')
        .value_parser(value_parser!(f64))
        .help("Attenuation (dB/km); defaults to the medium's typical value")
}

/// Returns argument for first noise level.
fn first_noise_level() -> Arg {
    Arg::new("first_noise_level")
        .short('r')
        .value_parser(value_parser!(f64))
        .default_value("0.1")
        .help("First noise level")
}

/// Returns argument for noise level step.
fn noise_level_step() -> Arg {
    Arg::new("noise_level_step")
        .short('p')
        .value_parser(value_parser!(f64))
        .allow_negative_numbers(true)
        .default_value("0.1")
        .help("Noise level step")
}

/// Returns argument for number of noise levels.
fn num_noise_levels() -> Arg {
    Arg::new("num_noise_levels")
        .short('s')
        .value_parser(value_parser!(u32))
        .default_value("4")
        .help("Number of noise levels")
}

/// Returns argument for distortion level.
fn distortion() -> Arg {
    Arg::new("distortion")
        .short('t')
        .value_parser(value_parser!(f64))
        .default_value("0.1")
        .help("Distortion level")
}

/// Returns argument for signaling interval per bit (s).
fn bit_duration() -> Arg {
    Arg::new("bit_duration")
        .short('l')
        .value_parser(value_parser!(f64))
        .default_value("1.0")
        .help("Signaling interval per bit (s)")
}

/// Returns argument for sampling rate (Hz).
fn sample_rate() -> Arg {
    Arg::new("sample_rate")
        .short('q')
        .value_parser(value_parser!(f64))
        .default_value("1000.0")
        .help("Sampling rate (Hz)")
}

/// Returns argument for number of packets to be transmitted.
fn num_packets() -> Arg {
    Arg::new("num_packets")
        .short('b')
        .value_parser(value_parser!(u32))
        .default_value("100")
        .help("Number of packets to be transmitted")
}

/// Returns argument for propagation speed factor.
fn speed_factor() -> Arg {
    Arg::new("speed_factor")
        .short('g')
        .value_parser(value_parser!(f64))
        .default_value("1.0")
        .help("Propagation speed factor")
}

/// Returns argument for simulation step size (s).
fn delta_time() -> Arg {
    Arg::new("delta_time")
        .short('x')
        .value_parser(value_parser!(f64))
        .default_value("0.016")
        .help("Simulation step size (s)")
}

/// Returns argument for random number generator seed.
fn seed() -> Arg {
    Arg::new("seed")
        .short('z')
        .value_parser(value_parser!(u64))
        .default_value("0")
        .help("Random number generator seed")
}

/// Returns argument for name of JSON file to which results must be saved.
fn json_filename() -> Arg {
    Arg::new("json_filename")
        .short('f')
        .default_value("results.json")
        .help("Name of JSON file to which results must be saved")
}

/// Returns simulation parameters based on command-line arguments.
fn all_sim_params(matches: &ArgMatches) -> Vec<SimParams> {
    let medium = medium_from_matches(matches);
    let mut channel = ChannelParams::defaults_for(medium);
    channel.distance = *matches.get_one("distance").unwrap();
    channel.distortion = *matches.get_one("distortion").unwrap();
    if let Some(ValueSource::CommandLine) = matches.value_source("attenuation") {
        channel.attenuation = *matches.get_one("attenuation").unwrap();
    }
    let seed: u64 = *matches.get_one("seed").unwrap();
    // OK to unwrap: All command-line arguments have default values, so an error cannot occur
    // in any of the associated functions called above.
    all_noise_levels_from_matches(matches)
        .into_iter()
        .enumerate()
        .map(|(idx, noise_level)| SimParams {
            scheme: scheme_from_matches(matches),
            num_bits: *matches.get_one("num_bits").unwrap(),
            bit_duration: *matches.get_one("bit_duration").unwrap(),
            sample_rate: *matches.get_one("sample_rate").unwrap(),
            channel: ChannelParams {
                noise_level,
                ..channel
            },
            speed_factor: *matches.get_one("speed_factor").unwrap(),
            delta_time: *matches.get_one("delta_time").unwrap(),
            num_packets: *matches.get_one("num_packets").unwrap(),
            seed: seed.wrapping_add(idx as u64),
        })
        .collect()
}

/// Returns transmit scheme.
fn scheme_from_matches(matches: &ArgMatches) -> Scheme {
    match matches.get_one::<String>("scheme_name").unwrap().as_str() {
        "NRZ" => Scheme::Line(EncodingKind::Nrz),
        "Manchester" => Scheme::Line(EncodingKind::Manchester),
        "DiffManchester" => Scheme::Line(EncodingKind::DifferentialManchester),
        "ASK" => Scheme::Carrier(ModulationKind::Ask),
        "FSK" => Scheme::Carrier(ModulationKind::Fsk),
        "PSK" => Scheme::Carrier(ModulationKind::Psk),
        "QAM" => Scheme::Carrier(ModulationKind::Qam),
        _ => panic!("Invalid transmit scheme name"),
    }
}

/// Returns transmission medium.
fn medium_from_matches(matches: &ArgMatches) -> MediumKind {
    match matches.get_one::<String>("medium_name").unwrap().as_str() {
        "coaxial" => MediumKind::Coaxial,
        "twisted-pair" => MediumKind::TwistedPair,
        "optical-fiber" => MediumKind::OpticalFiber,
        "wireless" => MediumKind::Wireless,
        _ => panic!("Invalid transmission medium name"),
    }
}

/// Returns all noise level values.
fn all_noise_levels_from_matches(matches: &ArgMatches) -> Vec<f64> {
    let first_noise_level: f64 = *matches.get_one("first_noise_level").unwrap();
    let noise_level_step: f64 = *matches.get_one("noise_level_step").unwrap();
    let num_noise_levels: u32 = *matches.get_one("num_noise_levels").unwrap();
    (0 .. num_noise_levels)
        .map(|n| first_noise_level + noise_level_step * f64::from(n))
        .collect()
}

/// Returns name of JSON file to which simulation results must be saved.
fn json_filename_from_matches(matches: &ArgMatches) -> String {
    matches
        .get_one::<String>("json_filename")
        .unwrap()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_line_for_test() -> Vec<&'static str> {
        vec![
            crate_name!(),
            "-i",
            "16",
            "-w",
            "PSK",
            "-u",
            "twisted-pair",
            "-d",
            "80.0",
            "-a",
            "40.0",
            "-r",
            "0.1",
            "-p",
            "0.2",
            "-s",
            "3",
            "-t",
            "0.05",
            "-l",
            "0.5",
            "-q",
            "200.0",
            "-b",
            "50",
            "-g",
            "2.0",
            "-x",
            "0.5",
            "-z",
            "9",
            "-f",
            "results.json",
        ]
    }

    #[test]
    fn test_command_line_parser() {
        assert!(command_line_parser()
            .try_get_matches_from(command_line_for_test())
            .is_ok());
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_all_sim_params() {
        let matches = command_line_parser().get_matches_from(command_line_for_test());
        let all_params = all_sim_params(&matches);
        let all_noise_levels = [0.1, 0.30000000000000004, 0.5];
        assert_eq!(all_params.len(), 3);
        for (idx, &params) in all_params.iter().enumerate() {
            assert_eq!(params.scheme, Scheme::Carrier(ModulationKind::Psk));
            assert_eq!(params.num_bits, 16);
            assert_eq!(params.bit_duration, 0.5);
            assert_eq!(params.sample_rate, 200.0);
            assert_eq!(params.channel.medium, MediumKind::TwistedPair);
            assert_eq!(params.channel.distance, 80.0);
            assert_eq!(params.channel.attenuation, 40.0);
            assert_eq!(params.channel.noise_level, all_noise_levels[idx]);
            assert_eq!(params.channel.distortion, 0.05);
            assert_eq!(params.num_packets, 50);
            assert_eq!(params.speed_factor, 2.0);
            assert_eq!(params.delta_time, 0.5);
            assert_eq!(params.seed, 9 + idx as u64);
        }
    }

    #[test]
    fn test_all_sim_params_default_attenuation() {
        let matches =
            command_line_parser().get_matches_from(vec![crate_name!(), "-u", "optical-fiber"]);
        let all_params = all_sim_params(&matches);
        // The medium's typical attenuation applies when none is given
        assert!((all_params[0].channel.attenuation - 0.2).abs() < 1e-12);
    }
}
