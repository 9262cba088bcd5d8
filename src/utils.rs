//! # Some useful functions for working with bit sequences
//!
//! The [`parse_bits`] function reads a bit sequence from a string of `'0'` and `'1'` characters;
//! the [`bit_string`] function renders a bit sequence back to such a string; the [`random_bits`]
//! function returns a given number of random bits; and the [`error_count`] function returns the
//! number of errors in a sequence with respect to a reference sequence.
//!
//! # Examples
//!
//! The code below illustrates the usage of the functions in this module.
//! ```
//! use commsim::utils;
//!
//! let bits = utils::parse_bits("1011")?;
//! assert_eq!(utils::bit_string(&bits), "1011");
//! assert_eq!(utils::error_count(&bits, &utils::parse_bits("1001")?), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use rand::Rng;

use crate::{Bit, Error};

/// Returns the bit sequence encoded by a string of `'0'` and `'1'` characters.
///
/// # Parameters
///
/// - `text`: String to be parsed. An empty string yields an empty sequence.
///
/// # Errors
///
/// Returns an error if the string contains any character other than `'0'` or `'1'`.
pub fn parse_bits(text: &str) -> Result<Vec<Bit>, Error> {
    text.chars()
        .map(|c| match c {
            '0' => Ok(Bit::Zero),
            '1' => Ok(Bit::One),
            _ => Err(Error::InvalidArgument(format!(
                "Expected only '0' and '1' characters (found {c:?})"
            ))),
        })
        .collect()
}

/// Returns the string of `'0'` and `'1'` characters encoding a bit sequence.
#[must_use]
pub fn bit_string(bits: &[Bit]) -> String {
    bits.iter()
        .map(|&bit| if bit == Bit::One { '1' } else { '0' })
        .collect()
}

/// Returns given number of random bits.
///
/// # Parameters
///
/// - `num_bits`: Number of random bits to be generated.
///
/// - `rng`: Random number generator to be used.
pub fn random_bits<R: Rng + ?Sized>(num_bits: usize, rng: &mut R) -> Vec<Bit> {
    (0 .. num_bits)
        .map(|_| {
            if rng.random_bool(0.5) {
                Bit::One
            } else {
                Bit::Zero
            }
        })
        .collect()
}

/// Returns number of errors in a sequence with respect to a reference sequence.
///
/// # Parameters
///
/// - `seq`: Sequence in which errors must be counted.
///
/// - `ref_seq`: Reference sequence to which the given sequence is compared. If the sequences are
///   of different lengths, then the longer one is effectively truncated to the length of the
///   shorter one.
pub fn error_count<T: PartialEq>(seq: &[T], ref_seq: &[T]) -> usize {
    ref_seq
        .iter()
        .zip(seq.iter())
        .filter(|&(x, y)| x != y)
        .count()
}
