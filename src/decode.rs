//! Converts falling-edge timestamps into a DHT22 reading.
//!
//! # Encoding
//!
//! After the host releases the bus the sensor pulls it low, holds it high
//! for ~80us and then sends 40 bits. Every bit is a ~50us low followed by
//! a high whose length carries the value, so the time between two
//! consecutive falling edges is:
//!
//! ```txt
//!   80-93us    bit 0
//!  125-135us   bit 1
//! ```
//!
//! A full transmission yields 42 falling edges: the start of the response,
//! the end of the ready pulse, and one edge closing each data bit. Only the
//! last 40 intervals carry data.
//!
//! The 40 bits form 5 bytes, most significant bit first:
//!
//! ```txt
//! | humidity hi | humidity lo | temp hi | temp lo | checksum |
//! ```
//!
//! where the checksum is the sum of the first four bytes truncated to 8 bits.

use core::fmt;

use crate::error::DecodeError;

/// Number of data bits in a transmission.
pub const DATA_BITS: usize = 40;

/// Falling edges produced by a clean transmission.
pub const EXPECTED_EDGES: usize = 42;

/// Intervals longer than this many microseconds decode as a `1`.
pub const DEFAULT_BIT_THRESHOLD_US: i64 = 110;

/// Reading returned by the DHT22 sensor.
///
/// Both values are in the sensor's native fixed point: tenths of a degree
/// Celsius and tenths of a percent relative humidity.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reading {
    /// Raw temperature word. Bit 15 is the sign, see [`Reading::temperature_tenths`].
    pub temperature: u16,
    /// Relative humidity in tenths of a percent.
    pub humidity: u16,
}

impl Reading {
    /// Temperature in tenths of a degree Celsius, with the sign applied.
    pub fn temperature_tenths(&self) -> i16 {
        let magnitude = (self.temperature & 0x7fff) as i16;
        if self.temperature & 0x8000 != 0 {
            -magnitude
        } else {
            magnitude
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let temperature = self.temperature_tenths();
        let sign = if temperature < 0 { "-" } else { "" };
        let temperature = temperature.unsigned_abs();
        write!(
            f,
            "{sign}{}.{}°C {}.{}%",
            temperature / 10,
            temperature % 10,
            self.humidity / 10,
            self.humidity % 10
        )
    }
}

/// Decodes `count` captured edges into a [`Reading`].
///
/// `timestamps` is the capture buffer; `count` is the pulse counter, which
/// may exceed the buffer length if the capture overran.
pub fn decode(
    timestamps: &[i64],
    count: usize,
    bit_threshold_us: i64,
) -> Result<Reading, DecodeError> {
    if count < EXPECTED_EDGES {
        error!("wrong pulse count {} < {}", count, EXPECTED_EDGES);
        return Err(DecodeError::InsufficientEdges { count });
    }
    if count > timestamps.len() {
        error!("edge buffer overrun, pulse count {}", count);
        return Err(DecodeError::Overrun { count });
    }
    if count != EXPECTED_EDGES {
        warn!("pulse count {} != {}", count, EXPECTED_EDGES);
    }

    // The first data interval ends at `count - DATA_BITS`, so one edge
    // before it is needed as well.
    let data = bits_to_bytes(&timestamps[count - DATA_BITS - 1..count], bit_threshold_us);
    trace!(
        "data {:02x} {:02x} {:02x} {:02x} {:02x}",
        data[0], data[1], data[2], data[3], data[4]
    );

    let [hum_hi, hum_lo, temp_hi, temp_lo, expected] = data;
    let actual = data[..4].iter().fold(0u8, |sum, v| sum.wrapping_add(*v));
    if actual != expected {
        error!("wrong checksum {:02x} != {:02x}", actual, expected);
        return Err(DecodeError::ChecksumMismatch { expected, actual });
    }

    Ok(Reading {
        humidity: u16::from_be_bytes([hum_hi, hum_lo]),
        temperature: u16::from_be_bytes([temp_hi, temp_lo]),
    })
}

/// Packs the intervals between consecutive `edges` into bytes, MSB first.
fn bits_to_bytes(edges: &[i64], bit_threshold_us: i64) -> [u8; 5] {
    let mut data = [0u8; 5];
    for (bit, pair) in edges.windows(2).enumerate() {
        let pulse_width_us = pair[1] - pair[0];
        if pulse_width_us > bit_threshold_us {
            data[bit / 8] |= 0x80 >> (bit % 8);
        }
    }
    data
}
