use core::fmt;

/// Reasons a captured edge sequence could not be turned into a reading.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer falling edges were captured than a full transmission produces.
    ///
    /// Usually the sensor is absent, miswired, or was polled too soon.
    InsufficientEdges { count: usize },
    /// More edges arrived than the capture buffer holds, so the trailing
    /// data edges were never stored.
    Overrun { count: usize },
    /// The received checksum byte does not match the sum of the data bytes.
    ChecksumMismatch { expected: u8, actual: u8 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientEdges { count } => {
                write!(f, "captured {count} edges, expected at least 42")
            }
            Self::Overrun { count } => write!(f, "edge buffer overrun ({count} edges)"),
            Self::ChecksumMismatch { expected, actual } => write!(
                f,
                "checksum mismatch (expected {expected:#04x}, found {actual:#04x})"
            ),
        }
    }
}

impl core::error::Error for DecodeError {}

/// Possible errors from the DHT22 driver.
#[derive(Debug, PartialEq, Eq)]
pub enum DhtError<E> {
    /// The captured transmission could not be decoded.
    Decode(DecodeError),
    /// Error from the GPIO pin while driving the bus.
    PinError(E),
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::PinError(value)
    }
}

impl<E: fmt::Debug> fmt::Display for DhtError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "decode error: {e}"),
            Self::PinError(e) => write!(f, "pin error: {e:?}"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for DhtError<E> {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            Self::PinError(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            DecodeError::InsufficientEdges { count: 30 }.to_string(),
            "captured 30 edges, expected at least 42"
        );
        assert_eq!(
            DecodeError::ChecksumMismatch {
                expected: 0x0f,
                actual: 0xa0
            }
            .to_string(),
            "checksum mismatch (expected 0x0f, found 0xa0)"
        );

        let err: DhtError<()> = DhtError::Decode(DecodeError::Overrun { count: 70 });
        assert_eq!(err.to_string(), "decode error: edge buffer overrun (70 edges)");
    }

    #[test]
    fn pin_error_converts() {
        let err: DhtError<u8> = 7u8.into();
        assert_eq!(err, DhtError::PinError(7));
    }
}
