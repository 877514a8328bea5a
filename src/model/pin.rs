use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const PIN_LENGTHS: std::ops::RangeInclusive<usize> = 6..=8;

/// Factory PIN of a PIV application
const FACTORY_PIN: &[u8] = b"123456";

/// PIV PIN, verified on the device before it signs.
///
/// Never printed; `Debug` shows only that a PIN is present.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(Vec<u8>);

impl Pin {
    pub fn new(pin: Vec<u8>) -> Result<Self, PinError> {
        if !PIN_LENGTHS.contains(&pin.len()) {
            return Err(PinError::Length { actual: pin.len() });
        }
        if !pin.iter().all(u8::is_ascii_graphic) {
            return Err(PinError::NotPrintable);
        }
        Ok(Self(pin))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Still the value the device shipped with
    pub fn is_factory_default(&self) -> bool {
        self.0 == FACTORY_PIN
    }
}

impl Default for Pin {
    fn default() -> Self {
        Self(FACTORY_PIN.to_vec())
    }
}

impl FromStr for Pin {
    type Err = PinError;

    fn from_str(pin: &str) -> Result<Self, Self::Err> {
        Self::new(pin.as_bytes().to_vec())
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(***)")
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinError {
    #[error("PIN must be 6 to 8 characters, got {actual}")]
    Length { actual: usize },

    #[error("PIN must be printable ASCII")]
    NotPrintable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_six_to_eight_characters() {
        for pin in ["123456", "1234567", "abcd!234"] {
            assert_eq!(pin.parse::<Pin>().unwrap().as_bytes(), pin.as_bytes());
        }
    }

    #[test]
    fn test_rejects_bad_length() {
        assert_eq!(
            "12345".parse::<Pin>().unwrap_err(),
            PinError::Length { actual: 5 }
        );
        assert_eq!(
            "123456789".parse::<Pin>().unwrap_err(),
            PinError::Length { actual: 9 }
        );
    }

    #[test]
    fn test_rejects_non_printable() {
        assert_eq!(
            Pin::new(b"123 456".to_vec()).unwrap_err(),
            PinError::NotPrintable
        );
    }

    #[test]
    fn test_factory_default() {
        assert!(Pin::default().is_factory_default());
        assert!(!"654321".parse::<Pin>().unwrap().is_factory_default());
    }

    #[test]
    fn test_debug_hides_value() {
        let pin: Pin = "24681357".parse().unwrap();
        assert_eq!(format!("{:?}", pin), "Pin(***)");
    }
}
