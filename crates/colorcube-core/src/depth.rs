//! Bit depths for transform sides.
//!
//! Every transform node records a nominal bit depth for its input and output
//! side. Integer depths carry a maximum code value; float depths are
//! normalized and have a maximum of 1.0. The ratio of two maxima is the
//! scale factor applied when content moves between depths.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Nominal precision of one side of a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitDepth {
    /// 8-bit unsigned integer (0..=255).
    Uint8,
    /// 10-bit unsigned integer (0..=1023).
    Uint10,
    /// 12-bit unsigned integer (0..=4095).
    Uint12,
    /// 16-bit unsigned integer (0..=65535).
    Uint16,
    /// 16-bit half float, normalized.
    F16,
    /// 32-bit float, normalized.
    #[default]
    F32,
}

impl BitDepth {
    /// Maximum representable value for this depth.
    ///
    /// Float depths are normalized, so both [`BitDepth::F16`] and
    /// [`BitDepth::F32`] report 1.0.
    pub fn max_value(self) -> f64 {
        match self {
            BitDepth::Uint8 => 255.0,
            BitDepth::Uint10 => 1023.0,
            BitDepth::Uint12 => 4095.0,
            BitDepth::Uint16 => 65535.0,
            BitDepth::F16 | BitDepth::F32 => 1.0,
        }
    }

    /// True for the float depths.
    pub fn is_float(self) -> bool {
        matches!(self, BitDepth::F16 | BitDepth::F32)
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BitDepth::Uint8 => "8ui",
            BitDepth::Uint10 => "10ui",
            BitDepth::Uint12 => "12ui",
            BitDepth::Uint16 => "16ui",
            BitDepth::F16 => "16f",
            BitDepth::F32 => "32f",
        };
        f.write_str(s)
    }
}

impl FromStr for BitDepth {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "8ui" => Ok(BitDepth::Uint8),
            "10ui" => Ok(BitDepth::Uint10),
            "12ui" => Ok(BitDepth::Uint12),
            "16ui" => Ok(BitDepth::Uint16),
            "16f" => Ok(BitDepth::F16),
            "32f" => Ok(BitDepth::F32),
            other => Err(CoreError::UnknownBitDepth(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_values() {
        assert_eq!(BitDepth::Uint8.max_value(), 255.0);
        assert_eq!(BitDepth::Uint10.max_value(), 1023.0);
        assert_eq!(BitDepth::Uint12.max_value(), 4095.0);
        assert_eq!(BitDepth::Uint16.max_value(), 65535.0);
        assert_eq!(BitDepth::F16.max_value(), 1.0);
        assert_eq!(BitDepth::F32.max_value(), 1.0);
    }

    #[test]
    fn test_default_is_f32() {
        assert_eq!(BitDepth::default(), BitDepth::F32);
    }

    #[test]
    fn test_display_round_trip() {
        for depth in [
            BitDepth::Uint8,
            BitDepth::Uint10,
            BitDepth::Uint12,
            BitDepth::Uint16,
            BitDepth::F16,
            BitDepth::F32,
        ] {
            let token = depth.to_string();
            assert_eq!(token.parse::<BitDepth>().unwrap(), depth);
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("9ui".parse::<BitDepth>().is_err());
        assert!("".parse::<BitDepth>().is_err());
    }
}
