//! Action encoding
//!
//! Actions arrive as fixed-length one-hot (or empty) vectors. When several
//! bits are set the first one in priority order wins.

use serde::{Deserialize, Serialize};

use crate::error::ActionError;

/// Length of an encoded action vector
pub const ACTION_COUNT: usize = 6;

/// Decoded action, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Action {
    SteerLeft,
    SteerRight,
    /// Hold the heading and drive an extra move this tick
    Straight,
    LowSpeed,
    MediumSpeed,
    HighSpeed,
    /// Empty vector: keep going straight, no speed change
    #[default]
    Idle,
}

impl Action {
    /// Bit order of the encoded vector
    pub const PRIORITY: [Action; ACTION_COUNT] = [
        Action::SteerLeft,
        Action::SteerRight,
        Action::Straight,
        Action::LowSpeed,
        Action::MediumSpeed,
        Action::HighSpeed,
    ];

    /// Decode a one-hot-or-empty vector
    pub fn from_one_hot(bits: &[f32]) -> Result<Self, ActionError> {
        if bits.len() != ACTION_COUNT {
            return Err(ActionError::WrongLength {
                expected: ACTION_COUNT,
                got: bits.len(),
            });
        }
        if let Some((index, &value)) = bits
            .iter()
            .enumerate()
            .find(|&(_, &v)| v != 0.0 && v != 1.0)
        {
            return Err(ActionError::UnrecognizedValue { index, value });
        }

        Ok(bits
            .iter()
            .position(|&v| v == 1.0)
            .map(|i| Self::PRIORITY[i])
            .unwrap_or(Action::Idle))
    }

    /// Encode as a one-hot vector (`Idle` is all zeros)
    pub fn to_one_hot(self) -> [f32; ACTION_COUNT] {
        let mut bits = [0.0; ACTION_COUNT];
        if let Some(i) = Self::PRIORITY.iter().position(|&a| a == self) {
            bits[i] = 1.0;
        }
        bits
    }

    /// Keyboard mapping for human play
    pub fn from_key(key: char) -> Self {
        match key.to_ascii_lowercase() {
            'a' => Action::SteerLeft,
            'd' => Action::SteerRight,
            'w' => Action::Straight,
            '1' => Action::LowSpeed,
            '2' => Action::MediumSpeed,
            '3' => Action::HighSpeed,
            _ => Action::Idle,
        }
    }

    /// Speed tier selected by this action, if any
    pub fn speed_tier(self) -> Option<SpeedTier> {
        match self {
            Action::LowSpeed => Some(SpeedTier::Low),
            Action::MediumSpeed => Some(SpeedTier::Medium),
            Action::HighSpeed => Some(SpeedTier::High),
            _ => None,
        }
    }
}

/// Discrete (velocity magnitude, rotation rate) pairs.
/// Faster tiers turn slower, i.e. a wider turning radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedTier {
    Low,
    Medium,
    High,
}

impl SpeedTier {
    pub fn speed(self) -> f32 {
        match self {
            SpeedTier::Low => 0.8,
            SpeedTier::Medium => 1.2,
            SpeedTier::High => 1.6,
        }
    }

    /// Degrees per tick
    pub fn rotation_rate(self) -> f32 {
        match self {
            SpeedTier::Low => 15.0,
            SpeedTier::Medium => 10.0,
            SpeedTier::High => 7.0,
        }
    }
}
