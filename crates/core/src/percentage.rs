// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The supported vocal-percentage set.
//!
//! Percentages outside the fixed set are rejected at the boundary and are
//! never interpolated into a path or storage key. The mix gain formula
//! itself is defined for any 0–100 integer (see [`vocal_gain`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Vocal level of a rendition, as a fraction of full volume.
///
/// `Zero` means instrumental only; the mix stage never reads the vocal
/// stem for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Percentage {
    Zero,
    Fifteen,
    Fifty,
}

/// Percentage outside the supported set.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported vocal percentage: {0}")]
pub struct UnsupportedPercentage(pub u8);

impl Percentage {
    /// All supported values, in ascending order.
    pub const ALL: [Percentage; 3] = [Percentage::Zero, Percentage::Fifteen, Percentage::Fifty];

    /// Validate a raw integer against the supported set.
    pub fn parse(raw: u8) -> Result<Self, UnsupportedPercentage> {
        match raw {
            0 => Ok(Percentage::Zero),
            15 => Ok(Percentage::Fifteen),
            50 => Ok(Percentage::Fifty),
            other => Err(UnsupportedPercentage(other)),
        }
    }

    /// Parse the decimal form used in workspace directory names.
    pub fn parse_str(raw: &str) -> Result<Self, UnsupportedPercentage> {
        raw.parse::<u8>().map_err(|_| UnsupportedPercentage(u8::MAX)).and_then(Self::parse)
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Percentage::Zero => 0,
            Percentage::Fifteen => 15,
            Percentage::Fifty => 50,
        }
    }

    /// True for the instrumental-only rendition (re-encode path, no blend).
    pub fn is_instrumental_only(self) -> bool {
        self == Percentage::Zero
    }

    /// Linear amplitude multiplier for the vocal stem.
    pub fn gain(self) -> f32 {
        vocal_gain(self.as_u8())
    }
}

/// Linear amplitude multiplier for an arbitrary 0–100 vocal percentage.
///
/// Linear scaling, not decibel: 100 is full volume, 0 is silence.
pub fn vocal_gain(percent: u8) -> f32 {
    f32::from(percent.min(100)) / 100.0
}

impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

#[cfg(test)]
#[path = "percentage_tests.rs"]
mod tests;
