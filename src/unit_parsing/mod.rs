// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to parse strings into plain numbers or some quantity with a unit.

mod error;
#[cfg(test)]
mod tests;

pub use error::*;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

/// A number as it appears in a parameter file; either a bare number (already
/// in SI units) or a string with a unit attached (e.g. "1080s", "150 MHz").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(f64),
    Text(String),
}

impl Quantity {
    /// Get this quantity in seconds.
    pub fn to_seconds(&self) -> Result<f64, UnitParseError> {
        match self {
            Quantity::Number(n) => Ok(*n),
            Quantity::Text(s) => parse_time(s).map(|(n, f)| f.to_seconds(n)),
        }
    }

    /// Get this quantity in Hz.
    pub fn to_hz(&self) -> Result<f64, UnitParseError> {
        match self {
            Quantity::Number(n) => Ok(*n),
            Quantity::Text(s) => parse_freq(s).map(|(n, f)| f.to_hz(n)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, EnumIter, EnumString, IntoStaticStr)]
pub enum TimeFormat {
    /// Seconds
    S,

    /// Minutes
    Min,

    /// Hours
    H,

    NoUnit,
}

impl TimeFormat {
    fn to_seconds(self, value: f64) -> f64 {
        match self {
            TimeFormat::S | TimeFormat::NoUnit => value,
            TimeFormat::Min => value * 60.0,
            TimeFormat::H => value * 3600.0,
        }
    }
}

/// Parse a string that may have a unit of time attached to it.
pub fn parse_time(s: &str) -> Result<(f64, TimeFormat), UnitParseError> {
    // Try to parse a naked number.
    let maybe_number: Option<f64> = s.trim().parse().ok();
    if let Some(number) = maybe_number {
        return Ok((number, TimeFormat::NoUnit));
    };

    // That didn't work; let's search over our supported formats.
    let suffix = unit_suffix(s);
    for time_format in TimeFormat::iter().filter(|&tf| tf != TimeFormat::NoUnit) {
        let time_format_str: &'static str = time_format.into();
        if suffix.to_uppercase() == time_format_str.to_uppercase() {
            let number = unit_prefix(s)
                .parse()
                .map_err(|_| UnitParseError::GotTimeUnitButCantParse(s.to_string()))?;
            return Ok((number, time_format));
        }
    }

    // If we made it this far, we don't know how to parse the string.
    Err(UnitParseError::Unknown {
        input: s.to_string(),
        unit_type: "time",
    })
}

#[derive(Debug, Clone, Copy, PartialEq, EnumIter, EnumString, IntoStaticStr)]
#[allow(non_camel_case_types)]
pub enum FreqFormat {
    /// Hertz
    Hz,

    /// kiloHertz
    kHz,

    /// MegaHertz
    MHz,

    /// GigaHertz
    GHz,

    NoUnit,
}

impl FreqFormat {
    fn to_hz(self, value: f64) -> f64 {
        match self {
            FreqFormat::Hz | FreqFormat::NoUnit => value,
            FreqFormat::kHz => value * 1e3,
            FreqFormat::MHz => value * 1e6,
            FreqFormat::GHz => value * 1e9,
        }
    }
}

/// Parse a string that may have a unit of frequency attached to it.
pub fn parse_freq(s: &str) -> Result<(f64, FreqFormat), UnitParseError> {
    // Try to parse a naked number.
    let maybe_number: Option<f64> = s.trim().parse().ok();
    if let Some(number) = maybe_number {
        return Ok((number, FreqFormat::NoUnit));
    };

    // That didn't work; let's search over our supported formats.
    let suffix = unit_suffix(s);
    for freq_format in FreqFormat::iter().filter(|&ff| ff != FreqFormat::NoUnit) {
        let freq_format_str: &'static str = freq_format.into();
        if suffix.to_uppercase() == freq_format_str.to_uppercase() {
            let number = unit_prefix(s)
                .parse()
                .map_err(|_| UnitParseError::GotFreqUnitButCantParse(s.to_string()))?;
            return Ok((number, freq_format));
        }
    }

    Err(UnitParseError::Unknown {
        input: s.to_string(),
        unit_type: "frequency",
    })
}

fn unit_suffix(s: &str) -> &str {
    s.trim()
        .trim_start_matches(|c| char::is_numeric(c) || c == '.' || c == '-' || c == '+')
        .trim()
}

fn unit_prefix(s: &str) -> &str {
    s.trim().trim_end_matches(char::is_alphabetic).trim()
}
