// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Resolved parameters describing what is observed, when, and for how long.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, EnumVariantNames};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumVariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ObsMode {
    Drift,
    Track,
    Dns,
    Lstbin,
    Custom,
}

/// How timestamps are written by the simulator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumVariantNames,
)]
pub enum TimestampFormat {
    JD,
    ISO,
}

/// The member of the accumulation triple that was derived from the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AccumulationField {
    #[strum(serialize = "t_obs")]
    TObs,

    #[strum(serialize = "n_acc")]
    NAcc,

    #[strum(serialize = "t_acc")]
    TAcc,
}

/// The resolved accumulation triple. `t_obs == n_acc * t_acc` within
/// [`crate::constants::ACCUMULATION_REL_TOLERANCE`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accumulation {
    /// Total observing time [seconds].
    pub t_obs: f64,

    /// The number of accumulations (snapshots).
    pub n_acc: usize,

    /// The length of a single accumulation [seconds].
    pub t_acc: f64,

    pub derived: AccumulationField,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Centre frequency [Hz].
    pub freq: f64,

    /// Channel width [Hz].
    pub freq_resolution: f64,

    pub nchan: usize,

    pub obs_date: Option<NaiveDateTime>,

    pub obs_mode: ObsMode,

    pub accumulation: Accumulation,

    pub timeformat: TimestampFormat,
}

/// Which snapshots of an observation are simulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSelection {
    All,

    /// Average over drift scans (drift-and-shift observations only).
    AverageDrifts,

    /// Use one snapshot per beam switch (drift-and-shift observations only).
    BeamSwitch,

    Pick(Vec<usize>),

    /// An inclusive range of snapshot indices.
    Range { first: usize, last: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriftDirection {
    /// [degrees]
    AltAz { alt: f64, az: f64 },

    /// [degrees]
    HaDec { ha: f64, dec: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftInit {
    pub direction: DriftDirection,

    /// The local sidereal time at the start of the observation [hours].
    pub lst: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackInit {
    /// [degrees]
    pub ra: f64,

    /// [degrees]
    pub dec: f64,

    /// Initial hour angle [degrees].
    pub ha: Option<f64>,

    pub epoch: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pointing {
    /// Pointings are read from a file.
    File(PathBuf),

    Drift(DriftInit),

    Track(TrackInit),
}

impl Pointing {
    /// The observing mode implied by an initialisation block.
    pub fn implied_mode(&self) -> Option<ObsMode> {
        match self {
            Pointing::File(_) => None,
            Pointing::Drift(_) => Some(ObsMode::Drift),
            Pointing::Track(_) => Some(ObsMode::Track),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumVariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RegionCoords {
    Altaz,
    Radec,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkyPosition {
    /// [degrees]
    AltAz { az: f64, alt: f64 },

    /// [degrees]
    RaDec { ra: f64, dec: f64 },
}

impl SkyPosition {
    /// The position as it's written in a document; `(az, alt)` or `(ra, dec)`.
    pub fn pair(&self) -> [f64; 2] {
        match *self {
            SkyPosition::AltAz { az, alt } => [az, alt],
            SkyPosition::RaDec { ra, dec } => [ra, dec],
        }
    }
}

/// A region of sky in which the primary beam is modified during one
/// snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub position: SkyPosition,

    /// [degrees]
    pub angular_radius: f64,

    /// The index of the snapshot the modification applies to.
    pub snapshot: usize,

    /// The factor the beam is scaled by inside the region.
    pub factor: f64,
}
