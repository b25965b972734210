// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Resolved parameters for processing the simulated data, and for what gets
//! done with it afterwards.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use strum_macros::{Display, EnumString, EnumVariantNames};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directories {
    pub rootdir: Option<PathBuf>,
    pub figdir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    pub name: Option<String>,

    /// Identifies the simulation within the project.
    pub simid: Option<String>,
}

/// Window functions applied along the frequency axis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumVariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BandpassShape {
    /// Rectangular.
    Rect,
    /// Blackman-Nuttall.
    Bnw,
    /// Blackman-Harris.
    Bhw,
}

/// Which chunks of baselines get processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkSelection {
    All,

    /// Only the first this-many chunks.
    First(usize),

    Indices(Vec<usize>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Processing {
    /// The number of baselines in a chunk.
    pub bl_chunk_size: usize,

    pub chunks: ChunkSelection,

    pub n_sky_sectors: usize,

    pub bpass_shape: BandpassShape,

    /// Zero-padding fraction along the frequency axis.
    pub f_pad: f64,

    /// Memory available to the simulator [GB].
    pub memuse: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clean {
    pub pad: f64,
    pub window_buffer: f64,
    pub tol: f64,
    pub maxiter: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Subband {
    /// [Hz]
    pub freq_center: f64,

    /// Effective bandwidth [Hz].
    pub bw_eff: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subbands {
    pub bands: Vec<Subband>,
    pub shape: BandpassShape,
    pub fftpow: f64,
    pub pad: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reflectometry {
    pub action: bool,

    /// [metres]
    pub cable_length: Option<f64>,

    pub reflection_coefficient: Option<f64>,
}

/// One plot the plotting tool may produce. The parameters are passed through
/// untouched, and are only meaningful when `action` is true.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotDirective {
    pub action: bool,
    pub params: IndexMap<String, Value>,
}
