// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Resolved parameters describing the telescope, its array and its antenna
//! elements.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, EnumVariantNames};

use crate::constants::*;

/// Telescopes known to the simulator.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumVariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TelescopeId {
    Mwa,
    Vla,
    Gmrt,
    Hera,
    MwaDipole,
    Custom,
    PaperDipole,
    MwaTools,
}

impl TelescopeId {
    /// Some telescopes have fixed antenna elements; the element shape and
    /// size written in a document are ignored for these.
    pub fn fixed_element(self) -> Option<(ElementShape, f64)> {
        match self {
            TelescopeId::Mwa | TelescopeId::MwaDipole => {
                Some((ElementShape::Dipole, MWA_DIPOLE_SIZE_M))
            }
            TelescopeId::Vla => Some((ElementShape::Dish, VLA_DISH_SIZE_M)),
            TelescopeId::Gmrt => Some((ElementShape::Dish, GMRT_DISH_SIZE_M)),
            TelescopeId::Hera => Some((ElementShape::Dish, HERA_DISH_SIZE_M)),
            TelescopeId::Custom | TelescopeId::PaperDipole | TelescopeId::MwaTools => None,
        }
    }

    /// MWA tiles are always phased arrays of dipoles.
    pub fn forces_phased_array(self) -> bool {
        matches!(self, TelescopeId::Mwa)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumVariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PfbMethod {
    Empirical,
    Theoretical,
}

/// Named antenna layouts that the simulator can generate itself.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumVariantNames,
)]
pub enum NamedLayout {
    #[serde(rename = "MWA-128T")]
    #[strum(serialize = "MWA-128T")]
    Mwa128T,
    #[serde(rename = "HERA-7")]
    #[strum(serialize = "HERA-7")]
    Hera7,
    #[serde(rename = "HERA-19")]
    #[strum(serialize = "HERA-19")]
    Hera19,
    #[serde(rename = "HERA-37")]
    #[strum(serialize = "HERA-37")]
    Hera37,
    #[serde(rename = "HERA-61")]
    #[strum(serialize = "HERA-61")]
    Hera61,
    #[serde(rename = "HERA-91")]
    #[strum(serialize = "HERA-91")]
    Hera91,
    #[serde(rename = "HERA-127")]
    #[strum(serialize = "HERA-127")]
    Hera127,
    #[serde(rename = "HERA-169")]
    #[strum(serialize = "HERA-169")]
    Hera169,
    #[serde(rename = "HERA-217")]
    #[strum(serialize = "HERA-217")]
    Hera217,
    #[serde(rename = "HERA-271")]
    #[strum(serialize = "HERA-271")]
    Hera271,
    #[serde(rename = "HERA-331")]
    #[strum(serialize = "HERA-331")]
    Hera331,
    /// A circular layout between two radii.
    #[serde(rename = "CIRC")]
    #[strum(serialize = "CIRC")]
    Circ,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayLayout {
    /// Antenna positions are read from a file.
    File(PathBuf),

    Named {
        layout: NamedLayout,

        /// Inner radius of a CIRC layout [metres].
        min_r: Option<f64>,

        /// Outer radius of a CIRC layout [metres].
        max_r: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    pub layout: ArrayLayout,

    /// Only keep one baseline out of every redundant group.
    pub redundant: bool,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumVariantNames,
)]
pub enum BaselineDirection {
    SE,
    E,
    NE,
    N,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BaselineSelection {
    /// Shortest baseline to keep [metres].
    pub min: Option<f64>,

    /// Longest baseline to keep [metres].
    pub max: Option<f64>,

    /// Only keep baselines oriented in these directions. Empty means all
    /// directions are kept.
    pub directions: Vec<BaselineDirection>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumVariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ElementShape {
    Dish,
    Dipole,
    Delta,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumVariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrientationCoords {
    Altaz,
    Dircos,
}

/// The orientation of an antenna element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Orientation {
    /// Altitude and azimuth [degrees].
    AltAz([f64; 2]),

    /// Direction cosines.
    DirCos([f64; 3]),
}

impl Orientation {
    pub fn coords(&self) -> OrientationCoords {
        match self {
            Orientation::AltAz(_) => OrientationCoords::Altaz,
            Orientation::DirCos(_) => OrientationCoords::Dircos,
        }
    }

    pub fn components(&self) -> &[f64] {
        match self {
            Orientation::AltAz(c) => c,
            Orientation::DirCos(c) => c,
        }
    }
}

/// Errors in the phased-array beamformer.
#[derive(Debug, Clone, PartialEq)]
pub struct PhasedArray {
    /// The file describing the positions of the elements of the phased array.
    pub file: Option<PathBuf>,

    /// RMS of the delay error [ns].
    pub delayerr: f64,

    /// RMS of the gain error [dB].
    pub gainerr: f64,

    /// The number of random realisations of the errors. This is always 1 if
    /// there are no errors.
    pub nrand: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AntennaElement {
    pub shape: ElementShape,

    /// The size of the element [metres]. Delta elements have no size.
    pub size: Option<f64>,

    pub orientation: Orientation,

    /// Height of the element above a ground plane [metres], if there is one.
    pub ground_plane: Option<f64>,

    pub phased_array: Option<PhasedArray>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Telescope {
    pub id: TelescopeId,

    /// [degrees]
    pub latitude: f64,

    /// [degrees]
    pub longitude: f64,

    /// System temperature [K].
    pub tsys: f64,

    pub pfb_method: Option<PfbMethod>,
}

/// A beam read from a file instead of being generated.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalBeam {
    pub identifier: String,
    pub file: PathBuf,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumVariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpecInterp {
    Linear,
    Bnearest,
    Fft,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AchromaticBeam {
    pub external: Option<ExternalBeam>,

    /// The frequency at which the beam is evaluated [Hz].
    pub select_freq: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChromaticBeam {
    pub external: ExternalBeam,
    pub spec_interp: SpecInterp,
}
