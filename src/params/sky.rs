// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Resolved sky-model parameters.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, EnumVariantNames};

/// Foreground sky models.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumVariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FgModel {
    /// All-sky model; the diffuse model plus point sources.
    Asm,
    /// Diffuse sky model.
    Dsm,
    /// Compact sky model; NVSS and SUMSS point sources.
    Csm,
    Nvss,
    Sumss,
    Gleam,
    Mwacs,
    Custom,
    /// Uniform sky model.
    Usm,
    /// Molonglo sky survey.
    Mss,
    #[serde(rename = "HI_cube")]
    #[strum(serialize = "HI_cube")]
    HiCube,
    #[serde(rename = "HI_monopole")]
    #[strum(serialize = "HI_monopole")]
    HiMonopole,
    #[serde(rename = "HI_fluctuations")]
    #[strum(serialize = "HI_fluctuations")]
    HiFluctuations,
}

impl FgModel {
    /// Is this model a HEALPix map (and therefore needs an nside)?
    pub fn is_healpix(self) -> bool {
        matches!(
            self,
            FgModel::Asm
                | FgModel::Dsm
                | FgModel::Usm
                | FgModel::Mss
                | FgModel::HiCube
                | FgModel::HiMonopole
                | FgModel::HiFluctuations
        )
    }

    /// The `catalog` keys that must be set for this model.
    pub fn required_catalog_files(self) -> &'static [&'static str] {
        match self {
            FgModel::Asm => &["DSM_file_prefix", "NVSS_file", "SUMSS_file"],
            FgModel::Dsm => &["DSM_file_prefix"],
            FgModel::Csm => &["NVSS_file", "SUMSS_file"],
            FgModel::Nvss => &["NVSS_file"],
            FgModel::Sumss => &["SUMSS_file"],
            FgModel::Gleam => &["GLEAM_file"],
            FgModel::Mwacs => &["MWACS_file"],
            FgModel::Custom => &["custom_file"],
            FgModel::Usm
            | FgModel::Mss
            | FgModel::HiCube
            | FgModel::HiMonopole
            | FgModel::HiFluctuations => &[],
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumVariantNames,
)]
pub enum FluxUnit {
    Jy,
    K,
}

/// Models of the 21 cm signal from the Epoch of Reionisation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumVariantNames,
)]
pub enum EorModelKind {
    #[serde(rename = "HI_cube")]
    #[strum(serialize = "HI_cube")]
    HiCube,
    #[serde(rename = "HI_monopole")]
    #[strum(serialize = "HI_monopole")]
    HiMonopole,
    #[serde(rename = "HI_fluctuations")]
    #[strum(serialize = "HI_fluctuations")]
    HiFluctuations,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralIndex {
    pub mean: Option<f64>,
    pub rms: f64,
    pub seed: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForegroundModel {
    pub model: FgModel,
    pub nside: Option<u32>,
    pub spindex: SpectralIndex,
    pub flux_unit: FluxUnit,

    /// The epoch of the catalog coordinates, e.g. "J2000".
    pub epoch: Option<String>,

    /// The frequency at which the model is evaluated [Hz].
    pub model_freq: f64,
}

/// The simulations an HI cube is generated from.
#[derive(Debug, Clone, PartialEq)]
pub enum EorGenerator {
    Lidz { modelfile: Option<PathBuf> },
    TwentyOneCmFast { modelfile: Option<PathBuf> },
}

impl EorGenerator {
    pub fn modelfile(&self) -> Option<&Path> {
        match self {
            EorGenerator::Lidz { modelfile } | EorGenerator::TwentyOneCmFast { modelfile } => {
                modelfile.as_deref()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EorModel {
    pub model: EorModelKind,
    pub nside: u32,
    pub spindex: SpectralIndex,
    pub generator: EorGenerator,

    /// Parameters of a global (tanh) reionisation history: the brightness
    /// temperature, the frequency of half ionisation and the redshift width.
    pub global_parms: Option<[f64; 3]>,

    /// The frequency of the HI cube [Hz].
    pub cube_freq: f64,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumVariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CatalogPathType {
    Default,
    Custom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPaths {
    /// If true, the paths below are relative to the simulator's data
    /// directory rather than the working directory.
    pub relative_to_data_dir: bool,

    pub dsm_file_prefix: Option<PathBuf>,
    pub sumss_file: Option<PathBuf>,
    pub nvss_file: Option<PathBuf>,
    pub mwacs_file: Option<PathBuf>,
    pub gleam_file: Option<PathBuf>,
    pub custom_file: Option<PathBuf>,
}

impl CatalogPaths {
    /// Get the full path of a catalog file, given the simulator's data
    /// directory.
    pub fn full_path(&self, data_dir: &Path, file: &Path) -> PathBuf {
        if self.relative_to_data_dir {
            data_dir.join(file)
        } else {
            file.to_path_buf()
        }
    }
}
