// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Typed, but unresolved, document sections.
//!
//! Apart from the handful of fields every document must have, everything is
//! optional; a key being absent and a key being null both deserialise to
//! `None`. Times and frequencies are converted to seconds and Hz here. The
//! validator has already checked types and group constraints by the time these
//! are made, so the resolver only has to apply defaults.

use std::path::PathBuf;

use serde::{de::Error, Deserialize, Deserializer};

use crate::{params::*, unit_parsing::Quantity};

fn hz<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let q: Quantity = Deserialize::deserialize(d)?;
    q.to_hz().map_err(D::Error::custom)
}

fn opt_hz<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let q: Option<Quantity> = Deserialize::deserialize(d)?;
    q.map(|q| q.to_hz()).transpose().map_err(D::Error::custom)
}

fn opt_seconds<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let q: Option<Quantity> = Deserialize::deserialize(d)?;
    q.map(|q| q.to_seconds()).transpose().map_err(D::Error::custom)
}

/// A value that may be written either alone or as a list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(t) => vec![t],
            OneOrMany::Many(v) => v,
        }
    }
}

/// The `telescope`, `obsparm` and `fgparm` sections have required fields, so
/// they must be present; every other section may be left out.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct DocumentArgs {
    #[serde(default)]
    pub(crate) directory: DirectoryArgs,
    #[serde(default)]
    pub(crate) project: ProjectArgs,
    pub(crate) telescope: TelescopeArgs,
    #[serde(default)]
    pub(crate) array: ArrayArgs,
    #[serde(default)]
    pub(crate) baseline: BaselineArgs,
    #[serde(default)]
    pub(crate) antenna: AntennaArgs,
    #[serde(default)]
    pub(crate) phasedarray: PhasedArrayArgs,
    #[serde(default)]
    pub(crate) achrmbeam: AchrmBeamArgs,
    #[serde(default)]
    pub(crate) chrmbeam: ChrmBeamArgs,
    pub(crate) obsparm: ObsParmArgs,
    #[serde(default)]
    pub(crate) snapshot: SnapshotArgs,
    #[serde(default)]
    pub(crate) pointing: PointingArgs,
    pub(crate) fgparm: FgParmArgs,
    #[serde(default)]
    pub(crate) catalog: CatalogArgs,
    #[serde(default)]
    pub(crate) eorparm: EorParmArgs,
    #[serde(default)]
    pub(crate) processing: ProcessingArgs,
    #[serde(default)]
    pub(crate) clean: CleanArgs,
    #[serde(default)]
    pub(crate) subband: SubbandArgs,
    #[serde(default)]
    pub(crate) reflectometry: ReflectometryArgs,
    #[serde(default)]
    pub(crate) beam_modification: BeamModificationArgs,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct DirectoryArgs {
    pub(crate) rootdir: Option<PathBuf>,
    pub(crate) figdir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct ProjectArgs {
    pub(crate) name: Option<String>,
    pub(crate) simid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct TelescopeArgs {
    pub(crate) id: TelescopeId,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    #[serde(rename = "Tsys")]
    pub(crate) tsys: f64,
    pub(crate) pfb_method: Option<PfbMethod>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct ArrayArgs {
    pub(crate) file: Option<PathBuf>,
    pub(crate) layout: Option<NamedLayout>,
    #[serde(rename = "minR")]
    pub(crate) min_r: Option<f64>,
    #[serde(rename = "maxR")]
    pub(crate) max_r: Option<f64>,
    pub(crate) redundant: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct BaselineArgs {
    pub(crate) min: Option<f64>,
    pub(crate) max: Option<f64>,
    pub(crate) direction: Option<OneOrMany<BaselineDirection>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct AntennaArgs {
    pub(crate) shape: Option<ElementShape>,
    pub(crate) size: Option<f64>,
    pub(crate) ocoords: Option<OrientationCoords>,
    pub(crate) orientation: Option<Vec<f64>>,
    pub(crate) ground_plane: Option<f64>,
    pub(crate) phased_array: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct PhasedArrayArgs {
    pub(crate) file: Option<PathBuf>,
    pub(crate) delayerr: Option<f64>,
    pub(crate) gainerr: Option<f64>,
    pub(crate) nrand: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct AchrmBeamArgs {
    pub(crate) identifier: Option<String>,
    pub(crate) file: Option<PathBuf>,
    #[serde(deserialize_with = "opt_hz")]
    pub(crate) select_freq: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct ChrmBeamArgs {
    pub(crate) identifier: Option<String>,
    pub(crate) file: Option<PathBuf>,
    pub(crate) spec_interp: Option<SpecInterp>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ObsParmArgs {
    #[serde(deserialize_with = "hz")]
    pub(crate) freq: f64,
    #[serde(deserialize_with = "hz")]
    pub(crate) freq_resolution: f64,
    pub(crate) nchan: usize,
    pub(crate) obs_date: Option<String>,
    pub(crate) obs_mode: Option<ObsMode>,
    #[serde(default, deserialize_with = "opt_seconds")]
    pub(crate) t_obs: Option<f64>,
    pub(crate) n_acc: Option<usize>,
    #[serde(default, deserialize_with = "opt_seconds")]
    pub(crate) t_acc: Option<f64>,
    pub(crate) timeformat: Option<TimestampFormat>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct SnapshotArgs {
    pub(crate) all: Option<bool>,
    pub(crate) avg_drifts: Option<bool>,
    pub(crate) beam_switch: Option<bool>,
    pub(crate) pick: Option<Vec<usize>>,
    pub(crate) range: Option<Vec<usize>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct PointingArgs {
    pub(crate) file: Option<PathBuf>,
    pub(crate) drift_init: Option<DriftInitArgs>,
    pub(crate) track_init: Option<TrackInitArgs>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct DriftInitArgs {
    pub(crate) alt: Option<f64>,
    pub(crate) az: Option<f64>,
    pub(crate) ha: Option<f64>,
    pub(crate) dec: Option<f64>,
    pub(crate) lst: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct TrackInitArgs {
    pub(crate) ra: f64,
    pub(crate) dec: f64,
    pub(crate) ha: Option<f64>,
    pub(crate) epoch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct FgParmArgs {
    pub(crate) model: FgModel,
    pub(crate) nside: Option<u32>,
    pub(crate) spindex: Option<f64>,
    pub(crate) spindex_rms: Option<f64>,
    pub(crate) spindex_seed: Option<i64>,
    pub(crate) flux_unit: Option<FluxUnit>,
    pub(crate) epoch: Option<String>,
    #[serde(default, deserialize_with = "opt_hz")]
    pub(crate) model_freq: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct CatalogArgs {
    pub(crate) filepathtype: Option<CatalogPathType>,
    #[serde(rename = "DSM_file_prefix")]
    pub(crate) dsm_file_prefix: Option<PathBuf>,
    #[serde(rename = "SUMSS_file")]
    pub(crate) sumss_file: Option<PathBuf>,
    #[serde(rename = "NVSS_file")]
    pub(crate) nvss_file: Option<PathBuf>,
    #[serde(rename = "MWACS_file")]
    pub(crate) mwacs_file: Option<PathBuf>,
    #[serde(rename = "GLEAM_file")]
    pub(crate) gleam_file: Option<PathBuf>,
    pub(crate) custom_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct EorParmArgs {
    pub(crate) model: Option<EorModelKind>,
    pub(crate) nside: Option<u32>,
    pub(crate) spindex: Option<f64>,
    pub(crate) spindex_rms: Option<f64>,
    pub(crate) spindex_seed: Option<i64>,
    pub(crate) lidz: Option<bool>,
    #[serde(rename = "21cmfast")]
    pub(crate) twentyone_cmfast: Option<bool>,
    pub(crate) lidz_modelfile: Option<PathBuf>,
    #[serde(rename = "21cmfast_modelfile")]
    pub(crate) twentyone_cmfast_modelfile: Option<PathBuf>,
    #[serde(rename = "global_EoR_parms")]
    pub(crate) global_eor_parms: Option<[f64; 3]>,
    #[serde(deserialize_with = "opt_hz")]
    pub(crate) cube_freq: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct ProcessingArgs {
    pub(crate) bl_chunk_size: Option<usize>,
    pub(crate) n_bl_chunks: Option<usize>,
    pub(crate) bl_chunk: Option<Vec<usize>>,
    pub(crate) n_sky_sectors: Option<usize>,
    pub(crate) bpass_shape: Option<BandpassShape>,
    pub(crate) f_pad: Option<f64>,
    pub(crate) memuse: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct CleanArgs {
    pub(crate) pad: Option<f64>,
    pub(crate) clean_window_buffer: Option<f64>,
    pub(crate) tol: Option<f64>,
    pub(crate) maxiter: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct SubbandArgs {
    pub(crate) freq_center: Option<Vec<f64>>,
    pub(crate) bw_eff: Option<Vec<f64>>,
    pub(crate) shape: Option<BandpassShape>,
    pub(crate) fftpow: Option<f64>,
    pub(crate) pad: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct ReflectometryArgs {
    pub(crate) action: Option<bool>,
    pub(crate) cable_length: Option<f64>,
    pub(crate) reflection_coefficient: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct BeamModificationArgs {
    pub(crate) coords: Option<RegionCoords>,
    pub(crate) positions: Option<Vec<[f64; 2]>>,
    pub(crate) angular_radius: Option<Vec<f64>>,
    pub(crate) snapshots: Option<Vec<usize>>,
    pub(crate) factors: Option<Vec<f64>>,
}
