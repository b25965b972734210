// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writing a [`RunConfig`] back out as a parameter document.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use super::*;

fn section<const N: usize>(fields: [(&str, Value); N]) -> Value {
    Value::Mapping(
        fields
            .into_iter()
            .map(|(k, v)| (Value::from(k), v))
            .collect::<Mapping>(),
    )
}

fn opt<T: Into<Value>>(v: Option<T>) -> Value {
    v.map(Into::into).unwrap_or(Value::Null)
}

fn path<P: AsRef<Path>>(p: Option<P>) -> Value {
    opt(p.map(|p| p.as_ref().display().to_string()))
}

fn string<T: ToString>(t: T) -> Value {
    Value::String(t.to_string())
}

/// A list, or null if it's empty.
fn list<T: Into<Value>>(items: Vec<T>) -> Value {
    if items.is_empty() {
        Value::Null
    } else {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl RunConfig {
    /// Write out these parameters as a document that validates and resolves
    /// back to an identical `RunConfig` (given the same provenance).
    ///
    /// Times are written in seconds and frequencies in Hz. Defaults are
    /// written out explicitly, except that the derived member of the
    /// accumulation triple is null. Only the pointing that is in use is
    /// written.
    pub fn to_document(&self) -> Value {
        let mut doc = Mapping::new();
        let mut add = |name: &str, value: Value| {
            doc.insert(Value::from(name), value);
        };

        add(
            "directory",
            section([
                ("rootdir", path(self.directories.rootdir.as_ref())),
                ("figdir", path(self.directories.figdir.as_ref())),
            ]),
        );
        add(
            "project",
            section([
                ("name", opt(self.project.name.clone())),
                ("simid", opt(self.project.simid.clone())),
            ]),
        );

        let t = &self.telescope;
        add(
            "telescope",
            section([
                ("id", string(t.id)),
                ("latitude", t.latitude.into()),
                ("longitude", t.longitude.into()),
                ("Tsys", t.tsys.into()),
                ("pfb_method", opt(t.pfb_method.map(|m| m.to_string()))),
            ]),
        );

        let (file, layout, min_r, max_r) = match &self.array.layout {
            ArrayLayout::File(f) => (Some(f), None, None, None),
            ArrayLayout::Named {
                layout,
                min_r,
                max_r,
            } => (None, Some(layout.to_string()), *min_r, *max_r),
        };
        add(
            "array",
            section([
                ("file", path(file)),
                ("layout", opt(layout)),
                ("minR", opt(min_r)),
                ("maxR", opt(max_r)),
                ("redundant", self.array.redundant.into()),
            ]),
        );

        add(
            "baseline",
            section([
                ("min", opt(self.baseline.min)),
                ("max", opt(self.baseline.max)),
                (
                    "direction",
                    list(
                        self.baseline
                            .directions
                            .iter()
                            .map(|d| d.to_string())
                            .collect(),
                    ),
                ),
            ]),
        );

        self.add_antenna(&mut add);

        let beam = &self.achromatic_beam;
        add(
            "achrmbeam",
            section([
                (
                    "identifier",
                    opt(beam.external.as_ref().map(|e| e.identifier.clone())),
                ),
                ("file", path(beam.external.as_ref().map(|e| &e.file))),
                ("select_freq", beam.select_freq.into()),
            ]),
        );
        let chrm = self.chromatic_beam.as_ref();
        add(
            "chrmbeam",
            section([
                (
                    "identifier",
                    opt(chrm.map(|c| c.external.identifier.clone())),
                ),
                ("file", path(chrm.map(|c| &c.external.file))),
                (
                    "spec_interp",
                    opt(chrm.map(|c| c.spec_interp.to_string())),
                ),
            ]),
        );

        let obs = &self.observation;
        let acc = &obs.accumulation;
        let derived = |field: AccumulationField, v: Value| {
            if acc.derived == field {
                Value::Null
            } else {
                v
            }
        };
        add(
            "obsparm",
            section([
                ("freq", obs.freq.into()),
                ("freq_resolution", obs.freq_resolution.into()),
                ("nchan", obs.nchan.into()),
                (
                    "obs_date",
                    opt(obs
                        .obs_date
                        .map(|d| d.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
                ),
                ("obs_mode", string(obs.obs_mode)),
                ("t_obs", derived(AccumulationField::TObs, acc.t_obs.into())),
                ("n_acc", derived(AccumulationField::NAcc, acc.n_acc.into())),
                ("t_acc", derived(AccumulationField::TAcc, acc.t_acc.into())),
                ("timeformat", string(obs.timeformat)),
            ]),
        );

        let flag = |s: SnapshotSelection| Value::Bool(self.snapshots == s);
        let (pick, range) = match &self.snapshots {
            SnapshotSelection::Pick(p) => (list(p.clone()), Value::Null),
            SnapshotSelection::Range { first, last } => (Value::Null, list(vec![*first, *last])),
            _ => (Value::Null, Value::Null),
        };
        add(
            "snapshot",
            section([
                ("all", flag(SnapshotSelection::All)),
                ("avg_drifts", flag(SnapshotSelection::AverageDrifts)),
                ("beam_switch", flag(SnapshotSelection::BeamSwitch)),
                ("pick", pick),
                ("range", range),
            ]),
        );

        add("pointing", self.pointing_section());

        let fg = &self.foreground;
        add(
            "fgparm",
            section([
                ("model", string(fg.model)),
                ("nside", opt(fg.nside)),
                ("spindex", opt(fg.spindex.mean)),
                ("spindex_rms", fg.spindex.rms.into()),
                ("spindex_seed", opt(fg.spindex.seed)),
                ("flux_unit", string(fg.flux_unit)),
                ("epoch", opt(fg.epoch.clone())),
                ("model_freq", fg.model_freq.into()),
            ]),
        );

        let cat = &self.catalog;
        let filepathtype = if cat.relative_to_data_dir {
            CatalogPathType::Default
        } else {
            CatalogPathType::Custom
        };
        add(
            "catalog",
            section([
                ("filepathtype", string(filepathtype)),
                ("DSM_file_prefix", path(cat.dsm_file_prefix.as_ref())),
                ("SUMSS_file", path(cat.sumss_file.as_ref())),
                ("NVSS_file", path(cat.nvss_file.as_ref())),
                ("MWACS_file", path(cat.mwacs_file.as_ref())),
                ("GLEAM_file", path(cat.gleam_file.as_ref())),
                ("custom_file", path(cat.custom_file.as_ref())),
            ]),
        );

        add("eorparm", self.eor_section());

        let p = &self.processing;
        let (n_bl_chunks, bl_chunk) = match &p.chunks {
            ChunkSelection::All => (Value::Null, Value::Null),
            ChunkSelection::First(n) => (Value::from(*n), Value::Null),
            ChunkSelection::Indices(i) => (Value::Null, list(i.clone())),
        };
        add(
            "processing",
            section([
                ("bl_chunk_size", p.bl_chunk_size.into()),
                ("n_bl_chunks", n_bl_chunks),
                ("bl_chunk", bl_chunk),
                ("n_sky_sectors", p.n_sky_sectors.into()),
                ("bpass_shape", string(p.bpass_shape)),
                ("f_pad", p.f_pad.into()),
                ("memuse", opt(p.memuse)),
            ]),
        );

        let c = &self.clean;
        add(
            "clean",
            section([
                ("pad", c.pad.into()),
                ("clean_window_buffer", c.window_buffer.into()),
                ("tol", c.tol.into()),
                ("maxiter", c.maxiter.into()),
            ]),
        );

        let s = &self.subbands;
        add(
            "subband",
            section([
                (
                    "freq_center",
                    list(s.bands.iter().map(|b| b.freq_center).collect()),
                ),
                ("bw_eff", list(s.bands.iter().map(|b| b.bw_eff).collect())),
                ("shape", string(s.shape)),
                ("fftpow", s.fftpow.into()),
                ("pad", s.pad.into()),
            ]),
        );

        let r = &self.reflectometry;
        add(
            "reflectometry",
            section([
                ("action", r.action.into()),
                ("cable_length", opt(r.cable_length)),
                ("reflection_coefficient", opt(r.reflection_coefficient)),
            ]),
        );

        add("beam_modification", self.regions_section());

        let plots: Mapping = self
            .plots
            .iter()
            .map(|(id, directive)| {
                let mut m = Mapping::new();
                m.insert("action".into(), directive.action.into());
                for (k, v) in &directive.params {
                    m.insert(k.as_str().into(), v.clone());
                }
                (Value::from(id.as_str()), Value::Mapping(m))
            })
            .collect();
        add("plot", Value::Mapping(plots));

        Value::Mapping(doc)
    }

    fn add_antenna<F: FnMut(&str, Value)>(&self, add: &mut F) {
        let a = &self.antenna;
        // Telescopes that force a phased array leave the flag unset so that
        // the file stays optional.
        let phased_array_flag = if self.telescope.id.forces_phased_array() {
            Value::Null
        } else {
            a.phased_array.is_some().into()
        };
        add(
            "antenna",
            section([
                ("shape", string(a.shape)),
                ("size", opt(a.size)),
                ("ocoords", string(a.orientation.coords())),
                ("orientation", list(a.orientation.components().to_vec())),
                ("ground_plane", opt(a.ground_plane)),
                ("phased_array", phased_array_flag),
            ]),
        );

        let pa = a.phased_array.as_ref();
        add(
            "phasedarray",
            section([
                ("file", path(pa.and_then(|pa| pa.file.as_ref()))),
                ("delayerr", opt(pa.map(|pa| pa.delayerr))),
                ("gainerr", opt(pa.map(|pa| pa.gainerr))),
                ("nrand", opt(pa.map(|pa| pa.nrand))),
            ]),
        );
    }

    fn pointing_section(&self) -> Value {
        let (file, drift_init, track_init) = match &self.pointing {
            Pointing::File(f) => (path(Some(f)), Value::Null, Value::Null),

            Pointing::Drift(DriftInit { direction, lst }) => {
                let (alt, az, ha, dec) = match *direction {
                    DriftDirection::AltAz { alt, az } => (Some(alt), Some(az), None, None),
                    DriftDirection::HaDec { ha, dec } => (None, None, Some(ha), Some(dec)),
                };
                let drift = section([
                    ("alt", opt(alt)),
                    ("az", opt(az)),
                    ("ha", opt(ha)),
                    ("dec", opt(dec)),
                    ("lst", (*lst).into()),
                ]);
                (Value::Null, drift, Value::Null)
            }

            Pointing::Track(t) => {
                let track = section([
                    ("ra", t.ra.into()),
                    ("dec", t.dec.into()),
                    ("ha", opt(t.ha)),
                    ("epoch", opt(t.epoch.clone())),
                ]);
                (Value::Null, Value::Null, track)
            }
        };

        section([
            ("file", file),
            ("drift_init", drift_init),
            ("track_init", track_init),
        ])
    }

    fn eor_section(&self) -> Value {
        let e = match &self.eor {
            None => return section([("model", Value::Null)]),
            Some(e) => e,
        };

        let (lidz, cmfast) = match e.generator {
            EorGenerator::Lidz { .. } => (true, false),
            EorGenerator::TwentyOneCmFast { .. } => (false, true),
        };
        let modelfile = path(e.generator.modelfile());
        let (lidz_modelfile, cmfast_modelfile) = if lidz {
            (modelfile, Value::Null)
        } else {
            (Value::Null, modelfile)
        };

        section([
            ("model", string(e.model)),
            ("nside", e.nside.into()),
            ("spindex", opt(e.spindex.mean)),
            ("spindex_rms", e.spindex.rms.into()),
            ("spindex_seed", opt(e.spindex.seed)),
            ("lidz", lidz.into()),
            ("21cmfast", cmfast.into()),
            ("lidz_modelfile", lidz_modelfile),
            ("21cmfast_modelfile", cmfast_modelfile),
            (
                "global_EoR_parms",
                opt(e.global_parms.map(|p| p.to_vec())),
            ),
            ("cube_freq", e.cube_freq.into()),
        ])
    }

    fn regions_section(&self) -> Value {
        let coords = match self.regions.first().map(|r| r.position) {
            Some(SkyPosition::RaDec { .. }) => RegionCoords::Radec,
            _ => RegionCoords::Altaz,
        };
        section([
            ("coords", string(coords)),
            (
                "positions",
                list(
                    self.regions
                        .iter()
                        .map(|r| r.position.pair().to_vec())
                        .collect(),
                ),
            ),
            (
                "angular_radius",
                list(self.regions.iter().map(|r| r.angular_radius).collect()),
            ),
            (
                "snapshots",
                list(self.regions.iter().map(|r| r.snapshot).collect()),
            ),
            (
                "factors",
                list(self.regions.iter().map(|r| r.factor).collect()),
            ),
        ])
    }
}
