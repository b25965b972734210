// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Resolution of validated documents into [`RunConfig`]s.
//!
//! Everything a document leaves out is defaulted here, the accumulation
//! triple is completed, parallel lists are zipped into records, and every
//! mutually-exclusive group becomes a single enum variant. The only thing that
//! can fail is deriving a whole number of accumulations.
//!
//! Resolution never touches shared state. Anything odd but not fatal (e.g.
//! user element sizes overridden by a telescope) is returned to the caller
//! as a warning by [`resolve_with_warnings`].

mod error;

pub use error::InconsistentDerivationError;

use indexmap::IndexMap;
use itertools::izip;
use log::{debug, trace};
use serde_yaml::Value;

use crate::{
    constants::*,
    load::key_to_string,
    params::*,
    validate::{args::*, parse_obs_date, ValidatedDocument},
};

/// Resolve a validated document into the parameters of a run.
pub fn resolve(doc: &ValidatedDocument) -> Result<RunConfig, InconsistentDerivationError> {
    resolve_with_warnings(doc).map(|(config, _)| config)
}

/// Like [`resolve`], but also return the warnings raised while resolving, in
/// the order they were raised.
pub fn resolve_with_warnings(
    doc: &ValidatedDocument,
) -> Result<(RunConfig, Vec<String>), InconsistentDerivationError> {
    let args = doc.args();
    let mut warnings = vec![];
    let source = &doc.provenance().source;
    debug!("Resolving {source}");

    let pointing = resolve_pointing(&args.pointing);
    let observation = resolve_observation(&args.obsparm, &pointing, source)?;
    let freq = observation.freq;

    let config = RunConfig {
        directories: Directories {
            rootdir: args.directory.rootdir.clone(),
            figdir: args.directory.figdir.clone(),
        },
        project: Project {
            name: args.project.name.clone(),
            simid: args.project.simid.clone(),
        },
        telescope: Telescope {
            id: args.telescope.id,
            latitude: args.telescope.latitude,
            longitude: args.telescope.longitude,
            tsys: args.telescope.tsys,
            pfb_method: args.telescope.pfb_method,
        },
        array: resolve_array(&args.array, &mut warnings),
        baseline: BaselineSelection {
            min: args.baseline.min,
            max: args.baseline.max,
            directions: args
                .baseline
                .direction
                .clone()
                .map(|d| d.into_vec())
                .unwrap_or_default(),
        },
        antenna: resolve_antenna(args, &mut warnings),
        achromatic_beam: AchromaticBeam {
            external: external_beam(&args.achrmbeam.identifier, &args.achrmbeam.file),
            select_freq: default_freq(args.achrmbeam.select_freq, freq, "achrmbeam.select_freq"),
        },
        chromatic_beam: external_beam(&args.chrmbeam.identifier, &args.chrmbeam.file)
            .zip(args.chrmbeam.spec_interp)
            .map(|(external, spec_interp)| ChromaticBeam {
                external,
                spec_interp,
            }),
        observation,
        snapshots: resolve_snapshots(&args.snapshot),
        pointing,
        foreground: resolve_foreground(&args.fgparm, freq),
        catalog: resolve_catalog(&args.catalog),
        eor: resolve_eor(&args.eorparm, freq),
        processing: resolve_processing(&args.processing),
        clean: Clean {
            pad: args.clean.pad.unwrap_or(DEFAULT_CLEAN_PAD),
            window_buffer: args
                .clean
                .clean_window_buffer
                .unwrap_or(DEFAULT_CLEAN_WINDOW_BUFFER),
            tol: args.clean.tol.unwrap_or(DEFAULT_CLEAN_TOL),
            maxiter: args.clean.maxiter.unwrap_or(DEFAULT_CLEAN_MAXITER),
        },
        subbands: resolve_subbands(&args.subband),
        reflectometry: Reflectometry {
            action: args.reflectometry.action.unwrap_or(false),
            cable_length: args.reflectometry.cable_length,
            reflection_coefficient: args.reflectometry.reflection_coefficient,
        },
        regions: resolve_regions(&args.beam_modification),
        plots: resolve_plots(doc.raw().root().get("plot")),
        provenance: doc.provenance().clone(),
    };
    trace!("Resolved {source}: {config:?}");
    for warning in &warnings {
        debug!("{source}: {warning}");
    }
    Ok((config, warnings))
}

/// Complete the accumulation triple `t_obs = n_acc * t_acc` from whichever two
/// members were given.
pub(crate) fn derive_accumulation(
    t_obs: Option<f64>,
    n_acc: Option<usize>,
    t_acc: Option<f64>,
    document: &str,
) -> Result<Accumulation, InconsistentDerivationError> {
    let acc = match (t_obs, n_acc, t_acc) {
        (None, Some(n_acc), Some(t_acc)) => Accumulation {
            t_obs: n_acc as f64 * t_acc,
            n_acc,
            t_acc,
            derived: AccumulationField::TObs,
        },

        (Some(t_obs), Some(n_acc), None) => Accumulation {
            t_obs,
            n_acc,
            t_acc: t_obs / n_acc as f64,
            derived: AccumulationField::TAcc,
        },

        (Some(t_obs), None, Some(t_acc)) => {
            let n_acc_exact = t_obs / t_acc;
            let n_acc = n_acc_exact.round();
            if n_acc < 1.0 || (n_acc * t_acc - t_obs).abs() > ACCUMULATION_REL_TOLERANCE * t_obs {
                return Err(InconsistentDerivationError {
                    document: document.to_string(),
                    t_obs,
                    t_acc,
                    n_acc_exact,
                });
            }
            Accumulation {
                t_obs,
                n_acc: n_acc as usize,
                t_acc,
                derived: AccumulationField::NAcc,
            }
        }

        _ => unreachable!("exactly two accumulation fields are set in a validated document"),
    };
    debug!(
        "Derived {} from the other accumulation fields: t_obs = {} s, n_acc = {}, t_acc = {} s",
        acc.derived, acc.t_obs, acc.n_acc, acc.t_acc
    );
    Ok(acc)
}

fn default_freq(freq: Option<f64>, obs_freq: f64, name: &str) -> f64 {
    freq.unwrap_or_else(|| {
        debug!("{name} not given; using obsparm.freq ({obs_freq} Hz)");
        obs_freq
    })
}

fn resolve_observation(
    obsparm: &ObsParmArgs,
    pointing: &Pointing,
    document: &str,
) -> Result<Observation, InconsistentDerivationError> {
    let obs_mode = match obsparm.obs_mode {
        Some(m) => m,
        None => {
            let m = pointing.implied_mode().unwrap_or(ObsMode::Custom);
            debug!("obsparm.obs_mode not given; using {m}");
            m
        }
    };

    Ok(Observation {
        freq: obsparm.freq,
        freq_resolution: obsparm.freq_resolution,
        nchan: obsparm.nchan,
        obs_date: obsparm.obs_date.as_deref().and_then(parse_obs_date),
        obs_mode,
        accumulation: derive_accumulation(obsparm.t_obs, obsparm.n_acc, obsparm.t_acc, document)?,
        timeformat: obsparm.timeformat.unwrap_or(TimestampFormat::JD),
    })
}

fn resolve_pointing(pointing: &PointingArgs) -> Pointing {
    match (&pointing.file, &pointing.drift_init, &pointing.track_init) {
        (Some(file), _, _) => Pointing::File(file.clone()),

        (None, Some(d), _) => {
            let direction = match (d.alt, d.az, d.ha, d.dec) {
                (Some(alt), Some(az), _, _) => DriftDirection::AltAz { alt, az },
                (_, _, Some(ha), Some(dec)) => DriftDirection::HaDec { ha, dec },
                _ => unreachable!("drift_init has a complete direction in a validated document"),
            };
            Pointing::Drift(DriftInit {
                direction,
                lst: d.lst,
            })
        }

        (None, None, Some(t)) => Pointing::Track(TrackInit {
            ra: t.ra,
            dec: t.dec,
            ha: t.ha,
            epoch: t.epoch.clone(),
        }),

        (None, None, None) => unreachable!("a validated document has a pointing"),
    }
}

fn resolve_array(array: &ArrayArgs, warnings: &mut Vec<String>) -> Array {
    let layout = match (&array.file, array.layout) {
        (Some(file), _) => ArrayLayout::File(file.clone()),

        (None, Some(NamedLayout::Circ)) => ArrayLayout::Named {
            layout: NamedLayout::Circ,
            min_r: array.min_r,
            max_r: array.max_r,
        },

        (None, Some(layout)) => {
            if array.min_r.is_some() || array.max_r.is_some() {
                warnings.push(format!(
                    "array.minR and array.maxR are only used by CIRC layouts; ignoring them for {layout}"
                ));
            }
            ArrayLayout::Named {
                layout,
                min_r: None,
                max_r: None,
            }
        }

        (None, None) => unreachable!("a validated document has an array file or layout"),
    };

    Array {
        layout,
        redundant: array.redundant.unwrap_or(false),
    }
}

fn default_orientation(shape: ElementShape, coords: OrientationCoords) -> Orientation {
    match (shape, coords) {
        (ElementShape::Dipole, OrientationCoords::Altaz) => {
            Orientation::AltAz(DIPOLE_ALTAZ_ORIENTATION)
        }
        (ElementShape::Dipole, OrientationCoords::Dircos) => {
            Orientation::DirCos(DIPOLE_DIRCOS_ORIENTATION)
        }
        (_, OrientationCoords::Altaz) => Orientation::AltAz(APERTURE_ALTAZ_ORIENTATION),
        (_, OrientationCoords::Dircos) => Orientation::DirCos(APERTURE_DIRCOS_ORIENTATION),
    }
}

fn resolve_antenna(args: &DocumentArgs, warnings: &mut Vec<String>) -> AntennaElement {
    let id = args.telescope.id;
    let antenna = &args.antenna;

    let (shape, size) = match id.fixed_element() {
        Some((shape, size)) => {
            if antenna.shape.map_or(false, |s| s != shape)
                || antenna.size.map_or(false, |s| s != size)
            {
                warnings.push(format!(
                    "Telescope {id} has {size} m {shape} elements; ignoring antenna.shape and antenna.size"
                ));
            }
            (shape, Some(size))
        }

        None => match antenna.shape.unwrap_or(ElementShape::Delta) {
            ElementShape::Delta => (ElementShape::Delta, None),
            shape => (shape, antenna.size),
        },
    };

    let coords = antenna.ocoords.unwrap_or(OrientationCoords::Altaz);
    let orientation = match (coords, antenna.orientation.as_deref()) {
        (OrientationCoords::Altaz, Some(&[alt, az])) => Orientation::AltAz([alt, az]),
        (OrientationCoords::Dircos, Some(&[x, y, z])) => Orientation::DirCos([x, y, z]),
        _ => default_orientation(shape, coords),
    };

    let phased_array = if id.forces_phased_array() || antenna.phased_array == Some(true) {
        if antenna.phased_array == Some(false) {
            warnings.push(format!(
                "Telescope {id} always has phased-array elements; ignoring antenna.phased_array"
            ));
        }
        let pa = &args.phasedarray;
        let delayerr = pa.delayerr.unwrap_or(0.0);
        let gainerr = pa.gainerr.unwrap_or(0.0);
        // Without errors, every realisation is the same.
        let nrand = if delayerr == 0.0 && gainerr == 0.0 {
            1
        } else {
            pa.nrand.unwrap_or(1)
        };
        Some(PhasedArray {
            file: pa.file.clone(),
            delayerr,
            gainerr,
            nrand,
        })
    } else {
        None
    };

    AntennaElement {
        shape,
        size,
        orientation,
        ground_plane: antenna.ground_plane,
        phased_array,
    }
}

fn external_beam(
    identifier: &Option<String>,
    file: &Option<std::path::PathBuf>,
) -> Option<ExternalBeam> {
    match (identifier, file) {
        (Some(identifier), Some(file)) => Some(ExternalBeam {
            identifier: identifier.clone(),
            file: file.clone(),
        }),
        _ => None,
    }
}

fn resolve_snapshots(snapshot: &SnapshotArgs) -> SnapshotSelection {
    if snapshot.avg_drifts == Some(true) {
        SnapshotSelection::AverageDrifts
    } else if snapshot.beam_switch == Some(true) {
        SnapshotSelection::BeamSwitch
    } else if let Some(pick) = &snapshot.pick {
        SnapshotSelection::Pick(pick.clone())
    } else if let Some(&[first, last]) = snapshot.range.as_deref() {
        SnapshotSelection::Range { first, last }
    } else {
        SnapshotSelection::All
    }
}

fn resolve_foreground(fgparm: &FgParmArgs, freq: f64) -> ForegroundModel {
    ForegroundModel {
        model: fgparm.model,
        nside: fgparm.nside,
        spindex: SpectralIndex {
            mean: fgparm.spindex,
            rms: fgparm.spindex_rms.unwrap_or(0.0),
            seed: fgparm.spindex_seed,
        },
        flux_unit: fgparm.flux_unit.unwrap_or(FluxUnit::Jy),
        epoch: fgparm.epoch.clone(),
        model_freq: default_freq(fgparm.model_freq, freq, "fgparm.model_freq"),
    }
}

fn resolve_catalog(catalog: &CatalogArgs) -> CatalogPaths {
    CatalogPaths {
        relative_to_data_dir: catalog.filepathtype.unwrap_or(CatalogPathType::Default)
            == CatalogPathType::Default,
        dsm_file_prefix: catalog.dsm_file_prefix.clone(),
        sumss_file: catalog.sumss_file.clone(),
        nvss_file: catalog.nvss_file.clone(),
        mwacs_file: catalog.mwacs_file.clone(),
        gleam_file: catalog.gleam_file.clone(),
        custom_file: catalog.custom_file.clone(),
    }
}

fn resolve_eor(eorparm: &EorParmArgs, freq: f64) -> Option<EorModel> {
    let (model, nside) = eorparm.model.zip(eorparm.nside)?;
    let generator = if eorparm.twentyone_cmfast == Some(true) {
        EorGenerator::TwentyOneCmFast {
            modelfile: eorparm.twentyone_cmfast_modelfile.clone(),
        }
    } else {
        EorGenerator::Lidz {
            modelfile: eorparm.lidz_modelfile.clone(),
        }
    };

    Some(EorModel {
        model,
        nside,
        spindex: SpectralIndex {
            mean: eorparm.spindex,
            rms: eorparm.spindex_rms.unwrap_or(0.0),
            seed: eorparm.spindex_seed,
        },
        generator,
        global_parms: eorparm.global_eor_parms,
        cube_freq: default_freq(eorparm.cube_freq, freq, "eorparm.cube_freq"),
    })
}

fn resolve_processing(processing: &ProcessingArgs) -> Processing {
    let chunks = match (processing.n_bl_chunks, &processing.bl_chunk) {
        (Some(n), _) => ChunkSelection::First(n),
        (None, Some(indices)) => ChunkSelection::Indices(indices.clone()),
        (None, None) => ChunkSelection::All,
    };

    Processing {
        bl_chunk_size: processing.bl_chunk_size.unwrap_or(DEFAULT_BL_CHUNK_SIZE),
        chunks,
        n_sky_sectors: processing.n_sky_sectors.unwrap_or(DEFAULT_N_SKY_SECTORS),
        bpass_shape: processing.bpass_shape.unwrap_or(BandpassShape::Rect),
        f_pad: processing.f_pad.unwrap_or(DEFAULT_FREQ_PAD),
        memuse: processing.memuse,
    }
}

fn resolve_subbands(subband: &SubbandArgs) -> Subbands {
    let freq_centers = subband.freq_center.as_deref().unwrap_or_default();
    let bws = subband.bw_eff.as_deref().unwrap_or_default();
    Subbands {
        bands: freq_centers
            .iter()
            .zip(bws)
            .map(|(&freq_center, &bw_eff)| Subband {
                freq_center,
                bw_eff,
            })
            .collect(),
        shape: subband.shape.unwrap_or(BandpassShape::Bhw),
        fftpow: subband.fftpow.unwrap_or(DEFAULT_SUBBAND_FFTPOW),
        pad: subband.pad.unwrap_or(DEFAULT_SUBBAND_PAD),
    }
}

fn resolve_regions(bm: &BeamModificationArgs) -> Vec<Region> {
    let coords = bm.coords.unwrap_or(RegionCoords::Altaz);
    izip!(
        bm.positions.as_deref().unwrap_or_default(),
        bm.angular_radius.as_deref().unwrap_or_default(),
        bm.snapshots.as_deref().unwrap_or_default(),
        bm.factors.as_deref().unwrap_or_default(),
    )
    .map(|(&[a, b], &angular_radius, &snapshot, &factor)| Region {
        position: match coords {
            RegionCoords::Altaz => SkyPosition::AltAz { az: a, alt: b },
            RegionCoords::Radec => SkyPosition::RaDec { ra: a, dec: b },
        },
        angular_radius,
        snapshot,
        factor,
    })
    .collect()
}

/// Plot directives are passed through untouched, so they're read straight
/// from the document rather than from typed arguments.
fn resolve_plots(plot: Option<&Value>) -> IndexMap<String, PlotDirective> {
    let plots = match plot.and_then(|p| p.as_mapping()) {
        Some(p) => p,
        None => return IndexMap::new(),
    };

    plots
        .iter()
        .filter_map(|(id, directive)| {
            let id = key_to_string(id)?;
            let directive = directive.as_mapping()?;
            let mut action = false;
            let mut params = IndexMap::new();
            for (k, v) in directive {
                match (key_to_string(k), v) {
                    (Some(k), Value::Bool(b)) if k == "action" => action = *b,
                    (Some(k), v) => {
                        params.insert(k, v.clone());
                    }
                    (None, _) => (),
                }
            }
            if !action && !params.is_empty() {
                debug!("Plot {id} is inactive; its parameters are unused");
            }
            Some((id, PlotDirective { action, params }))
        })
        .collect()
}
