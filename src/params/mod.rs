// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fully resolved run parameters.
//!
//! The code here mirrors the `validate` module; there, documents are checked
//! and deserialised into unparsed, everything-is-optional arguments, whereas
//! parameters here have had all defaults applied, all derived quantities
//! computed, and all mutually-exclusive groups collapsed into enums. They are
//! ready to be handed to a simulator or plotter directly.

mod document;
mod instrument;
mod observation;
mod processing;
mod sky;

pub use instrument::*;
pub use observation::*;
pub use processing::*;
pub use sky::*;

use std::path::Path;

use indexmap::IndexMap;

use crate::{load::Provenance, RawDocument, RunConfigError};

/// Everything needed to run one simulation. A `RunConfig` can only be made by
/// resolving a validated document, and can't be changed afterwards; a
/// parameter sweep produces one `RunConfig` per row instead.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub(crate) directories: Directories,
    pub(crate) project: Project,
    pub(crate) telescope: Telescope,
    pub(crate) array: Array,
    pub(crate) baseline: BaselineSelection,
    pub(crate) antenna: AntennaElement,
    pub(crate) achromatic_beam: AchromaticBeam,
    pub(crate) chromatic_beam: Option<ChromaticBeam>,
    pub(crate) observation: Observation,
    pub(crate) snapshots: SnapshotSelection,
    pub(crate) pointing: Pointing,
    pub(crate) foreground: ForegroundModel,
    pub(crate) catalog: CatalogPaths,
    pub(crate) eor: Option<EorModel>,
    pub(crate) processing: Processing,
    pub(crate) clean: Clean,
    pub(crate) subbands: Subbands,
    pub(crate) reflectometry: Reflectometry,
    pub(crate) regions: Vec<Region>,
    pub(crate) plots: IndexMap<String, PlotDirective>,
    pub(crate) provenance: Provenance,
}

impl RunConfig {
    /// Load, validate and resolve a parameter file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<RunConfig, RunConfigError> {
        let raw = RawDocument::from_file(path)?;
        let validated = crate::validate(raw)?;
        let config = crate::resolve(&validated)?;
        Ok(config)
    }

    pub fn directories(&self) -> &Directories {
        &self.directories
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn telescope(&self) -> &Telescope {
        &self.telescope
    }

    pub fn array(&self) -> &Array {
        &self.array
    }

    pub fn baseline(&self) -> &BaselineSelection {
        &self.baseline
    }

    pub fn antenna(&self) -> &AntennaElement {
        &self.antenna
    }

    pub fn achromatic_beam(&self) -> &AchromaticBeam {
        &self.achromatic_beam
    }

    pub fn chromatic_beam(&self) -> Option<&ChromaticBeam> {
        self.chromatic_beam.as_ref()
    }

    pub fn observation(&self) -> &Observation {
        &self.observation
    }

    pub fn snapshots(&self) -> &SnapshotSelection {
        &self.snapshots
    }

    pub fn pointing(&self) -> &Pointing {
        &self.pointing
    }

    pub fn foreground(&self) -> &ForegroundModel {
        &self.foreground
    }

    pub fn catalog(&self) -> &CatalogPaths {
        &self.catalog
    }

    pub fn eor(&self) -> Option<&EorModel> {
        self.eor.as_ref()
    }

    pub fn processing(&self) -> &Processing {
        &self.processing
    }

    pub fn clean(&self) -> &Clean {
        &self.clean
    }

    pub fn subbands(&self) -> &Subbands {
        &self.subbands
    }

    pub fn reflectometry(&self) -> &Reflectometry {
        &self.reflectometry
    }

    /// Beam-modification regions, in the order they were specified.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn plots(&self) -> &IndexMap<String, PlotDirective> {
        &self.plots
    }

    /// Where this configuration came from, and which fields were overridden
    /// relative to a base document.
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Get the frequencies of all channels [Hz]. The centre frequency lies on
    /// channel `nchan / 2`.
    pub fn channel_freqs(&self) -> Vec<f64> {
        let obs = &self.observation;
        let centre_chan = (obs.nchan / 2) as f64;
        (0..obs.nchan)
            .map(|i| obs.freq + (i as f64 - centre_chan) * obs.freq_resolution)
            .collect()
    }
}
