// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line interface code.
//!
//! Only 3 things should be public in this module: `SkysimConfig`,
//! `SkysimConfig::run`, and `SkysimConfigError`.

mod error;
mod printers;

pub use error::SkysimConfigError;

use std::{
    borrow::Cow,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use clap::{AppSettings, Args, Parser, Subcommand};
use itertools::Itertools;
use log::{debug, info, warn};
use serde_yaml::Value;

use crate::{
    params::*, resolve_sweep, resolve_with_warnings, validate, RawDocument, RunConfig, SweepTable,
};
use printers::{display_warnings, InfoPrinter, Warn};

// Add build-time information from the "built" crate.
include!(concat!(env!("OUT_DIR"), "/built.rs"));

#[derive(Debug, Parser)]
#[clap(
    version,
    author,
    about = "Load, validate and resolve sky-simulation parameter files."
)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(disable_help_subcommand = true)]
#[clap(infer_subcommands = true)]
#[clap(propagate_version = true)]
#[clap(infer_long_args = true)]
pub struct SkysimConfig {
    #[clap(flatten)]
    global_opts: GlobalArgs,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences))]
    #[clap(global = true)]
    verbosity: u8,

    /// Don't use colours in output.
    #[clap(long)]
    #[clap(global = true)]
    no_colour: bool,
}

#[derive(Debug, Subcommand)]
#[clap(arg_required_else_help = true)]
enum Command {
    /// Check a parameter file, reporting every problem with it.
    #[clap(alias = "check")]
    Validate {
        /// The parameter file (YAML, JSON or TOML).
        file: PathBuf,
    },

    /// Resolve a parameter file into complete run parameters.
    Resolve {
        /// The parameter file (YAML, JSON or TOML).
        file: PathBuf,

        /// Write the resolved parameters, with every default filled in, to
        /// this YAML file.
        #[clap(long)]
        save_yaml: Option<PathBuf>,

        /// Write the resolved parameters, with every default filled in, to
        /// this JSON file.
        #[clap(long)]
        save_json: Option<PathBuf>,
    },

    /// Resolve every row of a sweep table against a base parameter file.
    Sweep {
        /// The base parameter file.
        base: PathBuf,

        /// The sweep table; a text table, or a YAML/JSON/TOML table with
        /// explicit overrides.
        table: PathBuf,

        /// Write the resolved parameters of each row into this directory.
        #[clap(short, long)]
        output_dir: Option<PathBuf>,
    },
}

impl SkysimConfig {
    pub fn run(self) -> Result<(), SkysimConfigError> {
        let GlobalArgs {
            verbosity,
            no_colour,
        } = self.global_opts;
        setup_logging(verbosity).expect("Failed to initialise logging.");
        if no_colour {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        let sub_command = match &self.command {
            Command::Validate { .. } => "validate",
            Command::Resolve { .. } => "resolve",
            Command::Sweep { .. } => "sweep",
        };
        info!("skysim-config {} {}", sub_command, env!("CARGO_PKG_VERSION"));
        display_build_info();

        let result = match self.command {
            Command::Validate { file } => validate_file(&file),

            Command::Resolve {
                file,
                save_yaml,
                save_json,
            } => resolve_file(&file, save_yaml.as_deref(), save_json.as_deref()),

            Command::Sweep {
                base,
                table,
                output_dir,
            } => sweep(&base, &table, output_dir.as_deref()),
        };
        // Warnings are worth seeing even if something failed.
        display_warnings();
        result?;

        info!("skysim-config {} complete.", sub_command);
        Ok(())
    }
}

fn validate_file(file: &Path) -> Result<(), SkysimConfigError> {
    let raw = RawDocument::from_file(file)?;
    let validated = validate(raw)?;
    info!("{} is valid", validated.provenance().source);
    Ok(())
}

fn resolve_file(
    file: &Path,
    save_yaml: Option<&Path>,
    save_json: Option<&Path>,
) -> Result<(), SkysimConfigError> {
    let validated = validate(RawDocument::from_file(file)?)?;
    let (config, warnings) = resolve_with_warnings(&validated)?;
    for warning in warnings {
        warning.warn();
    }
    summarise(&config).display();

    if save_yaml.is_some() || save_json.is_some() {
        let doc = config.to_document();
        if let Some(path) = save_yaml {
            write_yaml(path, &doc)?;
        }
        if let Some(path) = save_json {
            let mut f = create(path)?;
            serde_json::to_writer_pretty(&mut f, &doc)?;
            f.flush().map_err(|err| SkysimConfigError::Write {
                path: path.to_path_buf(),
                err,
            })?;
            info!("Wrote {}", path.display());
        }
    }
    Ok(())
}

fn sweep(base: &Path, table: &Path, output_dir: Option<&Path>) -> Result<(), SkysimConfigError> {
    let base_doc = RawDocument::from_file(base)?;
    let table = SweepTable::from_file(table)?;
    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir).map_err(|err| SkysimConfigError::Write {
            path: dir.to_path_buf(),
            err,
        })?;
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "parameters".to_string());

    let outcomes = resolve_sweep(&base_doc, &table);
    let num_rows = outcomes.len();
    let mut num_failed = 0;
    let mut printer = InfoPrinter::new(format!("{} sweep over {}", table.label, base.display()).into());
    for outcome in outcomes {
        for warning in outcome.warnings {
            format!("{}: {warning}", outcome.tag).warn();
        }
        match outcome.result {
            Ok(config) => {
                let overridden = &config.provenance().overridden;
                let mut block: Vec<Cow<'static, str>> = vec![format!("{}: ok", outcome.tag).into()];
                if !overridden.is_empty() {
                    block.push(format!("overrides {}", overridden.iter().join(", ")).into());
                }
                printer.push_block(block);

                if let Some(dir) = output_dir {
                    let path = dir.join(format!(
                        "{stem}_{}{}.yaml",
                        outcome.tag.label, outcome.tag.id
                    ));
                    write_yaml(&path, &config.to_document())?;
                }
            }

            Err(e) => {
                num_failed += 1;
                warn!("{}: {e}", outcome.tag);
                printer.push_line(format!("{}: failed", outcome.tag).into());
            }
        }
    }
    printer.display();

    if num_failed > 0 {
        return Err(SkysimConfigError::SweepRowsFailed {
            num_failed,
            num_rows,
        });
    }
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>, SkysimConfigError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|err| SkysimConfigError::Write {
            path: path.to_path_buf(),
            err,
        })
}

fn write_yaml(path: &Path, doc: &Value) -> Result<(), SkysimConfigError> {
    let mut f = create(path)?;
    serde_yaml::to_writer(&mut f, doc)?;
    f.flush().map_err(|err| SkysimConfigError::Write {
        path: path.to_path_buf(),
        err,
    })?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Describe the most important parts of a resolved configuration.
fn summarise(config: &RunConfig) -> InfoPrinter {
    let mut printer = InfoPrinter::new(format!("Resolved {}", config.provenance().source).into());

    let t = config.telescope();
    printer.push_block(vec![
        format!(
            "Telescope: {} at ({}°, {}°), Tsys = {} K",
            t.id, t.latitude, t.longitude, t.tsys
        )
        .into(),
        match &config.array().layout {
            ArrayLayout::File(f) => format!("Array layout from {}", f.display()),
            ArrayLayout::Named { layout, .. } => format!("Array layout {layout}"),
        }
        .into(),
    ]);

    let a = config.antenna();
    let mut element = match a.size {
        Some(size) => format!("{size} m {} elements", a.shape),
        None => format!("{} elements", a.shape),
    };
    if let Some(pa) = &a.phased_array {
        element.push_str(&format!(
            " in phased arrays ({} realisations of errors)",
            pa.nrand
        ));
    }
    printer.push_line(element.into());

    let obs = config.observation();
    let acc = obs.accumulation;
    printer.push_block(vec![
        format!(
            "{} channels of {} kHz around {} MHz",
            obs.nchan,
            obs.freq_resolution / 1e3,
            obs.freq / 1e6
        )
        .into(),
        format!(
            "{} observation: t_obs = {} s, n_acc = {}, t_acc = {} s ({} derived)",
            obs.obs_mode, acc.t_obs, acc.n_acc, acc.t_acc, acc.derived
        )
        .into(),
        match config.pointing() {
            Pointing::File(f) => format!("Pointings from {}", f.display()),
            Pointing::Drift(d) => match d.direction {
                DriftDirection::AltAz { alt, az } => {
                    format!("Drifting at (alt, az) = ({alt}°, {az}°) from LST {} h", d.lst)
                }
                DriftDirection::HaDec { ha, dec } => {
                    format!("Drifting at (ha, dec) = ({ha}°, {dec}°) from LST {} h", d.lst)
                }
            },
            Pointing::Track(t) => format!("Tracking (ra, dec) = ({}°, {}°)", t.ra, t.dec),
        }
        .into(),
    ]);

    let mut sky: Vec<Cow<'static, str>> =
        vec![format!("Foreground model: {}", config.foreground().model).into()];
    if let Some(eor) = config.eor() {
        sky.push(format!("EoR model: {} (nside {})", eor.model, eor.nside).into());
    }
    printer.push_block(sky);

    if !config.regions().is_empty() {
        printer.push_line(
            format!(
                "Primary beam modified in {} regions",
                config.regions().len()
            )
            .into(),
        );
    }
    let active_plots = config
        .plots()
        .iter()
        .filter(|(_, p)| p.action)
        .map(|(id, _)| id)
        .join(", ");
    if !active_plots.is_empty() {
        printer.push_line(format!("Plots: {active_plots}").into());
    }

    printer
}

/// Activate a logger. All log messages are put onto `stdout`. `env_logger`
/// automatically only uses colours and fancy symbols if we're on a tty (e.g. a
/// terminal); piped output will be formatted sensibly. Source code lines are
/// displayed in log messages when verbosity >= 3.
fn setup_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                use std::io::Write;

                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.try_init()
}

/// Write many info-level log lines of how this executable was compiled.
fn display_build_info() {
    let dirty = match GIT_DIRTY {
        Some(true) => " (dirty)",
        _ => "",
    };
    match GIT_COMMIT_HASH_SHORT {
        Some(hash) => {
            info!("Compiled on git commit hash: {hash}{dirty}");
        }
        None => info!("Compiled on git commit hash: <no git info>"),
    }
    if let Some(hr) = GIT_HEAD_REF {
        info!("            git head ref: {}", hr);
    }
    info!("            {}", BUILT_TIME_UTC);
    info!("         with compiler {}", RUSTC_VERSION);
    info!("");
}
