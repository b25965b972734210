// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Loading, validation and resolution of sky-simulation run parameters.

A parameter file goes through three stages:

1. [`RawDocument`]: the file is parsed (YAML, JSON or TOML) into an ordered
   tree, keeping explicit nulls distinct from absent keys;
2. [`validate`]: every field and every constraint between fields is checked,
   and all violations are reported together;
3. [`resolve`]: defaults are applied and derived quantities computed, giving an
   immutable [`RunConfig`].

A [`sweep::SweepTable`] lists variants of a base document; each row resolves
into its own `RunConfig`.
 */

mod cli;
pub mod constants;
mod error;
pub mod load;
pub mod params;
pub mod resolve;
pub mod sweep;
pub mod unit_parsing;
pub mod validate;

#[cfg(test)]
mod tests;

// Re-exports.
pub use cli::{SkysimConfig, SkysimConfigError};
pub use error::RunConfigError;
pub use load::{LoadError, ParseError, Provenance, RawDocument, RowTag};
pub use params::RunConfig;
pub use resolve::{resolve, resolve_with_warnings, InconsistentDerivationError};
pub use sweep::{resolve_sweep, SweepError, SweepOutcome, SweepTable};
pub use validate::{validate, SchemaValidationError, ValidatedDocument, Violation};
