// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All physical quantities are stored in SI units after resolution: seconds for
times, Hz for frequencies, metres for lengths and degrees for angles.
 */

/// The relative tolerance allowed when deriving the number of accumulations
/// from the total observing time and the accumulation time. If `t_obs / t_acc`
/// is further than this (relative to `t_obs`) from an integer, the derivation
/// fails.
pub const ACCUMULATION_REL_TOLERANCE: f64 = 1e-6;

/// The number of baselines in a processing chunk, if none is specified.
pub const DEFAULT_BL_CHUNK_SIZE: usize = 200;

/// The number of sky sectors used for processing, if none is specified.
pub const DEFAULT_N_SKY_SECTORS: usize = 1;

/// The zero-padding fraction applied along the frequency axis before a delay
/// transform.
pub const DEFAULT_FREQ_PAD: f64 = 1.0;

/// Delay-CLEAN defaults.
pub const DEFAULT_CLEAN_PAD: f64 = 1.0;
pub const DEFAULT_CLEAN_WINDOW_BUFFER: f64 = 1.0;
pub const DEFAULT_CLEAN_TOL: f64 = 0.1;
pub const DEFAULT_CLEAN_MAXITER: usize = 100;

/// Sub-band delay-spectrum defaults.
pub const DEFAULT_SUBBAND_FFTPOW: f64 = 1.0;
pub const DEFAULT_SUBBAND_PAD: f64 = 1.0;

/// Physical sizes of the antenna elements of the telescopes with fixed
/// elements [metres].
pub const MWA_DIPOLE_SIZE_M: f64 = 0.74;
pub const VLA_DISH_SIZE_M: f64 = 25.0;
pub const GMRT_DISH_SIZE_M: f64 = 45.0;
pub const HERA_DISH_SIZE_M: f64 = 14.0;

/// Default element orientations.
pub const DIPOLE_ALTAZ_ORIENTATION: [f64; 2] = [0.0, 90.0];
pub const DIPOLE_DIRCOS_ORIENTATION: [f64; 3] = [1.0, 0.0, 0.0];
pub const APERTURE_ALTAZ_ORIENTATION: [f64; 2] = [90.0, 270.0];
pub const APERTURE_DIRCOS_ORIENTATION: [f64; 3] = [0.0, 0.0, 1.0];

/// The largest HEALPix nside that can be stored; nsides are powers of two
/// held in a `u32`.
pub const MAX_NSIDE: u32 = 1 << 31;

/// The label given to sweep tables that don't name themselves.
pub const DEFAULT_SWEEP_LABEL: &str = "Tsys";
