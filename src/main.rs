// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::Parser;

use skysim_config::SkysimConfig;

// Use a custom main function so we can print errors with Display rather than
// Debug.
// https://github.com/BurntSushi/advent-of-code/blob/master/2018/aoc01/src/main.rs
fn main() {
    if let Err(e) = SkysimConfig::parse().run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
