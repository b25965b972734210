// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::*;

use approx::assert_abs_diff_eq;

#[test]
fn test_parse_time_str_without_units() {
    for s in ["1", "1.0", " 1.0 "] {
        let result = parse_time(s);
        assert!(result.is_ok(), "{:?}", result.unwrap_err());
        let pair = result.unwrap();
        assert_abs_diff_eq!(pair.0, 1.0);
        assert_eq!(pair.1, TimeFormat::NoUnit);
    }
}

#[test]
fn test_parse_time_str_with_units() {
    // Iterate over all possible units.
    for time_format in TimeFormat::iter().filter(|&tf| tf != TimeFormat::NoUnit) {
        let time_format_str: &'static str = time_format.into();
        for time_format_str in [
            time_format_str.to_lowercase(),
            time_format_str.to_uppercase(),
        ] {
            for s in [
                format!("1{time_format_str}"),
                format!("1.0{time_format_str}"),
                format!(" 1.0 {time_format_str} "),
            ] {
                let result = parse_time(&s);
                assert!(result.is_ok(), "{:?}", result.unwrap_err());
                let pair = result.unwrap();
                assert_abs_diff_eq!(pair.0, 1.0);
                assert_eq!(pair.1, time_format);
            }
        }
    }
}

#[test]
fn test_parse_freq_str_with_units() {
    let (n, f) = parse_freq("150MHz").unwrap();
    assert_abs_diff_eq!(n, 150.0);
    assert_eq!(f, FreqFormat::MHz);

    let (n, f) = parse_freq(" 97.65625 kHz").unwrap();
    assert_abs_diff_eq!(n, 97.65625);
    assert_eq!(f, FreqFormat::kHz);
}

#[test]
fn test_parse_bad_strings() {
    assert!(matches!(
        parse_time("1.0.0s"),
        Err(UnitParseError::GotTimeUnitButCantParse(_))
    ));
    assert!(matches!(
        parse_freq("1.0.0Hz"),
        Err(UnitParseError::GotFreqUnitButCantParse(_))
    ));
    assert!(matches!(
        parse_time("1 fortnight"),
        Err(UnitParseError::Unknown { .. })
    ));
    assert!(matches!(
        parse_freq("MHz"),
        Err(UnitParseError::GotFreqUnitButCantParse(_))
    ));
}

#[test]
fn test_quantities_to_si() {
    assert_abs_diff_eq!(Quantity::Number(1080.0).to_seconds().unwrap(), 1080.0);
    assert_abs_diff_eq!(
        Quantity::Text("18 min".to_string()).to_seconds().unwrap(),
        1080.0
    );
    assert_abs_diff_eq!(
        Quantity::Text("24h".to_string()).to_seconds().unwrap(),
        86400.0
    );
    assert_abs_diff_eq!(
        Quantity::Text("150MHz".to_string()).to_hz().unwrap(),
        150e6,
        epsilon = 1e-6
    );
    assert_abs_diff_eq!(
        Quantity::Text("0.15 GHz".to_string()).to_hz().unwrap(),
        150e6,
        epsilon = 1e-3
    );
}
