//! Integration tests for the IAU 2006/2000A series loaded from the IERS
//! Conventions 2010 Tables 5.2a, 5.2b and 5.2d.
//!
//! Requires the table files under `data/`. Skips gracefully if absent;
//! `iers_series_excerpt.rs` covers the loader and evaluator without them.

use std::path::Path;

use approx::assert_abs_diff_eq;
use kala_frames::{Iau2006Series, Iau2006Truncated, PrecessionModel, TidalArguments};
use kala_time::{Instant, TimeSystemId};

const X_PATH: &str = "../../data/tab5.2a.txt";
const Y_PATH: &str = "../../data/tab5.2b.txt";
const S_PATH: &str = "../../data/tab5.2d.txt";

fn load_series() -> Option<Iau2006Series> {
    for path in [X_PATH, Y_PATH, S_PATH] {
        if !Path::new(path).exists() {
            eprintln!("Skipping iers_series_integration: {path} not found");
            return None;
        }
    }
    Iau2006Series::load(Path::new(X_PATH), Path::new(Y_PATH), Path::new(S_PATH)).ok()
}

/// MJD 53736.0, the IAU 2006 X, Y and s check epoch.
fn reference_arguments() -> TidalArguments {
    TidalArguments::new(Instant::from_jd(TimeSystemId::TDB, 2_453_736.5))
}

#[test]
fn tables_have_expected_shape() {
    let Some(series) = load_series() else { return };
    let args = reference_arguments();
    let cip = series.cip(&args).unwrap();
    assert!(cip.x.is_finite() && cip.y.is_finite() && cip.s.is_finite());
}

#[test]
fn reproduces_reference_cip() {
    let Some(series) = load_series() else { return };
    let args = reference_arguments();
    let cip = series.cip(&args).unwrap();
    // about 2 µas on X and Y, 0.02 µas on s
    assert_abs_diff_eq!(cip.x, 5.791_308_486_706_011e-4, epsilon = 1e-14);
    assert_abs_diff_eq!(cip.y, 4.020_579_816_732_961e-5, epsilon = 1e-14);
    assert_abs_diff_eq!(cip.s, -1.220_032_213_076_463e-8, epsilon = 1e-16);
}

#[test]
fn truncated_model_tracks_full_series() {
    let Some(series) = load_series() else { return };
    let truncated = Iau2006Truncated::new();
    for jd in [2_451_545.0, 2_453_411.5, 2_458_849.5, 2_461_041.5] {
        let args = TidalArguments::new(Instant::from_jd(TimeSystemId::TDB, jd));
        let full = series.cip(&args).unwrap();
        let approx = truncated.cip(&args).unwrap();
        // about 4 mas
        assert_abs_diff_eq!(full.x, approx.x, epsilon = 2e-8);
        assert_abs_diff_eq!(full.y, approx.y, epsilon = 2e-8);
        assert_abs_diff_eq!(full.s, approx.s, epsilon = 1e-10);
    }
}
