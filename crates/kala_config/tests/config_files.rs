//! Loading configuration files from disk.

use std::fs;

use kala_config::{Assembly, ConfigError, KalaConfig, ModelKind};
use kala_time::{Instant, MILLIS_PER_DAY, TimeSystemId};
use tempfile::tempdir;

const LEAP_LIST: &str = "\
 1972 JAN  1 =JD 2441317.5  TAI-UTC=  10.0       S + (MJD - 41317.) X 0.0      S
 1972 JUL  1 =JD 2441499.5  TAI-UTC=  11.0       S + (MJD - 41317.) X 0.0      S
 1973 JAN  1 =JD 2441683.5  TAI-UTC=  12.0       S + (MJD - 41317.) X 0.0      S
";

fn finals_line(mjd: f64, x: f64, y: f64, dut1: f64) -> String {
    let mut line = vec![b' '; 78];
    let mut put = |start: usize, end: usize, text: String| {
        let width = end - start;
        line[start..end].copy_from_slice(format!("{text:>width$}").as_bytes());
    };
    put(7, 15, format!("{mjd:.2}"));
    put(18, 27, format!("{x:.6}"));
    put(37, 46, format!("{y:.6}"));
    put(58, 68, format!("{dut1:.7}"));
    String::from_utf8(line).unwrap()
}

#[test]
fn assembles_from_files_next_to_the_config() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("tai-utc.dat"), LEAP_LIST).unwrap();
    let finals: Vec<String> = (0..5)
        .map(|d| finals_line(41_700.0 + d as f64, 0.1, 0.2, 0.5 - 0.002 * d as f64))
        .collect();
    fs::write(dir.path().join("finals.all"), finals.join("\n")).unwrap();
    let config_path = dir.path().join("kala.toml");
    fs::write(
        &config_path,
        "[time]\nleap_seconds = \"tai-utc.dat\"\n\n[eop]\nfinals = \"finals.all\"\n",
    )
    .unwrap();

    let config = KalaConfig::load(&config_path).unwrap();
    assert_eq!(config.time.leap_seconds.as_deref(), Some(dir.path().join("tai-utc.dat").as_path()));
    assert_eq!(config.precession.model, ModelKind::Truncated);

    let assembly = Assembly::from_config(&config).unwrap();
    assert_eq!(assembly.leap_table().len(), 2);
    assert_eq!(assembly.orientation_table().map(|t| t.len()), Some(5));
    let ut1 = assembly.ut1().unwrap();

    // 1973-01-19 12:00 UTC, TAI − UTC = 12 s
    let utc = Instant::from_millis(TimeSystemId::UTC, (41_701 - 40_587) * MILLIS_PER_DAY + MILLIS_PER_DAY / 2);
    let reading = assembly.convert(&utc, ut1).unwrap();
    let dut1 = reading
        .raw_seconds_after(&Instant::new(ut1, utc.millis(), 0).unwrap())
        .unwrap();
    // rows and query share the 12 s offset, so the query sits 1.5 days past row 0
    assert!((dut1 - 0.497).abs() < 2e-9, "dut1 {dut1}");

    let eo = assembly.orientation(&utc).unwrap();
    assert!(eo.is_interpolated());
    assert_eq!(eo.ut1(), reading);
}

#[test]
fn malformed_toml_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[time\nsearch_depth = 3\n").unwrap();
    assert!(matches!(KalaConfig::load(&path), Err(ConfigError::Toml(_))));
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        KalaConfig::load(&dir.path().join("absent.toml")),
        Err(ConfigError::Io(_))
    ));
}
