//! Parser for the IERS Conventions 2010 coefficient tables 5.2a, 5.2b and 5.2d.
//!
//! The files carry a polynomial line such as
//!
//! ```text
//! X = -16617. + 2004191898. t - 429782.9 t^2 - 198618.34 t^3 + 7.578 t^4 + 5.9285 t^5
//! ```
//!
//! followed by blocks headed `j = N` whose rows read
//!
//! ```text
//! i   a_s   a_c   n_1 ... n_k
//! ```
//!
//! Rows carry either all fourteen argument multipliers (Tables 5.2a/b) or
//! eight (Table 5.2d: l, l′, F, D, Ω, L_Ve, L_E, p_A). A column header naming
//! the arguments, when present, overrides the default layout. All amplitudes
//! are in micro-arcseconds.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::FrameError;
use crate::harmonic::{HarmonicTerm, PrecessionExpansion};
use crate::tidal::{
    ARGUMENT_COUNT, D, F, L, L_EARTH, L_JUPITER, L_MARS, L_MERCURY, L_NEPTUNE, L_PRIME, L_SATURN,
    L_URANUS, L_VENUS, OMEGA, P_A, Weights,
};

const FULL_LAYOUT: [usize; 14] = [
    L, L_PRIME, F, D, OMEGA, L_MERCURY, L_VENUS, L_EARTH, L_MARS, L_JUPITER, L_SATURN, L_URANUS,
    L_NEPTUNE, P_A,
];

const SHORT_LAYOUT: [usize; 8] = [L, L_PRIME, F, D, OMEGA, L_VENUS, L_EARTH, P_A];

/// Load a coefficient table from disk.
pub fn load_series(path: &Path) -> Result<PrecessionExpansion, FrameError> {
    let content = std::fs::read_to_string(path)?;
    let series = parse_series(&content)?;
    debug!(
        path = %path.display(),
        terms = series.len(),
        orders = series.terms_by_order().len(),
        "loaded coefficient table"
    );
    Ok(series)
}

/// Parse a coefficient table from its text content.
pub fn parse_series(content: &str) -> Result<PrecessionExpansion, FrameError> {
    let mut polynomial: Option<Vec<f64>> = None;
    let mut layout: Option<Vec<usize>> = None;
    let mut order: Option<usize> = None;
    let mut terms_by_order: Vec<Vec<HarmonicTerm>> = Vec::new();

    for (lineno, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(j) = block_order(trimmed) {
            order = Some(j);
            if terms_by_order.len() <= j {
                terms_by_order.resize_with(j + 1, Vec::new);
            }
            continue;
        }

        if polynomial.is_none() {
            if let Some(poly) = parse_polynomial(trimmed) {
                polynomial = Some(poly);
                continue;
            }
        }

        if let Some(columns) = header_layout(trimmed) {
            layout = Some(columns);
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields[0].parse::<u32>().is_err() {
            continue;
        }
        let Some(j) = order else {
            return Err(FrameError::TableParse(format!(
                "line {}: coefficient row before any `j = N` block",
                lineno + 1
            )));
        };
        match parse_row(&fields, layout.as_deref()) {
            Some(term) => terms_by_order[j].push(term),
            None => warn!(line = lineno + 1, "skipping malformed coefficient row"),
        }
    }

    let mut polynomial = polynomial
        .ok_or_else(|| FrameError::TableParse("no polynomial line found".into()))?;
    if polynomial.len() < terms_by_order.len() {
        polynomial.resize(terms_by_order.len(), 0.0);
    }
    PrecessionExpansion::in_micro_arcsec(polynomial, terms_by_order)
}

fn block_order(line: &str) -> Option<usize> {
    let rest = line.strip_prefix('j')?.trim_start().strip_prefix('=')?;
    rest.split_whitespace().next()?.parse().ok()
}

/// Coefficients of `c0 + c1 t + c2 t^2 + …` on the right of `=`.
fn parse_polynomial(line: &str) -> Option<Vec<f64>> {
    let (_, rhs) = line.split_once('=')?;
    let mut coefficients: Vec<f64> = Vec::new();
    let mut sign = 1.0;
    let mut pending: Option<f64> = None;
    let mut saw_t = false;

    fn flush(value: f64, power: usize, coefficients: &mut Vec<f64>) {
        if coefficients.len() <= power {
            coefficients.resize(power + 1, 0.0);
        }
        coefficients[power] += value;
    }

    for token in rhs.split_whitespace() {
        match token {
            "+" => sign = 1.0,
            "-" => sign = -1.0,
            _ if token.starts_with('t') => {
                let power = match token.trim_start_matches('t').trim_start_matches(['^', '*']) {
                    "" => 1,
                    p => p.parse().ok()?,
                };
                flush(pending.take()?, power, &mut coefficients);
                saw_t = true;
                sign = 1.0;
            }
            _ => {
                if let Some(constant) = pending.take() {
                    flush(constant, 0, &mut coefficients);
                }
                let value: f64 = token.trim_end_matches('.').parse().ok()?;
                pending = Some(sign * value);
                sign = 1.0;
            }
        }
    }
    if let Some(constant) = pending {
        flush(constant, 0, &mut coefficients);
    }
    saw_t.then_some(coefficients)
}

fn argument_index(name: &str) -> Option<usize> {
    let index = match name {
        "l" => L,
        "l'" => L_PRIME,
        "F" => F,
        "D" => D,
        "Om" | "Omega" => OMEGA,
        "L_Me" => L_MERCURY,
        "L_Ve" => L_VENUS,
        "L_E" => L_EARTH,
        "L_Ma" => L_MARS,
        "L_J" => L_JUPITER,
        "L_Sa" => L_SATURN,
        "L_U" => L_URANUS,
        "L_Ne" => L_NEPTUNE,
        "p_A" | "pA" => P_A,
        _ => return None,
    };
    Some(index)
}

/// Argument layout from a column header line, if the line is one.
fn header_layout(line: &str) -> Option<Vec<usize>> {
    let names: Vec<&str> = line.split_whitespace().collect();
    let start = names.iter().position(|n| *n == "l")?;
    let layout: Vec<usize> = names[start..]
        .iter()
        .map(|n| argument_index(n))
        .collect::<Option<_>>()?;
    (layout.len() == FULL_LAYOUT.len() || layout.len() == SHORT_LAYOUT.len()).then_some(layout)
}

fn parse_row(fields: &[&str], header: Option<&[usize]>) -> Option<HarmonicTerm> {
    let multipliers = fields.get(3..)?;
    let layout: &[usize] = match (header, multipliers.len()) {
        (Some(h), n) if h.len() == n => h,
        (_, 14) => &FULL_LAYOUT,
        (_, 8) => &SHORT_LAYOUT,
        _ => return None,
    };
    let sin_amplitude: f64 = fields[1].parse().ok()?;
    let cos_amplitude: f64 = fields[2].parse().ok()?;
    let mut weights: Weights = [0; ARGUMENT_COUNT];
    for (slot, text) in layout.iter().zip(multipliers.iter()) {
        weights[*slot] = text.parse().ok()?;
    }
    Some(HarmonicTerm::new(weights, sin_amplitude, cos_amplitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
 Table 5.2d of the IERS Conventions
 s + XY/2 = 94.0 + 3808.65 t - 122.68 t^2 - 72574.11 t^3 + 27.98 t^4 + 15.62 t^5

 j = 0  Nb of terms = 2

    i    (a_{s,0})_i  (a_{c,0})_i    l    l'   F    D   Om  L_Ve  L_E  pA

    1       -2640.73        0.39     0    0    0    0    1    0    0    0
    2         -63.53        0.02     0    0    0    0    2    0    0    0

 j = 1  Nb of terms = 1

    1           0.00         0.00    0    0    0    0    0    0    0    0
    1          -0.07         3.57    0    0    0    0    2    0    0    0
";

    #[test]
    fn polynomial_line() {
        let poly = parse_polynomial("X = -16617. + 2004191898. t - 429782.9 t^2 - 198618.34 t^3 + 7.578 t^4 + 5.9285 t^5").unwrap();
        assert_eq!(poly, vec![-16617.0, 2004191898.0, -429782.9, -198618.34, 7.578, 5.9285]);
        assert!(parse_polynomial("Nb of terms = 2").is_none());
    }

    #[test]
    fn parses_blocks_and_short_rows() {
        let series = parse_series(SAMPLE).unwrap();
        assert_eq!(series.polynomial()[0], 94.0);
        assert_eq!(series.polynomial().len(), 6);
        let orders = series.terms_by_order();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].len(), 2);
        assert_eq!(orders[1].len(), 2);
        assert_eq!(orders[0][0].weights()[OMEGA], 1);
        assert_eq!(orders[0][1].sin_amplitude(), -63.53);
        assert_eq!(orders[1][1].cos_amplitude(), 3.57);
    }

    #[test]
    fn header_maps_columns() {
        let layout = header_layout("i (a_{s,0})_i (a_{c,0})_i l l' F D Om L_Ve L_E pA").unwrap();
        assert_eq!(layout, SHORT_LAYOUT.to_vec());
        assert!(header_layout("i something else").is_none());
    }

    #[test]
    fn full_rows_use_fourteen_arguments() {
        let text = "\
X = 0 + 1 t
j = 0
 1  -6844318.44  1328.67  0 0 0 0 1 0 0 0 0 0 0 0 0 0
";
        let series = parse_series(text).unwrap();
        let term = &series.terms_by_order()[0][0];
        assert_eq!(term.weights()[OMEGA], 1);
        assert_eq!(term.sin_amplitude(), -6844318.44);
    }

    #[test]
    fn row_before_block_is_an_error() {
        let text = "X = 0 + 1 t\n 1  1.0  2.0  0 0 0 0 1 0 0 0 0 0 0 0 0 0\n";
        assert!(matches!(parse_series(text), Err(FrameError::TableParse(_))));
    }

    #[test]
    fn missing_polynomial_is_an_error() {
        assert!(matches!(parse_series("j = 0\n"), Err(FrameError::TableParse(_))));
    }
}
