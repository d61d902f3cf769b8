// Per-wire input tables for correction strategies
//
// Both table formats are plain text, one wire per line, keyed by the full
// six-field address:
//
//   samples:  wheel station sector superlayer layer wire v1 v2 ...
//   deltas:   wheel station sector superlayer layer wire delta
//
// These are loaded once at pipeline entry into the CorrectionContext; the
// per-wire loop never reads files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::ValidationError;
use crate::topology::WireAddress;

/// Parse a per-wire sample table
pub fn parse_sample_table(contents: &str) -> Result<BTreeMap<WireAddress, Vec<f64>>, ValidationError> {
    let mut table = BTreeMap::new();
    for (index, line) in numbered_lines(contents) {
        let (address, values) = parse_wire_line(index, line, 1, usize::MAX)?;
        table.insert(address, values);
    }
    Ok(table)
}

/// Parse a per-wire delta table
pub fn parse_delta_table(contents: &str) -> Result<BTreeMap<WireAddress, f64>, ValidationError> {
    let mut table = BTreeMap::new();
    for (index, line) in numbered_lines(contents) {
        let (address, values) = parse_wire_line(index, line, 1, 1)?;
        table.insert(address, values[0]);
    }
    Ok(table)
}

/// Load a sample table from disk
pub fn load_sample_table<P: AsRef<Path>>(
    path: P,
) -> Result<BTreeMap<WireAddress, Vec<f64>>, ValidationError> {
    parse_sample_table(&read_table(path)?)
}

/// Load a delta table from disk
pub fn load_delta_table<P: AsRef<Path>>(
    path: P,
) -> Result<BTreeMap<WireAddress, f64>, ValidationError> {
    parse_delta_table(&read_table(path)?)
}

fn read_table<P: AsRef<Path>>(path: P) -> Result<String, ValidationError> {
    fs::read_to_string(&path).map_err(|err| ValidationError::Io {
        path: path.as_ref().display().to_string(),
        reason: err.to_string(),
    })
}

fn numbered_lines(contents: &str) -> impl Iterator<Item = (usize, &str)> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| (index + 1, line))
}

/// Parse one `address fields... values...` line with between `min_values`
/// and `max_values` trailing floats
fn parse_wire_line(
    number: usize,
    line: &str,
    min_values: usize,
    max_values: usize,
) -> Result<(WireAddress, Vec<f64>), ValidationError> {
    let parse_error = || ValidationError::ParseLine {
        line: number,
        content: line.trim().to_string(),
    };

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 6 + min_values || fields.len() > 6usize.saturating_add(max_values) {
        return Err(parse_error());
    }

    let mut ints = [0i32; 6];
    for (slot, field) in ints.iter_mut().zip(&fields[..6]) {
        *slot = field.parse().map_err(|_| parse_error())?;
    }

    let mut values = Vec::with_capacity(fields.len() - 6);
    for field in &fields[6..] {
        let value: f64 = field.parse().map_err(|_| parse_error())?;
        if !value.is_finite() {
            return Err(parse_error());
        }
        values.push(value);
    }

    Ok((
        WireAddress::new(ints[0], ints[1], ints[2], ints[3], ints[4], ints[5]),
        values,
    ))
}
