// Flat reference file parsing
//
// Reference files carry one record per line, whitespace separated:
//
//   wheel station sector superlayer mean spread
//
// Address fields are integers, mean and spread floating point. Records are
// superlayer granular, so parsed addresses carry the first legal layer and
// wire indices. A line that does not parse becomes an error in place of a
// record; the comparator turns it into a ReadError entry instead of
// aborting the run.

use std::fs;
use std::path::Path;

use crate::error::ValidationError;
use crate::topology::WireAddress;

/// One parsed reference record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceRecord {
    pub address: WireAddress,
    pub mean: f64,
    pub spread: f64,
}

/// Parse reference lines, keeping per-line failures in place
pub fn parse_reference_lines(contents: &str) -> Vec<Result<ReferenceRecord, ValidationError>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_line(index + 1, line))
        .collect()
}

/// Read and parse a reference file
///
/// # Returns
/// * `Ok(records)` - One entry per non-empty line; unparseable lines are
///   `Err` in place
/// * `Err(ValidationError::Io)` - The file itself could not be read
pub fn load_reference_file<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<Result<ReferenceRecord, ValidationError>>, ValidationError> {
    let contents = fs::read_to_string(&path).map_err(|err| ValidationError::Io {
        path: path.as_ref().display().to_string(),
        reason: err.to_string(),
    })?;
    Ok(parse_reference_lines(&contents))
}

fn parse_line(number: usize, line: &str) -> Result<ReferenceRecord, ValidationError> {
    let parse_error = || ValidationError::ParseLine {
        line: number,
        content: line.trim().to_string(),
    };

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(parse_error());
    }

    let wheel: i32 = fields[0].parse().map_err(|_| parse_error())?;
    let station: i32 = fields[1].parse().map_err(|_| parse_error())?;
    let sector: i32 = fields[2].parse().map_err(|_| parse_error())?;
    let superlayer: i32 = fields[3].parse().map_err(|_| parse_error())?;
    let mean: f64 = fields[4].parse().map_err(|_| parse_error())?;
    let spread: f64 = fields[5].parse().map_err(|_| parse_error())?;

    if !mean.is_finite() || !spread.is_finite() || spread < 0.0 {
        return Err(parse_error());
    }

    Ok(ReferenceRecord {
        address: WireAddress::superlayer(wheel, station, sector, superlayer),
        mean,
        spread,
    })
}
