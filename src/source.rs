//! Capacity source: reads one capacity per line from a text or CSV file.

use std::path::Path;

use tracing::{debug, trace};

use crate::errors::SourceError;
use crate::types::{MilliampHours, SortedCapacities};

/// Read and parse a capacity file.
pub fn load_capacities(path: &Path) -> Result<SortedCapacities, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let capacities = parse_capacities(&content).map_err(|err| match err {
        SourceError::Empty { .. } => SourceError::Empty {
            path: path.display().to_string(),
        },
        other => other,
    })?;
    debug!(cells = capacities.len(), path = %path.display(), "loaded capacities");
    trace!(capacities = ?capacities.as_slice(), "sorted capacities");
    Ok(capacities)
}

/// Parse capacities from text.
///
/// Blank lines and `#` comments are skipped. When a line has commas only the first field is
/// read, so a plain export with extra columns still loads.
pub fn parse_capacities(content: &str) -> Result<SortedCapacities, SourceError> {
    let mut capacities = Vec::new();

    for (number, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let field = line.split(',').next().unwrap_or(line).trim();
        let value: MilliampHours = field.parse().map_err(|_| SourceError::InvalidLine {
            line: number + 1,
            content: line.to_string(),
        })?;
        if value <= 0 {
            return Err(SourceError::NonPositive {
                line: number + 1,
                value,
            });
        }
        capacities.push(value);
    }

    if capacities.is_empty() {
        return Err(SourceError::Empty {
            path: "<input>".to_string(),
        });
    }

    Ok(SortedCapacities::from_unsorted(capacities))
}
