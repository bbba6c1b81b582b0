// src/report_io.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::ReportError;
use crate::format::NO_VALUE;
use crate::metrics::MetricRegistry;
use crate::types::{TaxLevel, TaxonRow};

/// Parses a flat report file in the format:
/// ```text
/// taxID\tparentID\trank\tname\tcommonName\t<metric>\t<metric>...
/// ```
/// The header row names the metric columns, which must all exist in the
/// registry. Also accepts `.gz` files transparently.
pub fn read_report_rows<P: AsRef<Path>>(
    path: P,
    registry: &MetricRegistry,
) -> Result<Vec<TaxonRow>, ReportError> {
    let path = path.as_ref();
    let f = File::open(path)?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };

    parse_report(reader, registry)
}

/// Parse report rows from any buffered reader.
pub fn parse_report<R: BufRead>(
    reader: R,
    registry: &MetricRegistry,
) -> Result<Vec<TaxonRow>, ReportError> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Ok(Vec::new()),
    };
    let columns: Vec<&str> = header.split('\t').collect();
    if columns.len() < 5 {
        return Err(ReportError::MalformedReport {
            line: 1,
            reason: format!("header has {} columns, expected at least 5", columns.len()),
        });
    }
    let metric_keys: Vec<String> = columns[5..].iter().map(|c| c.trim().to_string()).collect();
    for key in &metric_keys {
        if !registry.contains(key) {
            return Err(ReportError::MalformedReport {
                line: 1,
                reason: format!("unknown metric column {key:?}"),
            });
        }
    }

    let mut rows = Vec::new();
    for (lineno, line_result) in lines.enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();

        // Skip malformed lines
        if fields.len() < 5 {
            log::debug!("skipping report line {}: too few fields", lineno + 2);
            continue;
        }

        let tax_id: i64 = match fields[0].trim().parse() {
            Ok(id) => id,
            Err(_) => {
                log::debug!("skipping report line {}: bad taxID", lineno + 2);
                continue;
            }
        };
        let parent_tax_id: i64 = fields[1].trim().parse().unwrap_or(0);
        let tax_level = match fields[2].trim() {
            "species" => TaxLevel::Species,
            "genus" => TaxLevel::Genus,
            _ => TaxLevel::Higher,
        };

        let mut row = TaxonRow::new(tax_id, parent_tax_id, fields[3].trim(), tax_level);
        let common = fields[4].trim();
        if !common.is_empty() && common != NO_VALUE {
            row.common_name = Some(common.to_string());
        }

        for (key, cell) in metric_keys.iter().zip(fields[5..].iter()) {
            let cell = cell.trim();
            if cell.is_empty() || cell == NO_VALUE {
                continue;
            }
            match cell.parse::<f64>() {
                Ok(v) if v.is_finite() => {
                    row.values.insert(key.clone(), v);
                }
                _ => {
                    log::debug!(
                        "skipping metric {key:?} on line {}: unparseable value {cell:?}",
                        lineno + 2
                    );
                }
            }
        }

        rows.push(row);
    }
    Ok(rows)
}
