//! Projection table ingest.
//!
//! The review CSV format carries one row per player with paired per-gameweek
//! columns:
//!
//! ```csv
//! ID,Name,Pos,Team,Value,12_Pts,12_xMins,13_Pts,13_xMins
//! 427,Salah,M,12,131,7.2,88.0,6.8,85.0
//! ```
//!
//! Cells may be blank (treated as zero); the pair of `{gw}_Pts` and
//! `{gw}_xMins` columns defines which gameweeks the source covers.

use fpl_core::{DataError, Gameweek, GwProjection, PlayerId};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// One parsed projection source with its merge weight.
#[derive(Debug, Clone)]
pub struct ProjectionSource {
    pub name: String,
    pub weight: f64,
    /// Player id -> gameweek -> projection.
    pub rows: HashMap<PlayerId, BTreeMap<Gameweek, GwProjection>>,
}

impl ProjectionSource {
    /// The gameweeks this source has any column for.
    pub fn gameweeks(&self) -> Vec<Gameweek> {
        let mut gws: Vec<Gameweek> = self
            .rows
            .values()
            .flat_map(|per_gw| per_gw.keys().copied())
            .collect();
        gws.sort_unstable();
        gws.dedup();
        gws
    }
}

#[derive(Debug, Clone, Copy)]
enum GwField {
    Pts,
    XMins,
}

/// Map header cells to `(gameweek, field)` pairs; non-projection columns
/// return `None`.
fn parse_gw_column(header: &str) -> Option<(Gameweek, GwField)> {
    let (gw_part, field) = if let Some(prefix) = header.strip_suffix("_Pts") {
        (prefix, GwField::Pts)
    } else if let Some(prefix) = header.strip_suffix("_xMins") {
        (prefix, GwField::XMins)
    } else {
        return None;
    };
    gw_part.parse::<Gameweek>().ok().map(|gw| (gw, field))
}

/// Read a projection CSV from `path`.
///
/// Fatal when the `ID` column or every per-gameweek column is missing; blank
/// numeric cells read as zero.
pub fn read_projection_csv(path: &Path, weight: f64) -> Result<ProjectionSource, DataError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut reader = csv::Reader::from_path(path).map_err(|err| DataError::Read {
        source_name: name.clone(),
        message: err.to_string(),
    })?;

    let headers = reader
        .headers()
        .map_err(|err| DataError::Read {
            source_name: name.clone(),
            message: err.to_string(),
        })?
        .clone();

    let id_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("ID"))
        .ok_or_else(|| DataError::MissingColumn {
            source_name: name.clone(),
            column: "ID".to_string(),
        })?;

    let gw_columns: Vec<(usize, Gameweek, GwField)> = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| parse_gw_column(h).map(|(gw, field)| (idx, gw, field)))
        .collect();
    if gw_columns.is_empty() {
        return Err(DataError::MissingColumn {
            source_name: name,
            column: "{gw}_Pts".to_string(),
        });
    }

    let mut rows: HashMap<PlayerId, BTreeMap<Gameweek, GwProjection>> = HashMap::new();
    for (row_no, record) in reader.records().enumerate() {
        let line = row_no as u64 + 2; // header is line 1
        let record = record.map_err(|err| DataError::MalformedRow {
            source_name: name.clone(),
            line,
            message: err.to_string(),
        })?;

        let raw_id = record.get(id_idx).unwrap_or("").trim();
        let id: u32 = raw_id.parse().map_err(|_| DataError::MalformedRow {
            source_name: name.clone(),
            line,
            message: format!("unparseable player id '{}'", raw_id),
        })?;

        let per_gw = rows.entry(PlayerId::new(id)).or_default();
        for &(idx, gw, field) in &gw_columns {
            let cell = record.get(idx).unwrap_or("").trim();
            let value: f64 = if cell.is_empty() {
                0.0
            } else {
                cell.parse().map_err(|_| DataError::MalformedRow {
                    source_name: name.clone(),
                    line,
                    message: format!("unparseable value '{}' in column {}", cell, gw),
                })?
            };
            let entry = per_gw.entry(gw).or_default();
            match field {
                GwField::Pts => entry.xp = value,
                GwField::XMins => entry.xmin = value,
            }
        }
    }

    tracing::debug!(
        source = %name,
        players = rows.len(),
        gameweeks = gw_columns.len() / 2,
        "parsed projection source"
    );

    Ok(ProjectionSource { name, weight, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn parses_paired_gameweek_columns() {
        let file = write_csv(
            "ID,Name,Pos,Team,Value,12_Pts,12_xMins,13_Pts,13_xMins\n\
             427,Salah,M,12,131,7.2,88.0,6.8,85.0\n\
             1,Raya,G,1,55,4.1,90.0,3.9,90.0\n",
        );
        let source = read_projection_csv(file.path(), 1.0).unwrap();
        assert_eq!(source.rows.len(), 2);
        assert_eq!(source.gameweeks(), vec![12, 13]);

        let salah = &source.rows[&PlayerId::new(427)];
        assert_eq!(salah[&12].xp, 7.2);
        assert_eq!(salah[&12].xmin, 88.0);
        assert_eq!(salah[&13].xp, 6.8);
    }

    #[test]
    fn blank_cells_read_as_zero() {
        let file = write_csv(
            "ID,Name,Pos,Team,Value,5_Pts,5_xMins\n\
             9,Someone,D,3,45,,\n",
        );
        let source = read_projection_csv(file.path(), 1.0).unwrap();
        let row = &source.rows[&PlayerId::new(9)];
        assert_eq!(row[&5].xp, 0.0);
        assert_eq!(row[&5].xmin, 0.0);
    }

    #[test]
    fn missing_id_column_is_fatal() {
        let file = write_csv("Name,5_Pts,5_xMins\nSomeone,1.0,90\n");
        let err = read_projection_csv(file.path(), 1.0).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { column, .. } if column == "ID"));
    }

    #[test]
    fn no_gameweek_columns_is_fatal() {
        let file = write_csv("ID,Name\n1,Someone\n");
        let err = read_projection_csv(file.path(), 1.0).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { .. }));
    }

    #[test]
    fn malformed_id_reports_the_line() {
        let file = write_csv("ID,3_Pts,3_xMins\nabc,1.0,90\n");
        let err = read_projection_csv(file.path(), 1.0).unwrap_err();
        assert!(matches!(err, DataError::MalformedRow { line: 2, .. }));
    }
}
