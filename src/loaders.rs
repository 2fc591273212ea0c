//! Readers for the master files and for artifacts persisted by earlier runs.
//!
//! Every master file is comma-separated with one header line. A file that
//! cannot be opened is logged and yields an empty record set; a row with an
//! unparsable field inside an existing file is a fatal load error.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord};
use tracing::warn;

use crate::models::{Group, Join, Line, Node, Station};
use crate::tour_expansion::NextHopTable;

/// The coarse tour file carries a fixed-size solver header before the
/// node indices start.
const TOUR_HEADER_LINES: usize = 6;

fn open_or_empty(path: &Path) -> Option<File> {
    match File::open(path) {
        Ok(file) => Some(file),
        Err(error) => {
            warn!("failed to open {}: {error}", path.display());
            None
        }
    }
}

fn field<'a>(record: &'a StringRecord, index: usize, name: &str) -> Result<&'a str> {
    record
        .get(index)
        .with_context(|| format!("record is missing column {index} ({name})"))
}

fn parse_field<T>(record: &StringRecord, index: usize, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = field(record, index, name)?;
    raw.parse::<T>()
        .with_context(|| format!("unparsable {name} field: {raw:?}"))
}

/// Station master. Trailing columns beyond the ones used here are ignored,
/// as are the kana/romaji name columns.
pub fn read_stations(path: &Path) -> Result<Vec<Station>> {
    let Some(file) = open_or_empty(path) else {
        return Ok(Vec::new());
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut stations = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("bad record in {}", path.display()))?;
        stations.push(Station {
            station_code: parse_field(&record, 0, "station_cd")?,
            station_group_code: parse_field(&record, 1, "station_g_cd")?,
            station_name: field(&record, 2, "station_name")?.to_string(),
            line_code: parse_field(&record, 5, "line_cd")?,
            prefecture_code: parse_field(&record, 6, "pref_cd")?,
            post: field(&record, 7, "post")?.to_string(),
            address: field(&record, 8, "address")?.to_string(),
            lon: parse_field(&record, 9, "lon")?,
            lat: parse_field(&record, 10, "lat")?,
        });
    }
    Ok(stations)
}

pub fn read_joins(path: &Path) -> Result<Vec<Join>> {
    let Some(file) = open_or_empty(path) else {
        return Ok(Vec::new());
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut joins = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("bad record in {}", path.display()))?;
        joins.push(Join {
            line_code: parse_field(&record, 0, "line_cd")?,
            station_code1: parse_field(&record, 1, "station_cd1")?,
            station_code2: parse_field(&record, 2, "station_cd2")?,
        });
    }
    Ok(joins)
}

pub fn read_lines(path: &Path) -> Result<Vec<Line>> {
    let Some(file) = open_or_empty(path) else {
        return Ok(Vec::new());
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut lines = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("bad record in {}", path.display()))?;
        lines.push(Line {
            line_code: parse_field(&record, 0, "line_cd")?,
            line_name: field(&record, 2, "line_name")?.to_string(),
        });
    }
    Ok(lines)
}

pub fn read_groups(path: &Path) -> Result<Vec<Group>> {
    let Some(file) = open_or_empty(path) else {
        return Ok(Vec::new());
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut groups = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("bad record in {}", path.display()))?;
        groups.push(Group {
            station_code: parse_field(&record, 0, "station_cd")?,
            leader: parse_field(&record, 1, "leader")?,
        });
    }
    Ok(groups)
}

/// Node table persisted by a prior routing run (`node_id,station_cd`).
pub fn read_nodes(path: &Path) -> Result<Vec<Node>> {
    let Some(file) = open_or_empty(path) else {
        return Ok(Vec::new());
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut nodes = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("bad record in {}", path.display()))?;
        nodes.push(Node {
            node_id: parse_field(&record, 0, "node_id")?,
            station_code: parse_field(&record, 1, "station_cd")?,
        });
    }
    Ok(nodes)
}

/// Coarse tour in the solver's output dialect: a fixed header, then one
/// 1-based node index per line, terminated by a `-1` sentinel. Indices are
/// returned 0-based.
pub fn read_tour(path: &Path) -> Result<Vec<u32>> {
    let Some(file) = open_or_empty(path) else {
        return Ok(Vec::new());
    };
    let reader = BufReader::new(file);

    let mut tour = Vec::new();
    for line in reader.lines().skip(TOUR_HEADER_LINES) {
        let line = line.with_context(|| format!("read error in {}", path.display()))?;
        let trimmed = line.trim();
        if trimmed == "-1" {
            break;
        }
        let index: i64 = trimmed
            .parse()
            .with_context(|| format!("unparsable tour entry: {trimmed:?}"))?;
        let node_id = u32::try_from(index - 1)
            .with_context(|| format!("tour entry {index} is not a valid 1-based node index"))?;
        tour.push(node_id);
    }
    Ok(tour)
}

/// Persisted next-hop matrix: one whitespace-separated row per origin node,
/// each row a comma-separated list of destination next hops (trailing comma
/// tolerated). Row count defines the dimension and every row must match it.
pub fn read_next_hop_matrix(path: &Path) -> Result<NextHopTable> {
    let Some(mut file) = open_or_empty(path) else {
        return Ok(NextHopTable::from_rows(Vec::new()));
    };
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .with_context(|| format!("read error in {}", path.display()))?;

    let raw_rows: Vec<&str> = contents.split_whitespace().collect();
    let n = raw_rows.len();

    let mut rows = Vec::with_capacity(n);
    for (row_index, raw_row) in raw_rows.iter().enumerate() {
        let mut row = Vec::with_capacity(n);
        for value in raw_row.split(',').filter(|value| !value.is_empty()) {
            let next: i32 = value
                .parse()
                .with_context(|| format!("unparsable next hop {value:?} in row {row_index}"))?;
            row.push(next);
        }
        if row.len() != n {
            bail!(
                "next-hop matrix row {row_index} has {} fields, expected {n}",
                row.len()
            );
        }
        rows.push(row);
    }
    Ok(NextHopTable::from_rows(rows))
}
