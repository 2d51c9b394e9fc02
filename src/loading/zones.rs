//! Zone polygon CSV: one boundary vertex per row (`zone`, `lat`, `lon`),
//! vertices in ring order, rows grouped by zone id.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use itertools::Itertools;
use log::info;
use serde::Deserialize;

use crate::Error;
use crate::geometry::{Zone, ZoneIndex};

#[derive(Debug, Deserialize)]
struct ZoneVertexRow {
    zone: u32,
    lat: f64,
    lon: f64,
}

pub fn load_zones(path: &Path) -> Result<ZoneIndex, Error> {
    read_zones(File::open(path)?)
}

/// Zone boundaries are structural input like the network itself, so a
/// malformed row aborts the read.
pub fn read_zones<R: Read>(reader: R) -> Result<ZoneIndex, Error> {
    let mut reader = csv::Reader::from_reader(reader);
    let rows: Vec<ZoneVertexRow> = reader.deserialize().collect::<Result<_, _>>()?;

    let grouped = rows.iter().chunk_by(|row| row.zone);
    let mut zones = Vec::new();
    for (zone, vertices) in &grouped {
        zones.push(Zone::new(
            zone,
            vertices.map(|v| (v.lon, v.lat)).collect(),
        ));
    }

    info!("zone boundaries read: {} zones", zones.len());
    Ok(ZoneIndex::new(zones))
}
