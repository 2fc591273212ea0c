// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_derive::Serialize;

use sakura::loaders::read_stations;
use sakura::prefectures::prefecture_name;

/// Dump the station master as JSON on stdout, with prefecture codes
/// resolved to names.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the station master CSV
    station_file: PathBuf,
}

#[derive(Serialize)]
struct StationView {
    station_code: i32,
    station_group_code: i32,
    station_name: String,
    line_code: i32,
    prefecture: &'static str,
    post: String,
    address: String,
    lon: f64,
    lat: f64,
}

#[derive(Serialize)]
struct StationsDump {
    stations: Vec<StationView>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let stations = read_stations(&args.station_file)?;

    let mut views = Vec::with_capacity(stations.len());
    for station in stations {
        let prefecture = prefecture_name(station.prefecture_code).with_context(|| {
            format!(
                "station {} has unknown prefecture code {}",
                station.station_code, station.prefecture_code
            )
        })?;
        views.push(StationView {
            station_code: station.station_code,
            station_group_code: station.station_group_code,
            station_name: station.station_name,
            line_code: station.line_code,
            prefecture,
            post: station.post,
            address: station.address,
            lon: station.lon,
            lat: station.lat,
        });
    }

    let dump = StationsDump { stations: views };
    println!("{}", serde_json::to_string(&dump)?);

    Ok(())
}
