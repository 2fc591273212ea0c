// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

use serde_derive::Deserialize;
use serde_derive::Serialize;

/// One row of the station master file. Loaded once, read-only afterwards.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Station {
    pub station_code: i32,
    /// Stations sharing a group code belong to one physical complex
    /// (co-located platforms on different lines).
    pub station_group_code: i32,
    pub station_name: String,
    pub line_code: i32,
    pub prefecture_code: i32,
    pub post: String,
    pub address: String,
    pub lon: f64,
    pub lat: f64,
}

/// One physically connected track segment between two stations.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Join {
    pub line_code: i32,
    pub station_code1: i32,
    pub station_code2: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Line {
    pub line_code: i32,
    pub line_name: String,
}

/// A graph vertex. Ids are dense, assigned in first-seen order, so a node
/// table persisted by one run can be reloaded by a later one.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    pub node_id: u32,
    pub station_code: i32,
}

/// Precomputed component membership: station code -> leader station code.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub station_code: i32,
    pub leader: i32,
}
