use ahash::AHashMap;

use crate::models::{Group, Station};

/// Station master lookups: by station code, and by station-group code.
///
/// Group membership keeps file order. A duplicate station code overwrites the
/// by-code entry (last row wins) but still counts as a group member, matching
/// the upstream master files where duplicates do not occur in practice.
pub struct StationRegistry {
    by_code: AHashMap<i32, Station>,
    by_group_code: AHashMap<i32, Vec<Station>>,
}

impl StationRegistry {
    pub fn new(stations: &[Station]) -> Self {
        let mut by_code = AHashMap::with_capacity(stations.len());
        let mut by_group_code: AHashMap<i32, Vec<Station>> = AHashMap::new();
        for station in stations {
            by_code.insert(station.station_code, station.clone());
            by_group_code
                .entry(station.station_group_code)
                .or_default()
                .push(station.clone());
        }
        Self {
            by_code,
            by_group_code,
        }
    }

    pub fn get(&self, station_code: i32) -> Option<&Station> {
        self.by_code.get(&station_code)
    }

    pub fn in_group(&self, station_group_code: i32) -> &[Station] {
        self.by_group_code
            .get(&station_group_code)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.by_code.values()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

/// Externally supplied component membership (station code -> leader code).
/// Two stations are in the same component iff both are present and share a
/// leader; an absent code is never "same" as anything.
pub struct GroupRegistry {
    leader_by_code: AHashMap<i32, i32>,
}

impl GroupRegistry {
    pub fn new(groups: &[Group]) -> Self {
        let leader_by_code = groups
            .iter()
            .map(|group| (group.station_code, group.leader))
            .collect();
        Self { leader_by_code }
    }

    pub fn is_same(&self, station_code1: i32, station_code2: i32) -> bool {
        match (
            self.leader_by_code.get(&station_code1),
            self.leader_by_code.get(&station_code2),
        ) {
            (Some(leader1), Some(leader2)) => leader1 == leader2,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(code: i32, group: i32) -> Station {
        Station {
            station_code: code,
            station_group_code: group,
            station_name: format!("station-{code}"),
            line_code: 1,
            prefecture_code: 13,
            post: String::new(),
            address: String::new(),
            lon: 139.0,
            lat: 35.0,
        }
    }

    #[test]
    fn lookup_by_code_and_group() {
        let stations = vec![station(100, 10), station(101, 10), station(200, 20)];
        let registry = StationRegistry::new(&stations);

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(100).unwrap().station_group_code, 10);
        assert!(registry.get(999).is_none());

        let members = registry.in_group(10);
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].station_code, 100);
        assert_eq!(members[1].station_code, 101);
        assert!(registry.in_group(99).is_empty());
    }

    #[test]
    fn group_registry_same_leader() {
        let groups = vec![
            Group {
                station_code: 1,
                leader: 7,
            },
            Group {
                station_code: 2,
                leader: 7,
            },
            Group {
                station_code: 3,
                leader: 9,
            },
        ];
        let registry = GroupRegistry::new(&groups);
        assert!(registry.is_same(1, 2));
        assert!(!registry.is_same(1, 3));
        // Absent codes never match, not even against themselves.
        assert!(!registry.is_same(1, 4));
        assert!(!registry.is_same(4, 4));
    }
}
