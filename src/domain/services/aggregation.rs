use std::collections::{BTreeMap, HashMap};

use crate::domain::entities::{
    utilization_percent, HeatmapBucket, Kennel, LocationGroup, OccupancySummary,
};

/// Groups kennels by `(building, floor)` and rolls up capacity and the
/// occupancy supplied in `occupied` (kennel id to count on the queried day).
///
/// Groups come back sorted by building then floor, kennel ids sorted within
/// each group, so identical input always yields identical output.
pub fn group_by_location(kennels: &[Kennel], occupied: &HashMap<String, u32>) -> Vec<LocationGroup> {
    let mut groups: BTreeMap<(&str, &str), Vec<&Kennel>> = BTreeMap::new();
    for kennel in kennels {
        groups
            .entry((kennel.building.as_str(), kennel.floor.as_str()))
            .or_default()
            .push(kennel);
    }

    groups
        .into_iter()
        .map(|((building, floor), members)| {
            let capacity: u64 = members.iter().map(|k| u64::from(k.capacity)).sum();
            let occupied: u64 = members
                .iter()
                .map(|k| u64::from(occupied.get(&k.id).copied().unwrap_or(0)))
                .sum();
            let mut kennel_ids: Vec<String> = members.iter().map(|k| k.id.clone()).collect();
            kennel_ids.sort();
            LocationGroup {
                building: building.to_string(),
                floor: floor.to_string(),
                kennel_ids,
                capacity,
                occupied,
                available: capacity.saturating_sub(occupied),
                utilization_percent: utilization_percent(occupied, capacity),
                bucket: HeatmapBucket::classify(occupied, capacity),
            }
        })
        .collect()
}

/// Facility totals from `(capacity, occupied)` pairs, accumulated in `u64`
/// so many large kennels cannot wrap the sum.
pub fn summarize(entries: impl IntoIterator<Item = (u32, u32)>) -> OccupancySummary {
    let mut total_capacity = 0u64;
    let mut total_occupied = 0u64;
    let mut total_available = 0u64;
    for (capacity, occupied) in entries {
        total_capacity += u64::from(capacity);
        total_occupied += u64::from(occupied);
        total_available += u64::from(capacity.saturating_sub(occupied));
    }
    OccupancySummary {
        total_capacity,
        total_occupied,
        total_available,
        overall_utilization_percent: utilization_percent(total_occupied, total_capacity),
    }
}
