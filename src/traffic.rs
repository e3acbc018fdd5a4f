//! Per-station arrival and departure counts for a time filter.

use std::collections::HashMap;

use crate::buckets::{MinuteBuckets, TripBuckets};
use crate::filter::TimeFilter;
use crate::model::{Station, StationTraffic, Trip};

/// Counts selected trips per station id, keyed by whichever end `key` picks.
fn rollup<'a, F>(
    index: &'a MinuteBuckets<Trip>,
    filter: TimeFilter,
    key: F,
) -> HashMap<&'a str, usize>
where
    F: Fn(&'a Trip) -> &'a str,
{
    let mut counts = HashMap::new();
    for trip in index.select(filter) {
        *counts.entry(key(trip)).or_insert(0) += 1;
    }
    counts
}

/// Annotates each station with its departures, arrivals and total traffic under `filter`.
///
/// Output order matches `stations`. Stations without trips get zero counts, and
/// trips naming a station that is not in `stations` are ignored.
pub fn compute_station_traffic(
    stations: &[Station],
    buckets: &TripBuckets,
    filter: TimeFilter,
) -> Vec<StationTraffic> {
    let departures = rollup(&buckets.departures, filter, |t| t.start_station_id.as_str());
    let arrivals = rollup(&buckets.arrivals, filter, |t| t.end_station_id.as_str());

    stations
        .iter()
        .map(|station| {
            let id = station.id.as_str();
            StationTraffic::new(
                station,
                departures.get(id).copied().unwrap_or(0),
                arrivals.get(id).copied().unwrap_or(0),
            )
        })
        .collect()
}
