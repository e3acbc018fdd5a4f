//! Minute-of-day bucket indexes over trips.

use crate::filter::{MINUTES_PER_DAY, TimeFilter, minutes_since_midnight};
use crate::model::Trip;

/// 1440 ordered slots, one per minute of the day.
#[derive(Debug, Clone)]
pub struct MinuteBuckets<T> {
    slots: Vec<Vec<T>>,
}

impl<T> Default for MinuteBuckets<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MinuteBuckets<T> {
    pub fn new() -> Self {
        MinuteBuckets {
            slots: (0..MINUTES_PER_DAY).map(|_| Vec::new()).collect(),
        }
    }

    /// Files `item` under `minute`, taken modulo a day.
    pub fn push(&mut self, minute: usize, item: T) {
        self.slots[minute % MINUTES_PER_DAY].push(item);
    }

    pub fn slot(&self, minute: usize) -> &[T] {
        &self.slots[minute % MINUTES_PER_DAY]
    }

    /// Total number of items across all slots.
    pub fn len(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }

    /// Items whose slot falls inside the filter's window, visiting slots in window order.
    pub fn select(&self, filter: TimeFilter) -> impl Iterator<Item = &T> + '_ {
        let [head, tail] = filter.ranges();
        self.slots[head]
            .iter()
            .chain(self.slots[tail].iter())
            .flatten()
    }
}

/// Departure and arrival indexes built from one trip list.
///
/// Departures are keyed by start minute, arrivals by end minute.
#[derive(Debug, Clone, Default)]
pub struct TripBuckets {
    pub departures: MinuteBuckets<Trip>,
    pub arrivals: MinuteBuckets<Trip>,
}

impl TripBuckets {
    pub fn from_trips<I>(trips: I) -> Self
    where
        I: IntoIterator<Item = Trip>,
    {
        let mut buckets = TripBuckets::default();
        for trip in trips {
            buckets.insert(trip);
        }
        buckets
    }

    pub fn insert(&mut self, trip: Trip) {
        let start = minutes_since_midnight(&trip.started_at);
        let end = minutes_since_midnight(&trip.ended_at);
        self.departures.push(start, trip.clone());
        self.arrivals.push(end, trip);
    }

    /// Number of trips indexed.
    pub fn trip_count(&self) -> usize {
        self.departures.len()
    }
}
