//! Station and trip records, plus the annotated per-station traffic row.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A fixed bike-share dock.
///
/// `id` is the dataset's `short_name`, which is what trip records refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "short_name")]
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

/// A single rental, from undocking at one station to docking at another.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub start_station_id: String,
    pub end_station_id: String,
    pub started_at: NaiveDateTime,
    pub ended_at: NaiveDateTime,
}

/// Whether a station mostly loses bikes, mostly gains them, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowBalance {
    ArrivalHeavy,
    Balanced,
    DepartureHeavy,
}

/// A station annotated with its traffic under some time filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationTraffic {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub departures: usize,
    pub arrivals: usize,
    pub total_traffic: usize,
}

impl StationTraffic {
    pub fn new(station: &Station, departures: usize, arrivals: usize) -> Self {
        StationTraffic {
            id: station.id.clone(),
            name: station.name.clone(),
            lat: station.lat,
            lon: station.lon,
            departures,
            arrivals,
            total_traffic: departures + arrivals,
        }
    }

    /// Share of this station's traffic that was departures, or `None` with no traffic.
    pub fn departure_ratio(&self) -> Option<f64> {
        if self.total_traffic == 0 {
            None
        } else {
            Some(self.departures as f64 / self.total_traffic as f64)
        }
    }

    /// Quantizes [`departure_ratio`](Self::departure_ratio) into three equal bands over `[0, 1]`.
    pub fn flow(&self) -> FlowBalance {
        match self.departure_ratio() {
            Some(r) if r < 1.0 / 3.0 => FlowBalance::ArrivalHeavy,
            Some(r) if r < 2.0 / 3.0 => FlowBalance::Balanced,
            Some(_) => FlowBalance::DepartureHeavy,
            None => FlowBalance::Balanced,
        }
    }
}
