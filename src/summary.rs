//! Window-level totals over annotated stations.

use serde::Serialize;

use crate::filter::TimeFilter;
use crate::model::StationTraffic;

/// Totals for one aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficSummary {
    pub time_filter: i32,
    pub label: String,
    pub stations: usize,
    pub active_stations: usize,
    pub departures: usize,
    pub arrivals: usize,
    pub total_traffic: usize,
    pub mean_traffic: f64,
    pub stddev_traffic: f64,
}

impl TrafficSummary {
    pub fn from_traffic(filter: TimeFilter, rows: &[StationTraffic]) -> Self {
        let totals: Vec<f64> = rows.iter().map(|r| r.total_traffic as f64).collect();
        let avg = mean(&totals);

        TrafficSummary {
            time_filter: filter.as_i32(),
            label: filter.to_string(),
            stations: rows.len(),
            active_stations: rows.iter().filter(|r| r.total_traffic > 0).count(),
            departures: rows.iter().map(|r| r.departures).sum(),
            arrivals: rows.iter().map(|r| r.arrivals).sum(),
            total_traffic: rows.iter().map(|r| r.total_traffic).sum(),
            mean_traffic: avg,
            stddev_traffic: stddev(&totals, avg),
        }
    }
}

/// The `n` busiest stations, highest total first. Ties keep input order.
pub fn busiest(rows: &[StationTraffic], n: usize) -> Vec<&StationTraffic> {
    let mut sorted: Vec<&StationTraffic> = rows.iter().collect();
    sorted.sort_by(|a, b| b.total_traffic.cmp(&a.total_traffic));
    sorted.truncate(n);
    sorted
}

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Station;

    fn row(id: &str, departures: usize, arrivals: usize) -> StationTraffic {
        let station = Station {
            id: id.to_string(),
            lat: 0.0,
            lon: 0.0,
            name: id.to_string(),
        };
        StationTraffic::new(&station, departures, arrivals)
    }

    #[test]
    fn test_mean_and_stddev() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(stddev(&[], 0.0), 0.0);
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&v);
        assert_eq!(m, 5.0);
        assert_eq!(stddev(&v, m), 2.0);
    }

    #[test]
    fn test_summary_totals() {
        let rows = vec![row("A", 3, 1), row("B", 0, 0), row("C", 1, 3)];
        let s = TrafficSummary::from_traffic(TimeFilter::Around(510), &rows);

        assert_eq!(s.time_filter, 510);
        assert_eq!(s.label, "8:30 AM");
        assert_eq!(s.stations, 3);
        assert_eq!(s.active_stations, 2);
        assert_eq!(s.departures, 4);
        assert_eq!(s.arrivals, 4);
        assert_eq!(s.total_traffic, 8);
        assert!((s.mean_traffic - 8.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_empty() {
        let s = TrafficSummary::from_traffic(TimeFilter::Any, &[]);
        assert_eq!(s.time_filter, -1);
        assert_eq!(s.label, "any time");
        assert_eq!(s.total_traffic, 0);
        assert_eq!(s.mean_traffic, 0.0);
    }

    #[test]
    fn test_busiest_orders_and_truncates() {
        let rows = vec![row("A", 1, 0), row("B", 5, 5), row("C", 2, 0), row("D", 1, 1)];
        let top: Vec<_> = busiest(&rows, 3).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(top, vec!["B", "C", "D"]);
    }

    #[test]
    fn test_busiest_ties_keep_input_order() {
        let rows = vec![row("A", 1, 0), row("B", 0, 1), row("C", 1, 0)];
        let top: Vec<_> = busiest(&rows, 10).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(top, vec!["A", "B", "C"]);
    }
}
