//! Decoders for the station list (GBFS JSON) and trip history (CSV).

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDateTime};
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use tracing::debug;

use crate::model::{Station, Trip};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Deserialize)]
struct StationsData {
    stations: Vec<Station>,
}

/// Either a GBFS `station_information` document or a bare array of stations.
#[derive(Deserialize)]
#[serde(untagged)]
enum StationsDocument {
    Gbfs { data: StationsData },
    Bare(Vec<Station>),
}

/// One row of a trip history CSV. Extra columns are ignored.
#[derive(Deserialize)]
struct TripRecord {
    started_at: String,
    ended_at: String,
    start_station_id: String,
    end_station_id: String,
}

/// Decodes a station list, rejecting duplicate ids.
///
/// # Errors
///
/// Returns an error if the JSON is malformed, a station lacks a required
/// field, or two stations share a `short_name`.
pub fn parse_stations(bytes: &[u8]) -> Result<Vec<Station>> {
    let doc: StationsDocument =
        serde_json::from_slice(bytes).context("station list is not a valid GBFS station document")?;
    let stations = match doc {
        StationsDocument::Gbfs { data } => data.stations,
        StationsDocument::Bare(stations) => stations,
    };

    let mut seen = HashSet::new();
    for station in &stations {
        if !seen.insert(station.id.as_str()) {
            bail!("duplicate station id '{}'", station.id);
        }
    }

    debug!(count = stations.len(), "Stations decoded");
    Ok(stations)
}

/// Decodes a trip history CSV, transparently gunzipping it first if needed.
///
/// # Errors
///
/// Returns an error naming the 1-based data row when a required column is
/// missing or a timestamp cannot be parsed.
pub fn parse_trips(bytes: &[u8]) -> Result<Vec<Trip>> {
    let plain;
    let bytes = if bytes.starts_with(&GZIP_MAGIC) {
        let mut buf = Vec::new();
        GzDecoder::new(bytes)
            .read_to_end(&mut buf)
            .context("failed to decompress trip data")?;
        debug!(compressed = bytes.len(), decompressed = buf.len(), "Trip data gunzipped");
        plain = buf;
        plain.as_slice()
    } else {
        bytes
    };

    let mut rdr = csv::Reader::from_reader(bytes);
    let mut trips = Vec::new();

    for (i, result) in rdr.deserialize::<TripRecord>().enumerate() {
        let row = i + 1;
        let record = result.with_context(|| format!("trip row {row} is malformed"))?;
        let started_at = parse_timestamp(&record.started_at)
            .with_context(|| format!("trip row {row}: bad started_at"))?;
        let ended_at = parse_timestamp(&record.ended_at)
            .with_context(|| format!("trip row {row}: bad ended_at"))?;

        trips.push(Trip {
            start_station_id: record.start_station_id,
            end_station_id: record.end_station_id,
            started_at,
            ended_at,
        });
    }

    debug!(count = trips.len(), "Trips decoded");
    Ok(trips)
}

/// Parses a wall-clock timestamp. Offset-bearing values keep their local time.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(t);
        }
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.naive_local());
    }
    bail!("unrecognized timestamp '{s}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    const TRIPS_CSV: &str = "\
ride_id,rideable_type,started_at,ended_at,start_station_id,end_station_id,is_member
r1,classic_bike,2024-03-01 11:40:05.120,2024-03-01 11:45:59,A32000,M32006,1
r2,electric_bike,2024-03-01T23:59:00,2024-03-02T00:04:00,M32006,A32000,0
";

    #[test]
    fn test_parse_gbfs_envelope() {
        let json = br#"{"last_updated":1,"data":{"stations":[
            {"short_name":"A","lat":42.1,"lon":-71.1,"name":"Alpha","capacity":15},
            {"short_name":"B","lat":42.2,"lon":-71.2,"name":"Beta"}
        ]}}"#;
        let stations = parse_stations(json).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[1].id, "B");
        assert_eq!(stations[1].name, "Beta");
    }

    #[test]
    fn test_parse_bare_array() {
        let json = br#"[{"short_name":"A","lat":1.0,"lon":2.0,"name":"Alpha"}]"#;
        let stations = parse_stations(json).unwrap();
        assert_eq!(stations[0].lon, 2.0);
    }

    #[test]
    fn test_station_missing_coordinates_rejected() {
        let json = br#"{"data":{"stations":[{"short_name":"A","name":"Alpha"}]}}"#;
        assert!(parse_stations(json).is_err());
    }

    #[test]
    fn test_duplicate_station_rejected() {
        let json = br#"[
            {"short_name":"A","lat":1.0,"lon":2.0,"name":"Alpha"},
            {"short_name":"A","lat":1.0,"lon":2.0,"name":"Alpha again"}
        ]"#;
        let err = parse_stations(json).unwrap_err();
        assert!(err.to_string().contains("duplicate station id 'A'"));
    }

    #[test]
    fn test_parse_trips_csv() {
        let trips = parse_trips(TRIPS_CSV.as_bytes()).unwrap();
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].start_station_id, "A32000");
        assert_eq!(trips[0].end_station_id, "M32006");
        assert_eq!(trips[1].ended_at.to_string(), "2024-03-02 00:04:00");
    }

    #[test]
    fn test_parse_trips_gzip_matches_plain() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(TRIPS_CSV.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let plain = parse_trips(TRIPS_CSV.as_bytes()).unwrap();
        let gunzipped = parse_trips(&compressed).unwrap();
        assert_eq!(plain, gunzipped);
    }

    #[test]
    fn test_parse_trips_missing_column() {
        let csv = "started_at,ended_at,start_station_id\n2024-03-01 10:00:00,2024-03-01 10:05:00,A\n";
        let err = parse_trips(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("trip row 1"));
    }

    #[test]
    fn test_parse_trips_bad_timestamp_names_row() {
        let csv = "\
started_at,ended_at,start_station_id,end_station_id
2024-03-01 10:00:00,2024-03-01 10:05:00,A,B
yesterday,2024-03-01 10:05:00,A,B
";
        let err = parse_trips(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("trip row 2"));
    }

    #[test]
    fn test_parse_timestamp_forms() {
        assert_eq!(
            parse_timestamp("2024-03-01 07:08:09").unwrap().to_string(),
            "2024-03-01 07:08:09"
        );
        assert_eq!(
            parse_timestamp("2024-03-01 07:08:09.500").unwrap().to_string(),
            "2024-03-01 07:08:09.500"
        );
        assert_eq!(
            parse_timestamp("2024-03-01T07:08:09-05:00")
                .unwrap()
                .to_string(),
            "2024-03-01 07:08:09"
        );
        assert!(parse_timestamp("03/01/2024 7:08").is_err());
    }
}
