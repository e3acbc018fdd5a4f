pub mod buckets;
pub mod fetch;
pub mod filter;
pub mod model;
pub mod output;
pub mod parser;
pub mod summary;
pub mod traffic;

pub use buckets::{MinuteBuckets, TripBuckets};
pub use filter::TimeFilter;
pub use model::{FlowBalance, Station, StationTraffic, Trip};
pub use traffic::compute_station_traffic;
