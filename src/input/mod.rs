pub mod csv_loader;

pub use csv_loader::{load_events, parse_timestamp, read_events, LoadError};
