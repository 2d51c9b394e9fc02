//! Network construction and external survey record parsing.
//!
//! Graph construction inputs are assumed to be well-formed survey extracts:
//! any malformed row aborts the read. Record inputs are messier, so their
//! loaders skip rows that fail to parse and report how many they dropped.

mod clean;
mod lion;
mod records;
mod zones;

pub use clean::{load_clean_network, read_clean_network};
pub use lion::{load_lion_network, read_lion_network};
pub use records::{
    RawSignRecord, RawSpeedRecord, SignRecord, SpeedRecord, load_raw_sign_records,
    load_raw_speed_records, load_sign_records, load_speed_records, read_raw_sign_records,
    read_raw_speed_records, read_sign_records, read_speed_records,
};
pub use zones::{load_zones, read_zones};
