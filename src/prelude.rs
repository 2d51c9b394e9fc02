// Re-export key components
pub use crate::algo::{PruneConfig, prune};
pub use crate::export::{save_network_csv, save_summary_csv, write_summary_csv};
pub use crate::loading::{
    load_clean_network, load_lion_network, load_sign_records, load_speed_records,
};
pub use crate::model::{
    LocatorConfig, NetworkAttributes, RoadNetwork, SignState,
};
pub use crate::resolve::{
    SignSummary, SpeedSummary, apply_sign_records, apply_speed_records, match_sign_endpoints,
    match_speed_endpoints,
};
pub use crate::routing::{PathConfig, directional_path, street_aware_path};

// Core identifier types
pub use crate::EdgeId;
pub use crate::NodeId;

pub use crate::Error;
