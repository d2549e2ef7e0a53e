//! Configuration: settings file and cluster context

pub mod cluster;
pub mod settings;

pub use cluster::{ClusterContext, ClusterOptions};
pub use settings::Settings;
