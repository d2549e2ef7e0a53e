//! Utility modules for kubectl-ssh-proxy

pub mod errors;
pub mod logger;
pub mod prereqs;
pub mod progress;

// Re-export commonly used items
pub use errors::ProxyError;
pub use logger::{log_debug, log_info, log_warn};
pub use prereqs::{CommandPrereq, CommonPrereqs, Prerequisite};
pub use progress::WaitProgress;
