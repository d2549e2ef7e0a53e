//! Command implementations

pub mod proxy;
