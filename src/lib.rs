//! kubectl-ssh-proxy - run ssh, scp and sftp through a helper pod inside a
//! Kubernetes cluster.
//!
//! The library exposes the two halves of a run: [`k8s::resolver`] finds (or
//! provisions) the helper pod and waits for it, and [`transport`] builds the
//! proxy directive and hands the terminal over to the client binary.

pub mod commands;
pub mod config;
pub mod k8s;
pub mod transport;
pub mod utils;
