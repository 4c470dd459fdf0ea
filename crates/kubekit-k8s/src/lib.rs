//! Kubernetes operations for kubekit
//!
//! This crate provides the rollout controller, target resolution, port
//! forwarding, exec, resource listings and kubeconfig switching used by the
//! `kubekit` tools.

mod api;
mod client;
mod containers;
mod error;
mod exec;
mod forward;
mod kubeconfig;
pub mod poll;
mod resources;
pub mod rollout;
mod signal;
pub mod target;

#[cfg(test)]
mod testing;

pub use api::ClusterApi;
pub use client::{KubeClient, Session};
pub use containers::{container_names, select_container};
pub use error::{Error, Result};
pub use exec::{ExecOptions, exec};
pub use forward::PortForwarder;
pub use kubeconfig::KubeconfigFile;
pub use poll::{PollOutcome, PollPolicy};
pub use resources::{list_pods, list_services};
pub use rollout::RolloutController;
pub use signal::cancel_on_signal;

// Re-export types that are used in our public API
pub use kubekit_types::{
    ContainerInfo, ContextInfo, DeploymentInfo, DeploymentRef, PodInfo, PodStatus, PortSpec,
    RolloutObservation, ServiceInfo,
};
