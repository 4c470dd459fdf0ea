//! Shared types for kubekit
//!
//! This crate contains data structures used across multiple kubekit crates.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};

// ============================================================================
// Kubernetes Resource Types
// ============================================================================

/// Kubernetes context information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextInfo {
    pub name: String,
    pub cluster: String,
    pub user: String,
    pub namespace: Option<String>,
    pub is_current: bool,
}

impl ContextInfo {
    pub fn new(
        name: String,
        cluster: String,
        user: String,
        namespace: Option<String>,
        is_current: bool,
    ) -> Self {
        Self {
            name,
            cluster,
            user,
            namespace,
            is_current,
        }
    }

    /// Namespace of the context, falling back to `default`
    pub fn namespace_or_default(&self) -> &str {
        self.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }
}

/// Namespace used when neither flags nor kubeconfig name one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Identifies a deployment for the duration of one invocation
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeploymentRef {
    pub namespace: String,
    pub name: String,
}

impl DeploymentRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for DeploymentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Deployment information
#[derive(Clone, Debug)]
pub struct DeploymentInfo {
    pub name: String,
    pub namespace: String,
    pub replicas: i32,
    pub ready_replicas: i32,
    pub updated_replicas: i32,
    pub available_replicas: i32,
    pub created_at: Option<DateTime<Utc>>,
}

impl DeploymentInfo {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            replicas: 0,
            ready_replicas: 0,
            updated_replicas: 0,
            available_replicas: 0,
            created_at: None,
        }
    }

    /// Format replica status as "ready/total"
    pub fn replica_status(&self) -> String {
        format!("{}/{}", self.ready_replicas, self.replicas)
    }
}

/// Pod information
#[derive(Clone, Debug)]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    pub status: PodStatus,
    pub containers: Vec<ContainerInfo>,
    /// Number of containers declared in the pod spec
    pub declared_containers: usize,
    pub images: Vec<String>,
    pub node_name: Option<String>,
    pub pod_ip: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl PodInfo {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            status: PodStatus::Unknown,
            containers: Vec::new(),
            declared_containers: 0,
            images: Vec::new(),
            node_name: None,
            pod_ip: None,
            created_at: None,
        }
    }

    /// Format container readiness as "ready/total"
    pub fn ready_status(&self) -> String {
        let ready = self.containers.iter().filter(|c| c.ready).count();
        format!("{}/{}", ready, self.declared_containers)
    }

    pub fn restarts(&self) -> i32 {
        self.containers.iter().map(|c| c.restart_count).sum()
    }

    /// Distinct image versions across all containers, sorted
    pub fn image_versions(&self) -> Vec<String> {
        let mut versions: Vec<String> = self.images.iter().map(|i| image_version(i)).collect();
        versions.sort();
        versions.dedup();
        versions
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PodStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<&str> for PodStatus {
    fn from(s: &str) -> Self {
        match s {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ContainerInfo {
    pub name: String,
    pub ready: bool,
    pub restart_count: i32,
}

impl ContainerInfo {
    pub fn new(name: String) -> Self {
        Self {
            name,
            ready: false,
            restart_count: 0,
        }
    }
}

/// Service information
#[derive(Clone, Debug)]
pub struct ServiceInfo {
    pub name: String,
    pub namespace: String,
    pub service_type: String,
    pub cluster_ip: Option<String>,
    pub external_ip: Option<String>,
    pub ports: Vec<ServicePortInfo>,
    pub created_at: Option<DateTime<Utc>>,
}

impl ServiceInfo {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            service_type: String::new(),
            cluster_ip: None,
            external_ip: None,
            ports: Vec::new(),
            created_at: None,
        }
    }

    /// Ports in `port[:nodePort]/protocol` form, comma separated
    pub fn ports_display(&self) -> String {
        self.ports
            .iter()
            .map(ServicePortInfo::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServicePortInfo {
    pub port: i32,
    pub node_port: Option<i32>,
    pub protocol: String,
}

impl fmt::Display for ServicePortInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node_port {
            Some(node_port) if node_port != 0 => {
                write!(f, "{}:{}/{}", self.port, node_port, self.protocol)
            }
            _ => write!(f, "{}/{}", self.port, self.protocol),
        }
    }
}

// ============================================================================
// Rollout Types
// ============================================================================

/// A single snapshot of a deployment's rollout progress
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RolloutObservation {
    pub observed_generation: i64,
    pub generation: i64,
    pub updated_replicas: i32,
    pub ready_replicas: i32,
    pub available_replicas: i32,
    pub desired_replicas: i32,
    /// Value of the template's `restartedAt` annotation, if any
    pub restarted_at: Option<DateTime<Utc>>,
}

impl RolloutObservation {
    /// All replica counts match the desired count and the controller has
    /// seen the latest generation.
    pub fn is_converged(&self) -> bool {
        self.updated_replicas == self.desired_replicas
            && self.ready_replicas == self.desired_replicas
            && self.available_replicas == self.desired_replicas
            && self.observed_generation >= self.generation
    }
}

impl fmt::Display for RolloutObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ObservedGeneration={}/{} Updated={} Ready={} Available={} Desired={}",
            self.observed_generation,
            self.generation,
            self.updated_replicas,
            self.ready_replicas,
            self.available_replicas,
            self.desired_replicas
        )
    }
}

// ============================================================================
// Port Forwarding Types
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PortSpecError {
    #[error("invalid port number: {0}")]
    InvalidPort(String),

    #[error("invalid port specification format: {0}")]
    InvalidFormat(String),
}

/// Local/remote port pair written as `local:remote` or a single `port`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortSpec {
    pub local: u16,
    pub remote: u16,
}

impl FromStr for PortSpec {
    type Err = PortSpecError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = spec.split(':').collect();
        match parts.as_slice() {
            [port] => {
                let port = parse_port(port)?;
                Ok(Self {
                    local: port,
                    remote: port,
                })
            }
            [local, remote] => Ok(Self {
                local: parse_port(local)?,
                remote: parse_port(remote)?,
            }),
            _ => Err(PortSpecError::InvalidFormat(spec.to_string())),
        }
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.local, self.remote)
    }
}

fn parse_port(s: &str) -> Result<u16, PortSpecError> {
    match s.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(PortSpecError::InvalidPort(s.to_string())),
        Ok(port) => Ok(port),
    }
}

// ============================================================================
// Formatting Helpers
// ============================================================================

/// kubectl-style age: `42s`, `5m`, `3h`, `12d`
pub fn format_age(age: TimeDelta) -> String {
    let secs = age.num_seconds().max(0);
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 60 * 60 {
        format!("{}m", secs / 60)
    } else if secs < 24 * 60 * 60 {
        format!("{}h", secs / (60 * 60))
    } else {
        format!("{}d", secs / (24 * 60 * 60))
    }
}

/// Age of a creation timestamp relative to now, `<unknown>` when absent
pub fn age_since(created_at: Option<DateTime<Utc>>) -> String {
    created_at
        .map(|t| format_age(Utc::now() - t))
        .unwrap_or_else(|| "<unknown>".to_string())
}

/// Shorten a string to `max` characters, ending with `...` when cut
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= 3 {
        return s.chars().take(max).collect();
    }
    let mut out: String = s.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

/// Version part of an image reference
///
/// - `nginx:1.25` -> `1.25`
/// - `gcr.io/app/backend@sha256:abcdef12345...` -> `sha256:abcdef1234`
/// - `busybox` -> `latest`
pub fn image_version(image: &str) -> String {
    if let Some(idx) = image.find("@sha256:") {
        let digest = &image[idx + 1..];
        return digest.chars().take(17).collect();
    }

    let name_start = image.rfind('/').map(|i| i + 1).unwrap_or(0);
    match image[name_start..].rfind(':') {
        Some(idx) => image[name_start + idx + 1..].to_string(),
        None => "latest".to_string(),
    }
}
