//! Resolves `pod` / `svc/<name>` arguments to a concrete pod name.

use k8s_openapi::api::core::v1::Endpoints;
use tracing::debug;

use crate::api::ClusterApi;
use crate::error::{Error, Result};

const SERVICE_PREFIXES: [&str; 2] = ["svc/", "service/"];

/// What the user asked to attach a tunnel to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ForwardTarget {
    Pod(String),
    Service(String),
}

impl ForwardTarget {
    /// Parses `svc/<name>` or `service/<name>` (prefix matched
    /// case-insensitively) as a service, anything else as a pod name.
    pub fn parse(target: &str) -> Result<Self> {
        let lower = target.to_ascii_lowercase();
        if SERVICE_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            return match target.split_once('/') {
                Some((_, name)) if !name.is_empty() => Ok(Self::Service(name.to_string())),
                _ => Err(Error::InvalidTarget(target.to_string())),
            };
        }

        if target.is_empty() {
            return Err(Error::InvalidTarget(target.to_string()));
        }

        Ok(Self::Pod(target.to_string()))
    }
}

/// Resolves `target` in `namespace` to exactly one pod name.
///
/// Services resolve to the first address, in listing order, whose backing
/// reference is a pod. Readiness is not considered.
pub async fn resolve<C: ClusterApi>(api: &C, namespace: &str, target: &str) -> Result<String> {
    match ForwardTarget::parse(target)? {
        ForwardTarget::Service(service) => {
            let endpoints = api
                .get_endpoints(namespace, &service)
                .await
                .map_err(|e| Error::LookupFailed {
                    service: service.clone(),
                    source: Box::new(e),
                })?;

            let pod = first_backing_pod(&endpoints).ok_or(Error::NoBackingPod(service.clone()))?;
            debug!("service {}/{} resolved to pod {}", namespace, service, pod);
            Ok(pod)
        }
        ForwardTarget::Pod(pod) => {
            api.get_pod(namespace, &pod)
                .await
                .map_err(|e| Error::PodNotFound {
                    pod: pod.clone(),
                    source: Box::new(e),
                })?;
            Ok(pod)
        }
    }
}

/// Name of the first endpoint address that references a pod
pub fn first_backing_pod(endpoints: &Endpoints) -> Option<String> {
    endpoints
        .subsets
        .iter()
        .flatten()
        .flat_map(|subset| subset.addresses.iter().flatten())
        .filter_map(|address| address.target_ref.as_ref())
        .find(|target| {
            target.kind.as_deref() == Some("Pod")
                && target.name.as_deref().is_some_and(|n| !n.is_empty())
        })
        .and_then(|target| target.name.clone())
}
