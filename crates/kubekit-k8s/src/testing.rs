//! In-memory [`ClusterApi`] used by unit tests.

use std::collections::{HashMap, VecDeque};

use k8s_openapi::api::apps::v1::{Deployment, DeploymentStatus};
use k8s_openapi::api::core::v1::{Endpoints, Pod};
use kube::ResourceExt;
use parking_lot::Mutex;
use serde_json::json;

use crate::api::ClusterApi;
use crate::error::{Error, Result};

type Key = (String, String);

#[derive(Default)]
struct State {
    deployments: HashMap<Key, Deployment>,
    endpoints: HashMap<Key, Endpoints>,
    pods: HashMap<Key, Pod>,
    /// Statuses applied to the deployment on successive gets
    status_script: VecDeque<DeploymentStatus>,
    /// Fail the nth deployment get (1-based)
    fail_get_at: Option<usize>,
    conflict_on_replace: bool,
    deployment_gets: usize,
    deployment_replaces: usize,
    endpoint_gets: usize,
    pod_gets: usize,
}

#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<State>,
}

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deployment(self, deployment: Deployment) -> Self {
        let namespace = deployment.namespace().unwrap_or_default();
        let name = deployment.name_any();
        self.state
            .lock()
            .deployments
            .insert(key(&namespace, &name), deployment);
        self
    }

    pub fn with_endpoints(self, endpoints: Endpoints) -> Self {
        let namespace = endpoints.namespace().unwrap_or_default();
        let name = endpoints.name_any();
        self.state
            .lock()
            .endpoints
            .insert(key(&namespace, &name), endpoints);
        self
    }

    pub fn with_pod(self, pod: Pod) -> Self {
        let namespace = pod.namespace().unwrap_or_default();
        let name = pod.name_any();
        self.state.lock().pods.insert(key(&namespace, &name), pod);
        self
    }

    pub fn with_status_script(self, statuses: Vec<DeploymentStatus>) -> Self {
        self.state.lock().status_script = statuses.into();
        self
    }

    pub fn failing_get_at(self, attempt: usize) -> Self {
        self.state.lock().fail_get_at = Some(attempt);
        self
    }

    pub fn conflicting(self) -> Self {
        self.state.lock().conflict_on_replace = true;
        self
    }

    pub fn deployment_gets(&self) -> usize {
        self.state.lock().deployment_gets
    }

    pub fn deployment_replaces(&self) -> usize {
        self.state.lock().deployment_replaces
    }

    pub fn endpoint_gets(&self) -> usize {
        self.state.lock().endpoint_gets
    }

    pub fn pod_gets(&self) -> usize {
        self.state.lock().pod_gets
    }

    pub fn stored_deployment(&self, namespace: &str, name: &str) -> Option<Deployment> {
        self.state
            .lock()
            .deployments
            .get(&key(namespace, name))
            .cloned()
    }
}

impl ClusterApi for FakeCluster {
    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment> {
        let mut state = self.state.lock();
        state.deployment_gets += 1;

        if state.fail_get_at == Some(state.deployment_gets) {
            return Err(Error::Stream("connection reset".to_string()));
        }

        let next_status = state.status_script.pop_front();
        let deployment = state
            .deployments
            .get_mut(&key(namespace, name))
            .ok_or_else(|| Error::NotFound {
                kind: "deployment",
                namespace: namespace.to_string(),
                name: name.to_string(),
            })?;

        if let Some(status) = next_status {
            deployment.status = Some(status);
        }

        Ok(deployment.clone())
    }

    async fn replace_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<Deployment> {
        let mut state = self.state.lock();
        let name = deployment.name_any();

        if state.conflict_on_replace {
            return Err(Error::Conflict {
                kind: "deployment",
                namespace: namespace.to_string(),
                name,
            });
        }

        state.deployment_replaces += 1;
        let mut stored = deployment.clone();
        stored.metadata.generation = Some(stored.metadata.generation.unwrap_or(0) + 1);
        state
            .deployments
            .insert(key(namespace, &name), stored.clone());
        Ok(stored)
    }

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>> {
        let state = self.state.lock();
        let mut items: Vec<Deployment> = state
            .deployments
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, d)| d.clone())
            .collect();
        items.sort_by_key(|d| d.name_any());
        Ok(items)
    }

    async fn get_endpoints(&self, namespace: &str, name: &str) -> Result<Endpoints> {
        let mut state = self.state.lock();
        state.endpoint_gets += 1;
        state
            .endpoints
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| Error::NotFound {
                kind: "endpoints",
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        let mut state = self.state.lock();
        state.pod_gets += 1;
        state
            .pods
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| Error::NotFound {
                kind: "pod",
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }
}

pub fn deployment(namespace: &str, name: &str, replicas: i32, images: &[&str]) -> Deployment {
    let containers: Vec<_> = images
        .iter()
        .enumerate()
        .map(|(i, image)| json!({ "name": format!("c{}", i), "image": image }))
        .collect();

    serde_json::from_value(json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "generation": 1,
            "creationTimestamp": "2024-01-15T10:30:00Z"
        },
        "spec": {
            "replicas": replicas,
            "selector": { "matchLabels": { "app": name } },
            "template": {
                "metadata": { "labels": { "app": name } },
                "spec": { "containers": containers }
            }
        }
    }))
    .unwrap()
}

pub fn status(
    observed_generation: i64,
    updated: i32,
    ready: i32,
    available: i32,
) -> DeploymentStatus {
    DeploymentStatus {
        observed_generation: Some(observed_generation),
        updated_replicas: Some(updated),
        ready_replicas: Some(ready),
        available_replicas: Some(available),
        ..Default::default()
    }
}

pub fn pod(namespace: &str, name: &str, containers: &[&str]) -> Pod {
    let containers: Vec<_> = containers
        .iter()
        .map(|c| json!({ "name": c, "image": "busybox" }))
        .collect();

    serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": { "name": name, "namespace": namespace },
        "spec": { "containers": containers }
    }))
    .unwrap()
}
