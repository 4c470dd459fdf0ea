//! Deployment image updates, restarts and rollout tracking.

use chrono::{DateTime, SecondsFormat, Utc};
use k8s_openapi::api::apps::v1::Deployment;
use kube::ResourceExt;
use tracing::{debug, info, warn};

use kubekit_types::{DeploymentInfo, DeploymentRef, RolloutObservation};

use crate::api::ClusterApi;
use crate::error::{Error, Result};
use crate::poll::{PollOutcome, PollPolicy, poll_until};

/// Template annotation bumped to force a new rollout
pub const RESTARTED_AT_ANNOTATION: &str = "kubectl.kubernetes.io/restartedAt";

/// Replica count the API server assumes when `spec.replicas` is unset
const DEFAULT_REPLICAS: i32 = 1;

/// Drives updates and status checks for a single cluster session
pub struct RolloutController<'a, C> {
    api: &'a C,
}

impl<'a, C: ClusterApi> RolloutController<'a, C> {
    pub fn new(api: &'a C) -> Self {
        Self { api }
    }

    /// Sets `image` on every container of the deployment's pod template.
    pub async fn update_image(&self, target: &DeploymentRef, image: &str) -> Result<()> {
        let image = image.trim();
        if image.is_empty() {
            return Err(Error::InvalidArgument(
                "--image is required when specifying a deployment".to_string(),
            ));
        }

        let mut deployment = self
            .api
            .get_deployment(&target.namespace, &target.name)
            .await?;

        let containers = deployment
            .spec
            .as_mut()
            .and_then(|spec| spec.template.spec.as_mut())
            .map(|pod| &mut pod.containers)
            .ok_or_else(|| {
                Error::InvalidArgument(format!("deployment {} has no pod template", target))
            })?;

        for container in containers.iter_mut() {
            container.image = Some(image.to_string());
        }

        self.api
            .replace_deployment(&target.namespace, &deployment)
            .await?;
        info!("updated deployment {} image to {}", target, image);
        Ok(())
    }

    /// Touches the template's restart annotation so the deployment rolls
    /// out again with an unchanged spec. Returns the timestamp written.
    pub async fn trigger_restart(&self, target: &DeploymentRef) -> Result<DateTime<Utc>> {
        let mut deployment = self
            .api
            .get_deployment(&target.namespace, &target.name)
            .await?;

        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let template = &mut deployment
            .spec
            .as_mut()
            .ok_or_else(|| {
                Error::InvalidArgument(format!("deployment {} has no spec", target))
            })?
            .template;

        template
            .metadata
            .get_or_insert_with(Default::default)
            .annotations
            .get_or_insert_with(Default::default)
            .insert(RESTARTED_AT_ANNOTATION.to_string(), stamp.clone());

        self.api
            .replace_deployment(&target.namespace, &deployment)
            .await?;
        info!("restarted deployment {} at {}", target, stamp);

        DateTime::parse_from_rfc3339(&stamp)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| Error::InvalidArgument(e.to_string()))
    }

    /// Polls the deployment until it converges or the policy's budget runs
    /// out. `on_poll` sees every observation, including the final one.
    ///
    /// A failed fetch aborts the wait at once; only non-convergence is
    /// retried.
    pub async fn wait_for_convergence<F>(
        &self,
        target: &DeploymentRef,
        policy: &PollPolicy,
        mut on_poll: F,
    ) -> Result<RolloutObservation>
    where
        F: FnMut(&RolloutObservation),
    {
        let api = self.api;
        let fetch = || async move {
            api.get_deployment(&target.namespace, &target.name)
                .await
                .map(|d| observe(&d))
        };

        let outcome = poll_until(policy, fetch, |observation| {
            debug!("rollout {}: {}", target, observation);
            on_poll(observation);
            observation.is_converged()
        })
        .await?;

        match outcome {
            PollOutcome::Ready(observation) => {
                info!("rollout of {} complete", target);
                Ok(observation)
            }
            PollOutcome::Exhausted { last, attempts } => {
                warn!(
                    "rollout of {} not complete after {} polls: {}",
                    target, attempts, last
                );
                Err(Error::Timeout {
                    namespace: target.namespace.clone(),
                    name: target.name.clone(),
                })
            }
        }
    }

    /// Current rollout state, fetched once.
    pub async fn status(&self, target: &DeploymentRef) -> Result<RolloutObservation> {
        let deployment = self
            .api
            .get_deployment(&target.namespace, &target.name)
            .await?;
        Ok(observe(&deployment))
    }

    /// All deployments in a namespace, projected for display.
    pub async fn list(&self, namespace: &str) -> Result<Vec<DeploymentInfo>> {
        let deployments = self.api.list_deployments(namespace).await?;
        Ok(deployments
            .into_iter()
            .map(|d| deployment_to_info(d, namespace))
            .collect())
    }
}

/// Builds a rollout snapshot from a fetched deployment
pub fn observe(deployment: &Deployment) -> RolloutObservation {
    let spec = deployment.spec.as_ref();
    let status = deployment.status.as_ref();

    let restarted_at = spec
        .and_then(|s| s.template.metadata.as_ref())
        .and_then(|m| m.annotations.as_ref())
        .and_then(|a| a.get(RESTARTED_AT_ANNOTATION))
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|t| t.with_timezone(&Utc));

    RolloutObservation {
        observed_generation: status.and_then(|s| s.observed_generation).unwrap_or(0),
        generation: deployment.metadata.generation.unwrap_or(0),
        updated_replicas: status.and_then(|s| s.updated_replicas).unwrap_or(0),
        ready_replicas: status.and_then(|s| s.ready_replicas).unwrap_or(0),
        available_replicas: status.and_then(|s| s.available_replicas).unwrap_or(0),
        desired_replicas: spec
            .and_then(|s| s.replicas)
            .unwrap_or(DEFAULT_REPLICAS),
        restarted_at,
    }
}

/// Convert a k8s Deployment to DeploymentInfo
fn deployment_to_info(deploy: Deployment, namespace: &str) -> DeploymentInfo {
    let mut info = DeploymentInfo::new(deploy.name_any(), namespace.to_string());
    info.created_at = deploy.creation_timestamp().map(|t| t.0);

    info.replicas = deploy
        .spec
        .as_ref()
        .and_then(|s| s.replicas)
        .unwrap_or(DEFAULT_REPLICAS);

    if let Some(status) = deploy.status {
        info.ready_replicas = status.ready_replicas.unwrap_or(0);
        info.updated_replicas = status.updated_replicas.unwrap_or(0);
        info.available_replicas = status.available_replicas.unwrap_or(0);
    }

    info
}
