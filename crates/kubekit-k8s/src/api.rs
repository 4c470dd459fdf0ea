use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Endpoints, Pod};
use kube::api::{ListParams, PostParams};
use kube::{Api, ResourceExt};
use tracing::debug;

use crate::error::{Error, Result};

/// The subset of the Kubernetes API used by the rollout controller and the
/// target resolver.
#[allow(async_fn_in_trait)]
pub trait ClusterApi {
    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment>;

    async fn replace_deployment(&self, namespace: &str, deployment: &Deployment)
    -> Result<Deployment>;

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>>;

    async fn get_endpoints(&self, namespace: &str, name: &str) -> Result<Endpoints>;

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod>;
}

impl ClusterApi for kube::Client {
    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment> {
        debug!("GET deployment {}/{}", namespace, name);
        let deployments: Api<Deployment> = Api::namespaced(self.clone(), namespace);
        deployments
            .get(name)
            .await
            .map_err(|e| Error::from_api(e, "deployment", namespace, name))
    }

    async fn replace_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<Deployment> {
        let name = deployment.name_any();
        debug!("PUT deployment {}/{}", namespace, name);
        let deployments: Api<Deployment> = Api::namespaced(self.clone(), namespace);
        deployments
            .replace(&name, &PostParams::default(), deployment)
            .await
            .map_err(|e| Error::from_api(e, "deployment", namespace, &name))
    }

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>> {
        debug!("LIST deployments in {}", namespace);
        let deployments: Api<Deployment> = Api::namespaced(self.clone(), namespace);
        let list = deployments.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn get_endpoints(&self, namespace: &str, name: &str) -> Result<Endpoints> {
        debug!("GET endpoints {}/{}", namespace, name);
        let endpoints: Api<Endpoints> = Api::namespaced(self.clone(), namespace);
        endpoints
            .get(name)
            .await
            .map_err(|e| Error::from_api(e, "endpoints", namespace, name))
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        debug!("GET pod {}/{}", namespace, name);
        let pods: Api<Pod> = Api::namespaced(self.clone(), namespace);
        pods.get(name)
            .await
            .map_err(|e| Error::from_api(e, "pod", namespace, name))
    }
}
