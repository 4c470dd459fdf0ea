//! Pod and service listings projected into display rows.

use k8s_openapi::api::core::v1::{Pod, Service};
use kube::api::ListParams;
use kube::{Api, ResourceExt};
use tracing::debug;

use kubekit_types::{ContainerInfo, PodInfo, PodStatus, ServiceInfo, ServicePortInfo};

use crate::error::Result;

/// Fetch pods in `namespace`, or in every namespace when `None`
pub async fn list_pods(client: &kube::Client, namespace: Option<&str>) -> Result<Vec<PodInfo>> {
    let pods: Api<Pod> = match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    };
    debug!("LIST pods in {}", namespace.unwrap_or("all namespaces"));

    let list = pods.list(&ListParams::default()).await?;
    Ok(list.items.into_iter().map(pod_to_info).collect())
}

/// Fetch services in `namespace`, or in every namespace when `None`
pub async fn list_services(
    client: &kube::Client,
    namespace: Option<&str>,
) -> Result<Vec<ServiceInfo>> {
    let services: Api<Service> = match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    };
    debug!("LIST services in {}", namespace.unwrap_or("all namespaces"));

    let list = services.list(&ListParams::default()).await?;
    Ok(list.items.into_iter().map(service_to_info).collect())
}

/// Convert a k8s Pod to PodInfo
pub fn pod_to_info(pod: Pod) -> PodInfo {
    let mut info = PodInfo::new(pod.name_any(), pod.namespace().unwrap_or_default());
    info.created_at = pod.creation_timestamp().map(|t| t.0);

    if let Some(spec) = &pod.spec {
        info.node_name = spec.node_name.clone();
        info.declared_containers = spec.containers.len();
        info.images = spec
            .containers
            .iter()
            .chain(spec.init_containers.iter().flatten())
            .filter_map(|c| c.image.clone())
            .collect();
    }

    if let Some(status) = pod.status {
        info.pod_ip = status.pod_ip;
        info.status = status
            .phase
            .as_deref()
            .map(PodStatus::from)
            .unwrap_or(PodStatus::Unknown);

        if let Some(container_statuses) = status.container_statuses {
            info.containers = container_statuses
                .into_iter()
                .map(|cs| {
                    let mut container = ContainerInfo::new(cs.name);
                    container.ready = cs.ready;
                    container.restart_count = cs.restart_count;
                    container
                })
                .collect();
        }
    }

    info
}

/// Convert a k8s Service to ServiceInfo
pub fn service_to_info(svc: Service) -> ServiceInfo {
    let mut info = ServiceInfo::new(svc.name_any(), svc.namespace().unwrap_or_default());
    info.created_at = svc.creation_timestamp().map(|t| t.0);

    if let Some(spec) = svc.spec {
        info.service_type = spec.type_.unwrap_or_else(|| "ClusterIP".to_string());
        info.cluster_ip = spec.cluster_ip;
        info.ports = spec
            .ports
            .unwrap_or_default()
            .into_iter()
            .map(|p| ServicePortInfo {
                port: p.port,
                node_port: p.node_port,
                protocol: p.protocol.unwrap_or_else(|| "TCP".to_string()),
            })
            .collect();
    }

    info.external_ip = svc
        .status
        .and_then(|s| s.load_balancer)
        .and_then(|lb| lb.ingress)
        .and_then(|ingress| ingress.into_iter().next())
        .and_then(|first| {
            first
                .ip
                .filter(|ip| !ip.is_empty())
                .or(first.hostname.filter(|h| !h.is_empty()))
        });

    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pod_to_info() {
        let pod: Pod = serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": { "name": "web-1", "namespace": "shop" },
            "spec": {
                "nodeName": "node-a",
                "initContainers": [{ "name": "init", "image": "busybox:1.36" }],
                "containers": [
                    { "name": "app", "image": "repo/web:2.1" },
                    { "name": "proxy", "image": "envoy:1.30" }
                ]
            },
            "status": {
                "phase": "Running",
                "podIP": "10.1.2.3",
                "containerStatuses": [
                    { "name": "app", "ready": true, "restartCount": 2, "image": "", "imageID": "" },
                    { "name": "proxy", "ready": false, "restartCount": 1, "image": "", "imageID": "" }
                ]
            }
        }))
        .unwrap();

        let info = pod_to_info(pod);

        assert_eq!(info.status, PodStatus::Running);
        assert_eq!(info.ready_status(), "1/2");
        assert_eq!(info.restarts(), 3);
        assert_eq!(info.node_name.as_deref(), Some("node-a"));
        assert_eq!(info.image_versions(), vec!["1.30", "1.36", "2.1"]);
    }

    #[test]
    fn test_service_to_info() {
        let svc: Service = serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": { "name": "web", "namespace": "shop" },
            "spec": {
                "type": "LoadBalancer",
                "clusterIP": "10.96.0.10",
                "ports": [
                    { "port": 80, "protocol": "TCP", "nodePort": 30080 },
                    { "port": 53, "protocol": "UDP" }
                ]
            },
            "status": { "loadBalancer": { "ingress": [{ "hostname": "lb.example.com" }] } }
        }))
        .unwrap();

        let info = service_to_info(svc);

        assert_eq!(info.service_type, "LoadBalancer");
        assert_eq!(info.cluster_ip.as_deref(), Some("10.96.0.10"));
        assert_eq!(info.external_ip.as_deref(), Some("lb.example.com"));
        assert_eq!(info.ports_display(), "80:30080/TCP,53/UDP");
    }

    #[test]
    fn test_service_without_ingress() {
        let svc: Service = serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": { "name": "db", "namespace": "shop" },
            "spec": { "clusterIP": "None" }
        }))
        .unwrap();

        let info = service_to_info(svc);
        assert_eq!(info.service_type, "ClusterIP");
        assert!(info.external_ip.is_none());
        assert_eq!(info.ports_display(), "");
    }
}
