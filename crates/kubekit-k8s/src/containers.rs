use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;

use crate::error::{Error, Result};

/// Names of the containers declared in the pod spec, in order
pub fn container_names(pod: &Pod) -> Vec<String> {
    pod.spec
        .as_ref()
        .map(|spec| spec.containers.iter().map(|c| c.name.clone()).collect())
        .unwrap_or_default()
}

/// Picks the container to attach to.
///
/// An explicit name must exist in the pod. Without one, a single-container
/// pod uses its only container and a multi-container pod is an error that
/// lists the choices.
pub fn select_container(pod: &Pod, requested: Option<&str>) -> Result<String> {
    let names = container_names(pod);

    if let Some(requested) = requested {
        if names.iter().any(|n| n == requested) {
            return Ok(requested.to_string());
        }
        return Err(Error::InvalidArgument(format!(
            "container '{}' not found in pod '{}' (available: {})",
            requested,
            pod.name_any(),
            names.join(", ")
        )));
    }

    match names.as_slice() {
        [only] => Ok(only.clone()),
        [] => Err(Error::InvalidArgument(format!(
            "pod '{}' has no containers",
            pod.name_any()
        ))),
        _ => Err(Error::AmbiguousContainer {
            pod: pod.name_any(),
            containers: names,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::pod;

    #[test]
    fn test_single_container_is_default() {
        let pod = pod("ns", "web-1", &["app"]);
        assert_eq!(select_container(&pod, None).unwrap(), "app");
    }

    #[test]
    fn test_multiple_containers_need_a_choice() {
        let pod = pod("ns", "web-1", &["app", "sidecar"]);

        let err = select_container(&pod, None).unwrap_err();
        assert!(matches!(
            err,
            Error::AmbiguousContainer { ref containers, .. } if containers == &["app", "sidecar"]
        ));

        assert_eq!(select_container(&pod, Some("sidecar")).unwrap(), "sidecar");
    }

    #[test]
    fn test_unknown_container_is_rejected() {
        let pod = pod("ns", "web-1", &["app"]);
        let err = select_container(&pod, Some("db")).unwrap_err();
        assert!(err.to_string().contains("available: app"));
    }
}
