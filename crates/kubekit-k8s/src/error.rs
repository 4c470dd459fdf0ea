/// Possible errors from kubekit cluster operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Requested object does not exist.
    #[error("{kind} '{name}' not found in namespace '{namespace}'")]
    NotFound {
        kind: &'static str,
        namespace: String,
        name: String,
    },

    /// Object was modified concurrently between read and write.
    #[error("{kind} '{name}' in namespace '{namespace}' was modified concurrently, try again")]
    Conflict {
        kind: &'static str,
        namespace: String,
        name: String,
    },

    /// Malformed user input.
    #[error("{0}")]
    InvalidArgument(String),

    /// Malformed port-forward target.
    #[error("invalid target '{0}', expected <pod-name> or svc/<service-name>")]
    InvalidTarget(String),

    /// Endpoints of a service could not be fetched.
    #[error("failed to get endpoints for service {service}")]
    LookupFailed {
        service: String,
        #[source]
        source: Box<Error>,
    },

    /// Service has no address backed by a pod.
    #[error("no backing pod found for service {0}")]
    NoBackingPod(String),

    /// Pod given as a target could not be fetched.
    #[error("failed to get pod {pod}")]
    PodNotFound {
        pod: String,
        #[source]
        source: Box<Error>,
    },

    /// Pod has several containers and none was chosen.
    #[error(
        "pod '{pod}' has multiple containers ({}), specify one with --container",
        containers.join(", ")
    )]
    AmbiguousContainer { pod: String, containers: Vec<String> },

    /// Rollout did not converge within the polling budget.
    #[error("timeout waiting for rollout of deployment {name} in namespace {namespace}")]
    Timeout { namespace: String, name: String },

    /// Exec, log or port-forward transport failure.
    #[error("stream error: {0}")]
    Stream(String),

    /// Context name is not present in the kubeconfig.
    #[error("context '{0}' not found in kubeconfig")]
    ContextNotFound(String),

    /// Kubeconfig could not be read, resolved or written.
    #[error("kubeconfig error: {0}")]
    Kubeconfig(String),

    /// Any other Kubernetes client error.
    #[error(transparent)]
    Kube(#[from] kube::Error),

    /// Local I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Maps a client error for a named object onto the taxonomy, keeping
    /// 404 and 409 responses distinguishable from other failures.
    pub fn from_api(error: kube::Error, kind: &'static str, namespace: &str, name: &str) -> Self {
        let code = match &error {
            kube::Error::Api(response) => Some(response.code),
            _ => None,
        };

        match code {
            Some(404) => Self::NotFound {
                kind,
                namespace: namespace.to_string(),
                name: name.to_string(),
            },
            Some(409) => Self::Conflict {
                kind,
                namespace: namespace.to_string(),
                name: name.to_string(),
            },
            _ => Self::Kube(error),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::ContextNotFound(_))
    }
}
