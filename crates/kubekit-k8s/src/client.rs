//! Client construction from kubeconfig or in-cluster service account

use std::path::Path;

use kube::config::{KubeConfigOptions, Kubeconfig};
use tracing::debug;

use kubekit_types::DEFAULT_NAMESPACE;

use crate::error::{Error, Result};

const SERVICE_ACCOUNT_TOKEN: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// A connected client plus the namespace and context it resolved to
pub struct Session {
    pub client: kube::Client,
    pub namespace: String,
    pub context: Option<String>,
}

/// Builds clients for kubeconfig contexts
pub struct KubeClient {
    kubeconfig: Option<Kubeconfig>,
}

impl KubeClient {
    /// Reads the kubeconfig if one is present. A missing kubeconfig is only
    /// an error later, when no in-cluster credentials are available either.
    pub fn new() -> Self {
        let kubeconfig = match Kubeconfig::read() {
            Ok(kc) => Some(kc),
            Err(e) => {
                debug!("no kubeconfig loaded: {}", e);
                None
            }
        };
        Self { kubeconfig }
    }

    /// Connect using `context`, or the current context when `None`.
    ///
    /// In-cluster credentials are used only when no context is requested
    /// and the service account token is mounted.
    pub async fn connect(&self, context: Option<&str>) -> Result<Session> {
        if context.is_none() && in_cluster() {
            debug!("using in-cluster configuration");
            let config = kube::Config::incluster()
                .map_err(|e| Error::Kubeconfig(format!("in-cluster config failed: {}", e)))?;
            let namespace = config.default_namespace.clone();
            let client = kube::Client::try_from(config)?;
            return Ok(Session {
                client,
                namespace,
                context: None,
            });
        }

        let kubeconfig = self.kubeconfig.clone().ok_or_else(|| {
            Error::Kubeconfig("failed to read kubeconfig. Is kubectl configured?".to_string())
        })?;

        let context = context
            .map(str::to_string)
            .or_else(|| kubeconfig.current_context.clone());
        debug!("connecting with context {:?}", context);

        let config = kube::Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context: context.clone(),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| {
            Error::Kubeconfig(format!(
                "failed to create config for context {}: {}",
                context.as_deref().unwrap_or("<current>"),
                e
            ))
        })?;

        let namespace = if config.default_namespace.is_empty() {
            DEFAULT_NAMESPACE.to_string()
        } else {
            config.default_namespace.clone()
        };
        let client = kube::Client::try_from(config)?;

        Ok(Session {
            client,
            namespace,
            context,
        })
    }
}

impl Default for KubeClient {
    fn default() -> Self {
        Self::new()
    }
}

fn in_cluster() -> bool {
    Path::new(SERVICE_ACCOUNT_TOKEN).exists()
}
