//! One module per kubekit tool

pub mod context;
pub mod deploy;
pub mod exec;
pub mod logs;
pub mod namespace;
pub mod pods;
pub mod port_forward;
pub mod rollout;
pub mod services;
pub mod tools;

use anyhow::{Context, Result};
use kubekit_k8s::{KubeClient, Session};

use crate::config::Settings;

/// Options shared by every tool, resolved once per invocation
pub struct Globals {
    pub context: Option<String>,
    pub namespace: Option<String>,
    pub settings: Settings,
}

impl Globals {
    /// Connects to the selected context and resolves the target namespace:
    /// `--namespace`, then the settings file, then the context's namespace.
    pub async fn connect(&self) -> Result<(Session, String)> {
        let context = self.settings.context(self.context.clone());
        let session = KubeClient::new()
            .connect(context.as_deref())
            .await
            .context("Failed to create kubernetes client")?;

        let namespace = self
            .settings
            .namespace(self.namespace.clone(), &session.namespace);
        tracing::debug!(
            "context {:?}, namespace {}",
            session.context.as_deref().unwrap_or("<in-cluster>"),
            namespace
        );

        Ok((session, namespace))
    }
}
