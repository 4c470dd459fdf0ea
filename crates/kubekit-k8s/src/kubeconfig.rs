//! Read-modify-write access to the kubeconfig file for context and
//! namespace switching.

use std::fs;
use std::path::{Path, PathBuf};

use kube::config::Kubeconfig;
use tracing::debug;

use kubekit_types::{ContextInfo, DEFAULT_NAMESPACE};

use crate::error::{Error, Result};

/// A kubeconfig loaded from, and saved back to, one file
pub struct KubeconfigFile {
    path: PathBuf,
    config: Kubeconfig,
}

impl KubeconfigFile {
    /// First entry of `$KUBECONFIG`, or `~/.kube/config`
    pub fn default_path() -> Result<PathBuf> {
        if let Some(paths) = std::env::var_os("KUBECONFIG") {
            if let Some(first) = std::env::split_paths(&paths).find(|p| !p.as_os_str().is_empty())
            {
                return Ok(first);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".kube").join("config"))
            .ok_or_else(|| Error::Kubeconfig("cannot determine home directory".to_string()))
    }

    /// Load the kubeconfig from its default location
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path()?)
    }

    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("reading kubeconfig {}", path.display());
        let config = Kubeconfig::read_from(&path).map_err(|e| {
            Error::Kubeconfig(format!("failed to load {}: {}", path.display(), e))
        })?;
        Ok(Self { path, config })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current_context(&self) -> Option<&str> {
        self.config.current_context.as_deref()
    }

    /// All contexts, sorted by name
    pub fn contexts(&self) -> Vec<ContextInfo> {
        let mut contexts: Vec<ContextInfo> = self
            .config
            .contexts
            .iter()
            .map(|ctx| {
                let context = ctx.context.as_ref();
                ContextInfo::new(
                    ctx.name.clone(),
                    context.map(|c| c.cluster.clone()).unwrap_or_default(),
                    context.and_then(|c| c.user.clone()).unwrap_or_default(),
                    context.and_then(|c| c.namespace.clone()),
                    Some(ctx.name.as_str()) == self.current_context(),
                )
            })
            .collect();
        contexts.sort_by(|a, b| a.name.cmp(&b.name));
        contexts
    }

    /// Namespace configured for `context` (or the current context),
    /// `default` when none is set or the context is unknown
    pub fn namespace_for(&self, context: Option<&str>) -> String {
        context
            .or(self.current_context())
            .and_then(|name| self.config.contexts.iter().find(|c| c.name == name))
            .and_then(|c| c.context.as_ref())
            .and_then(|c| c.namespace.clone())
            .filter(|ns| !ns.is_empty())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
    }

    /// Makes `name` the current context
    pub fn switch_context(&mut self, name: &str) -> Result<()> {
        if !self.config.contexts.iter().any(|c| c.name == name) {
            return Err(Error::ContextNotFound(name.to_string()));
        }

        self.config.current_context = Some(name.to_string());
        Ok(())
    }

    /// Sets the namespace of the current context, returning that context's name
    pub fn set_namespace(&mut self, namespace: &str) -> Result<String> {
        let current = self
            .current_context()
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidArgument("no current context set".to_string()))?;

        let named = self
            .config
            .contexts
            .iter_mut()
            .find(|c| c.name == current)
            .ok_or_else(|| Error::ContextNotFound(current.clone()))?;

        named.context.get_or_insert_with(Default::default).namespace = Some(namespace.to_string());
        Ok(current)
    }

    /// Write the kubeconfig back to the file it was loaded from
    pub fn save(&self) -> Result<()> {
        let yaml = serde_yaml::to_string(&self.config)
            .map_err(|e| Error::Kubeconfig(format!("failed to serialize kubeconfig: {}", e)))?;
        fs::write(&self.path, yaml)?;
        debug!("wrote kubeconfig {}", self.path.display());
        Ok(())
    }
}
