use anyhow::{Context, Result};
use clap::Args;

use kubekit_k8s::KubeconfigFile;

#[derive(Args, Debug)]
pub struct SwitchNamespaceArgs {
    /// Namespace to set on the current context; prints it when omitted
    pub name: Option<String>,
}

pub fn run(args: SwitchNamespaceArgs) -> Result<()> {
    let mut kubeconfig = KubeconfigFile::load().context("Failed to load kubeconfig")?;

    let Some(namespace) = args.name else {
        println!("Current namespace: {}", kubeconfig.namespace_for(None));
        return Ok(());
    };

    let context = kubeconfig.set_namespace(&namespace)?;
    kubeconfig.save().context("Failed to save kubeconfig")?;
    tracing::info!("namespace of {} set to {}", context, namespace);

    println!(
        "Switched to namespace '{}' in context '{}'",
        namespace, context
    );
    Ok(())
}
