use anyhow::{Context, Result};
use clap::Args;

use kubekit_k8s::{ContextInfo, KubeconfigFile};
use kubekit_table::Table;

#[derive(Args, Debug)]
pub struct SwitchContextArgs {
    /// Context to make current; lists contexts when omitted
    pub name: Option<String>,
}

pub fn run(args: SwitchContextArgs) -> Result<()> {
    let mut kubeconfig = KubeconfigFile::load().context("Failed to load kubeconfig")?;

    let Some(name) = args.name else {
        contexts_table(&kubeconfig.contexts()).print();
        return Ok(());
    };

    kubeconfig.switch_context(&name)?;
    kubeconfig.save().context("Failed to save kubeconfig")?;
    tracing::info!("current-context set to {} in {}", name, kubeconfig.path().display());

    println!("Switched to context '{}'", name);
    Ok(())
}

fn contexts_table(contexts: &[ContextInfo]) -> Table {
    let mut table = Table::new(["CURRENT", "NAME", "CLUSTER", "USER", "NAMESPACE"]);
    for ctx in contexts {
        table.add_row([
            if ctx.is_current { "*" } else { "" }.to_string(),
            ctx.name.clone(),
            ctx.cluster.clone(),
            ctx.user.clone(),
            ctx.namespace_or_default().to_string(),
        ]);
    }
    table
}
