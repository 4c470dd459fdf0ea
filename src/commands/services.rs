use anyhow::{Context, Result};
use clap::Args;

use kubekit_k8s::{ServiceInfo, list_services};
use kubekit_table::Table;
use kubekit_types::age_since;

use super::Globals;

#[derive(Args, Debug)]
pub struct ServicesArgs {
    /// Show services from all namespaces
    #[arg(short = 'A', long)]
    pub all_namespaces: bool,
}

pub async fn run(globals: &Globals, args: ServicesArgs) -> Result<()> {
    let (session, namespace) = globals.connect().await?;
    let scope = (!args.all_namespaces).then_some(namespace.as_str());

    let services = list_services(&session.client, scope)
        .await
        .context("Failed to list services")?;

    services_table(&services, args.all_namespaces).print();
    Ok(())
}

fn services_table(services: &[ServiceInfo], all_namespaces: bool) -> Table {
    let mut headers = vec!["NAME", "TYPE", "CLUSTER-IP", "EXTERNAL-IP", "PORT(S)", "AGE"];
    if all_namespaces {
        headers.insert(0, "NAMESPACE");
    }

    let mut table = Table::new(headers);
    for svc in services {
        let mut row = vec![
            svc.name.clone(),
            svc.service_type.clone(),
            svc.cluster_ip.clone().unwrap_or_default(),
            svc.external_ip
                .clone()
                .unwrap_or_else(|| "<none>".to_string()),
            svc.ports_display(),
            age_since(svc.created_at),
        ];
        if all_namespaces {
            row.insert(0, svc.namespace.clone());
        }
        table.add_row(row);
    }
    table
}
