use anyhow::{Context, Result};
use clap::Args;

use kubekit_k8s::{PodInfo, list_pods};
use kubekit_table::{Table, color_status};
use kubekit_types::{age_since, truncate};

use super::Globals;

const MAX_IMAGE_VERSIONS_WIDTH: usize = 60;

#[derive(Args, Debug)]
pub struct PodsArgs {
    /// Show pods from all namespaces
    #[arg(short = 'A', long)]
    pub all_namespaces: bool,
}

pub async fn run(globals: &Globals, args: PodsArgs) -> Result<()> {
    let (session, namespace) = globals.connect().await?;
    let scope = (!args.all_namespaces).then_some(namespace.as_str());

    let pods = list_pods(&session.client, scope)
        .await
        .context("Failed to list pods")?;

    pods_table(&pods, args.all_namespaces).print();
    Ok(())
}

fn pods_table(pods: &[PodInfo], all_namespaces: bool) -> Table {
    let mut headers = vec![
        "NAME",
        "READY",
        "STATUS",
        "IP",
        "NODE",
        "IMAGE-VERSIONS",
        "RESTARTS",
        "AGE",
    ];
    if all_namespaces {
        headers.insert(0, "NAMESPACE");
    }

    let mut table = Table::new(headers);
    for pod in pods {
        let mut row = vec![
            pod.name.clone(),
            pod.ready_status(),
            color_status(&pod.status),
            pod.pod_ip.clone().unwrap_or_default(),
            pod.node_name.clone().unwrap_or_default(),
            truncate(&pod.image_versions().join(","), MAX_IMAGE_VERSIONS_WIDTH),
            pod.restarts().to_string(),
            age_since(pod.created_at),
        ];
        if all_namespaces {
            row.insert(0, pod.namespace.clone());
        }
        table.add_row(row);
    }
    table
}
