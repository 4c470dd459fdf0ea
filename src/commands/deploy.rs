use anyhow::{Context, Result, bail};
use clap::Args;

use kubekit_k8s::{DeploymentInfo, DeploymentRef, RolloutController};
use kubekit_table::Table;
use kubekit_types::age_since;

use super::Globals;

#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Deployment to update; lists deployments when omitted
    pub deployment: Option<String>,

    /// Container image to set (e.g. repo/app:tag)
    #[arg(long)]
    pub image: Option<String>,

    /// Seconds to wait for the rollout
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Seconds between status checks
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
}

pub async fn run(globals: &Globals, args: DeployArgs) -> Result<()> {
    let (session, namespace) = globals.connect().await?;
    let controller = RolloutController::new(&session.client);

    let Some(name) = args.deployment else {
        let deployments = controller
            .list(&namespace)
            .await
            .context("Failed to list deployments")?;
        deployments_table(&deployments).print();
        return Ok(());
    };

    let Some(image) = args.image else {
        bail!("--image is required when specifying a deployment");
    };

    let target = DeploymentRef::new(namespace, name);
    controller
        .update_image(&target, &image)
        .await
        .with_context(|| format!("Failed to update deployment {}", target.name))?;
    println!(
        "Updated deployment {} image to {}. Waiting for rollout...",
        target.name,
        image.trim()
    );

    let policy = globals.settings.poll_policy(args.interval, args.timeout);
    controller
        .wait_for_convergence(&target, &policy, |observation| println!("{}", observation))
        .await?;

    println!("Rollout completed");
    Ok(())
}

fn deployments_table(deployments: &[DeploymentInfo]) -> Table {
    let mut table = Table::new(["NAME", "READY", "UP-TO-DATE", "AVAILABLE", "AGE"]);
    for deploy in deployments {
        table.add_row([
            deploy.name.clone(),
            deploy.replica_status(),
            deploy.updated_replicas.to_string(),
            deploy.available_replicas.to_string(),
            age_since(deploy.created_at),
        ]);
    }
    table
}
