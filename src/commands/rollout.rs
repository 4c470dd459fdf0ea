use anyhow::{Context, Result};
use clap::{ArgAction, Args};

use kubekit_k8s::{DeploymentRef, RolloutController};

use super::Globals;

#[derive(Args, Debug)]
pub struct RolloutArgs {
    /// Deployment to restart or inspect
    pub deployment: String,

    /// Restart the deployment before waiting; `--restart=false` prints the
    /// current status once
    #[arg(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub restart: bool,

    /// Seconds to wait for the rollout
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Seconds between status checks
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
}

pub async fn run(globals: &Globals, args: RolloutArgs) -> Result<()> {
    let (session, namespace) = globals.connect().await?;
    let controller = RolloutController::new(&session.client);
    let target = DeploymentRef::new(namespace, args.deployment);

    if !args.restart {
        let observation = controller
            .status(&target)
            .await
            .with_context(|| format!("Failed to get deployment {}", target.name))?;
        println!("{}", observation);
        if observation.is_converged() {
            println!("Rollout is complete");
        }
        return Ok(());
    }

    let restarted_at = controller
        .trigger_restart(&target)
        .await
        .with_context(|| format!("Failed to restart deployment {}", target.name))?;
    tracing::debug!("restartedAt {}", restarted_at);
    println!("Deployment restarted. Waiting for rollout...");

    let policy = globals.settings.poll_policy(args.interval, args.timeout);
    controller
        .wait_for_convergence(&target, &policy, |observation| println!("{}", observation))
        .await?;

    println!("Rollout is complete");
    Ok(())
}
