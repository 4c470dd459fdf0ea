use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args};

use kubekit_k8s::{ClusterApi, ExecOptions, exec, select_container};

use super::Globals;

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Pod to run the command in
    pub pod: String,

    /// Container name (required if the pod has multiple containers)
    #[arg(long)]
    pub container: Option<String>,

    /// Keep stdin open
    #[arg(
        short = 'i',
        long,
        action = ArgAction::Set,
        default_value_t = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub stdin: bool,

    /// Allocate a TTY
    #[arg(
        short = 't',
        long,
        action = ArgAction::Set,
        default_value_t = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub tty: bool,

    /// Command and arguments, after `--`
    #[arg(last = true)]
    pub command: Vec<String>,
}

pub async fn run(globals: &Globals, args: ExecArgs) -> Result<()> {
    if args.command.is_empty() {
        bail!("invalid syntax. Use: kubekit exec <pod> -- <command...>");
    }

    let (session, namespace) = globals.connect().await?;

    let pod = session
        .client
        .get_pod(&namespace, &args.pod)
        .await
        .with_context(|| format!("Failed to get pod {}", args.pod))?;
    let container = select_container(&pod, args.container.as_deref())?;

    let options = ExecOptions::new(container, args.command)
        .stdin(args.stdin)
        .tty(args.tty);

    exec(session.client, &namespace, &args.pod, &options)
        .await
        .context("Failed to execute command")
}
