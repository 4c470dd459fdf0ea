use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

use commands::Globals;
use commands::context::SwitchContextArgs;
use commands::deploy::DeployArgs;
use commands::exec::ExecArgs;
use commands::logs::LogsArgs;
use commands::namespace::SwitchNamespaceArgs;
use commands::pods::PodsArgs;
use commands::port_forward::PortForwardArgs;
use commands::rollout::RolloutArgs;
use commands::services::ServicesArgs;
use config::Settings;

/// kubekit - small helper tools for working with Kubernetes clusters
#[derive(Parser, Debug)]
#[command(name = "kubekit")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Kubernetes context to use
    #[arg(short = 'c', long, global = true)]
    context: Option<String>,

    /// Kubernetes namespace to use
    #[arg(short = 'n', long, global = true)]
    namespace: Option<String>,

    /// Settings file (default is <config dir>/kubekit/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log API calls and rollout progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List pods
    Pods(PodsArgs),
    /// List services
    Services(ServicesArgs),
    /// List contexts or switch the current context
    SwitchContext(SwitchContextArgs),
    /// Show or switch the namespace of the current context
    SwitchNamespace(SwitchNamespaceArgs),
    /// Show pod logs
    Logs(LogsArgs),
    /// Forward a local port to a pod or service
    PortForward(PortForwardArgs),
    /// Execute a command in a pod
    Exec(ExecArgs),
    /// List deployments, or update a deployment image and wait for rollout
    Deploy(DeployArgs),
    /// Restart a deployment and wait, or show its rollout status
    Rollout(RolloutArgs),
    /// List the available tools
    Tools,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let settings = Settings::load(args.config.as_deref())?;
    let globals = Globals {
        context: args.context,
        namespace: args.namespace,
        settings,
    };

    match args.command.unwrap_or(Command::Tools) {
        Command::Pods(cmd) => commands::pods::run(&globals, cmd).await,
        Command::Services(cmd) => commands::services::run(&globals, cmd).await,
        Command::SwitchContext(cmd) => commands::context::run(cmd),
        Command::SwitchNamespace(cmd) => commands::namespace::run(cmd),
        Command::Logs(cmd) => commands::logs::run(&globals, cmd).await,
        Command::PortForward(cmd) => commands::port_forward::run(&globals, cmd).await,
        Command::Exec(cmd) => commands::exec::run(&globals, cmd).await,
        Command::Deploy(cmd) => commands::deploy::run(&globals, cmd).await,
        Command::Rollout(cmd) => commands::rollout::run(&globals, cmd).await,
        Command::Tools => {
            commands::tools::run();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_rollout_restart_flag() {
        let args = Args::parse_from(["kubekit", "rollout", "web"]);
        assert!(matches!(args.command, Some(Command::Rollout(ref r)) if r.restart));

        let args = Args::parse_from(["kubekit", "rollout", "web", "--restart=false"]);
        assert!(matches!(args.command, Some(Command::Rollout(ref r)) if !r.restart));

        let args = Args::parse_from(["kubekit", "-n", "shop", "rollout", "--restart", "web"]);
        assert_eq!(args.namespace.as_deref(), Some("shop"));
        assert!(matches!(
            args.command,
            Some(Command::Rollout(ref r)) if r.restart && r.deployment == "web"
        ));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        assert!(Args::try_parse_from(["kubekit", "rollout", "web", "--interval", "0"]).is_err());
        assert!(
            Args::try_parse_from(["kubekit", "deploy", "web", "--image", "a:1", "--interval=0"])
                .is_err()
        );

        let args = Args::parse_from(["kubekit", "rollout", "web", "--interval", "2"]);
        assert!(matches!(args.command, Some(Command::Rollout(ref r)) if r.interval == Some(2)));
    }

    #[test]
    fn test_exec_command_after_dashes() {
        let args = Args::parse_from(["kubekit", "exec", "-t=false", "web-1", "--", "ls", "-la"]);
        let Some(Command::Exec(exec)) = args.command else {
            panic!("expected exec");
        };
        assert_eq!(exec.pod, "web-1");
        assert_eq!(exec.command, vec!["ls", "-la"]);
        assert!(!exec.tty);
        assert!(exec.stdin);
    }

    #[test]
    fn test_logs_flags() {
        let args = Args::parse_from([
            "kubekit", "logs", "web-1", "-f", "-t", "20", "--since", "60",
        ]);
        let Some(Command::Logs(logs)) = args.command else {
            panic!("expected logs");
        };
        assert!(logs.follow);
        assert_eq!(logs.tail, Some(20));
        assert_eq!(logs.since, 60);
    }

    #[test]
    fn test_no_subcommand_lists_tools() {
        let args = Args::parse_from(["kubekit"]);
        assert!(args.command.is_none());
    }
}
