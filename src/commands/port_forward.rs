use anyhow::{Context, Result, bail};
use clap::Args;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use kubekit_k8s::{PortForwarder, PortSpec, cancel_on_signal, target};

use super::Globals;

#[derive(Args, Debug)]
pub struct PortForwardArgs {
    /// Pod name, or svc/<service-name>
    pub target: String,

    /// <local-port>:<remote-port>, or a single port used for both
    pub ports: String,
}

pub async fn run(globals: &Globals, args: PortForwardArgs) -> Result<()> {
    let ports: PortSpec = args
        .ports
        .parse()
        .with_context(|| format!("invalid port specification '{}'", args.ports))?;

    let (session, namespace) = globals.connect().await?;
    let pod = target::resolve(&session.client, &namespace, &args.target).await?;

    let forwarder = PortForwarder::new(session.client, &namespace, pod.clone(), ports);
    let cancel = CancellationToken::new();
    let watcher = cancel_on_signal(cancel.clone());

    let (ready_tx, ready_rx) = oneshot::channel();
    let token = cancel.clone();
    let task = tokio::spawn(async move { forwarder.run(ready_tx, token).await });

    let Ok(bound) = ready_rx.await else {
        // the listener never came up; the task holds the reason
        cancel.cancel();
        task.await?
            .with_context(|| format!("Failed to listen on 127.0.0.1:{}", ports.local))?;
        bail!("port forward stopped before the listener was ready");
    };

    println!("Forwarding from {} -> {}:{}", bound, pod, ports.remote);
    println!("Press Ctrl+C to stop");

    cancel.cancelled().await;
    println!("\nStopping port forward...");

    task.await?.context("Port forward failed")?;
    let _ = watcher.await;
    Ok(())
}
