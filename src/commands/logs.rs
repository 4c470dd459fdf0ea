use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;

use kubekit_k8s::cancel_on_signal;
use kubekit_logs::{LogOptions, stream_pod_logs};

use super::Globals;

#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Pod to read logs from
    pub pod: String,

    /// Container name (required if the pod has multiple containers)
    #[arg(long)]
    pub container: Option<String>,

    /// Follow log output
    #[arg(short, long)]
    pub follow: bool,

    /// Number of lines to show from the end of the logs
    #[arg(short, long)]
    pub tail: Option<i64>,

    /// Show logs from this many seconds ago
    #[arg(long, default_value_t = 0)]
    pub since: i64,

    /// Include timestamps in output
    #[arg(long)]
    pub timestamps: bool,
}

impl LogsArgs {
    fn options(&self, default_tail: i64) -> LogOptions {
        LogOptions {
            container: self.container.clone(),
            follow: self.follow,
            tail: self.tail.unwrap_or(default_tail),
            since_seconds: self.since,
            timestamps: self.timestamps,
        }
    }
}

pub async fn run(globals: &Globals, args: LogsArgs) -> Result<()> {
    let (session, namespace) = globals.connect().await?;
    let options = args.options(globals.settings.tail(None));

    let cancel = CancellationToken::new();
    let watcher = cancel_on_signal(cancel.clone());

    let mut stdout = tokio::io::stdout();
    let result = stream_pod_logs(
        session.client,
        &namespace,
        &args.pod,
        &options,
        &mut stdout,
        cancel.clone(),
    )
    .await;

    cancel.cancel();
    let _ = watcher.await;

    let lines = result.with_context(|| format!("Failed to read logs of pod {}", args.pod))?;
    tracing::debug!("wrote {} log lines", lines);
    Ok(())
}
