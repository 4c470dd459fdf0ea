//! Runs a command inside a pod container with the local terminal attached.

use std::io::{self, Read};

use crossterm::terminal;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use kube::Api;
use kube::api::AttachParams;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Error, Result};

const INPUT_CHUNK: usize = 4096;

#[derive(Clone, Debug, Default)]
pub struct ExecOptions {
    pub container: String,
    pub command: Vec<String>,
    pub stdin: bool,
    pub tty: bool,
}

impl ExecOptions {
    pub fn new(container: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            container: container.into(),
            command,
            ..Default::default()
        }
    }

    pub fn stdin(mut self, enabled: bool) -> Self {
        self.stdin = enabled;
        self
    }

    pub fn tty(mut self, enabled: bool) -> Self {
        self.tty = enabled;
        self
    }

    /// With a TTY the API server merges stderr into stdout, so a separate
    /// stderr stream must not be requested.
    fn attach_params(&self) -> AttachParams {
        AttachParams::default()
            .container(self.container.clone())
            .stdin(self.stdin)
            .stdout(true)
            .stderr(!self.tty)
            .tty(self.tty)
    }
}

/// Puts the local terminal in raw mode until dropped
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Executes `options.command` in `pod` and bridges stdio until it exits
pub async fn exec(
    client: kube::Client,
    namespace: &str,
    pod: &str,
    options: &ExecOptions,
) -> Result<()> {
    if options.command.is_empty() {
        return Err(Error::InvalidArgument("no command specified".to_string()));
    }

    let pods: Api<Pod> = Api::namespaced(client, namespace);
    debug!(
        "EXEC {:?} in {}/{} container {}",
        options.command, namespace, pod, options.container
    );

    let mut attached = pods
        .exec(pod, options.command.clone(), &options.attach_params())
        .await?;

    let _raw = if options.tty {
        Some(RawModeGuard::enable()?)
    } else {
        None
    };

    let input = attached
        .stdin()
        .map(|remote| tokio::spawn(forward_input(spawn_reader(io::stdin()), remote)));

    let output = attached.stdout().map(|mut remote| {
        tokio::spawn(async move {
            let mut local = tokio::io::stdout();
            let copied = tokio::io::copy(&mut remote, &mut local).await;
            let _ = local.flush().await;
            copied
        })
    });

    let errors = attached.stderr().map(|mut remote| {
        tokio::spawn(async move {
            let mut local = tokio::io::stderr();
            tokio::io::copy(&mut remote, &mut local).await
        })
    });

    let status = match attached.take_status() {
        Some(status) => status.await,
        None => None,
    };

    for task in [output, errors].into_iter().flatten() {
        if let Ok(Err(e)) = task.await {
            debug!("stream copy ended with error: {}", e);
        }
    }
    if let Some(task) = input {
        task.abort();
    }

    attached
        .join()
        .await
        .map_err(|e| Error::Stream(e.to_string()))?;

    status.map_or(Ok(()), check_status)
}

/// Reads `source` on a detached thread and hands the chunks over a channel.
///
/// A blocking read on the terminal cannot be interrupted, so the thread is
/// not joined. It exits on its next read once the receiver is gone.
fn spawn_reader<R>(mut source: R) -> mpsc::Receiver<Vec<u8>>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let mut buf = [0u8; INPUT_CHUNK];
        loop {
            match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.blocking_send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("stdin read failed: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// Writes received chunks to the remote stdin, closing it at end of input
async fn forward_input<W>(mut input: mpsc::Receiver<Vec<u8>>, mut remote: W)
where
    W: AsyncWrite + Unpin,
{
    while let Some(chunk) = input.recv().await {
        if remote.write_all(&chunk).await.is_err() || remote.flush().await.is_err() {
            return;
        }
    }
    let _ = remote.shutdown().await;
}

/// Maps the remote process status to a result
fn check_status(status: Status) -> Result<()> {
    match status.status.as_deref() {
        Some("Failure") => Err(Error::Stream(
            status
                .message
                .unwrap_or_else(|| "command failed".to_string()),
        )),
        _ => Ok(()),
    }
}
