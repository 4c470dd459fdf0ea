//! Local TCP listener tunnelled to a pod port.

use std::net::{Ipv4Addr, SocketAddr};

use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use kubekit_types::PortSpec;

use crate::error::{Error, Result};

/// Forwards connections on `127.0.0.1:<local>` to `<remote>` on one pod
pub struct PortForwarder {
    pods: Api<Pod>,
    pod: String,
    ports: PortSpec,
}

impl PortForwarder {
    pub fn new(
        client: kube::Client,
        namespace: &str,
        pod: impl Into<String>,
        ports: PortSpec,
    ) -> Self {
        Self {
            pods: Api::namespaced(client, namespace),
            pod: pod.into(),
            ports,
        }
    }

    /// Address the listener binds to
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, self.ports.local))
    }

    /// Binds the listener, reports the bound address on `ready`, then
    /// accepts connections until `cancel` fires.
    ///
    /// A bind failure is returned before `ready` is sent. Failures on a
    /// single connection are logged and the listener keeps running.
    pub async fn run(
        &self,
        ready: oneshot::Sender<SocketAddr>,
        cancel: CancellationToken,
    ) -> Result<()> {
        let address = self.bind_address();
        let listener = TcpListener::bind(address).await?;
        let bound = listener.local_addr()?;
        debug!("listening on {} for pod {}", bound, self.pod);

        // the receiver may already be gone if the caller stopped waiting
        let _ = ready.send(bound);

        let mut connections = JoinSet::new();
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                result = listener.accept() => match result {
                    Ok((stream, peer)) => {
                        debug!("accepted connection from {}", peer);
                        connections.spawn(accept_connection(
                            self.pods.clone(),
                            self.pod.clone(),
                            self.ports.remote,
                            stream,
                            cancel.clone(),
                        ));
                    }
                    Err(e) => warn!("error accepting port forward connection: {}", e),
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        while connections.join_next().await.is_some() {}
        Ok(())
    }
}

async fn accept_connection(
    pods: Api<Pod>,
    pod: String,
    port: u16,
    stream: TcpStream,
    cancel: CancellationToken,
) {
    if let Err(e) = forward_connection(&pods, &pod, port, stream, cancel).await {
        warn!("failed to forward connection to {}:{}: {}", pod, port, e);
    }
}

async fn forward_connection(
    pods: &Api<Pod>,
    pod: &str,
    port: u16,
    mut client_conn: TcpStream,
    cancel: CancellationToken,
) -> Result<()> {
    let mut forwarder = pods.portforward(pod, &[port]).await?;
    let mut upstream = forwarder
        .take_stream(port)
        .ok_or_else(|| Error::Stream(format!("port {} not available on pod {}", port, pod)))?;

    tokio::select! {
        () = cancel.cancelled() => {}
        result = tokio::io::copy_bidirectional(&mut client_conn, &mut upstream) => {
            let (sent, received) = result?;
            debug!("connection closed after {} bytes out, {} bytes in", sent, received);
        }
    }

    drop(upstream);
    forwarder
        .join()
        .await
        .map_err(|e| Error::Stream(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn offline_client() -> kube::Client {
        let config = kube::Config::new("http://127.0.0.1:9".parse().unwrap());
        kube::Client::try_from(config).unwrap()
    }

    fn forwarder(local: u16) -> PortForwarder {
        let ports = PortSpec {
            local,
            remote: 8080,
        };
        PortForwarder::new(offline_client(), "ns", "web-1", ports)
    }

    #[tokio::test]
    async fn test_bind_failure_skips_ready() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();

        let (ready_tx, ready_rx) = oneshot::channel();
        let result = forwarder(port).run(ready_tx, CancellationToken::new()).await;

        assert!(matches!(result, Err(Error::Io(_))));
        assert!(ready_rx.await.is_err());
    }

    #[tokio::test]
    async fn test_ready_then_cancel() {
        let port = {
            let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            probe.local_addr().unwrap().port()
        };

        let cancel = CancellationToken::new();
        let (ready_tx, ready_rx) = oneshot::channel();
        let pf = forwarder(port);

        let stop = cancel.clone();
        let run = tokio::spawn(async move { pf.run(ready_tx, stop).await });

        let bound = ready_rx.await.unwrap();
        assert_eq!(bound, SocketAddr::from((Ipv4Addr::LOCALHOST, port)));

        cancel.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
