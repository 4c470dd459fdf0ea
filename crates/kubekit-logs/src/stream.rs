use futures::{AsyncBufRead, AsyncBufReadExt};
use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use kube::api::LogParams;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use kubekit_k8s::{ClusterApi, Error, Result, container_names, select_container};

/// Log request options as given on the command line
#[derive(Clone, Debug, Default)]
pub struct LogOptions {
    pub container: Option<String>,
    pub follow: bool,
    /// Lines from the end of the log; 0 means everything
    pub tail: i64,
    /// Only lines newer than this many seconds; 0 means no limit
    pub since_seconds: i64,
    pub timestamps: bool,
}

impl LogOptions {
    /// Request parameters for `container`. Tail and since are only sent
    /// when positive.
    pub fn to_params(&self, container: &str) -> LogParams {
        LogParams {
            container: Some(container.to_string()),
            follow: self.follow,
            timestamps: self.timestamps,
            tail_lines: (self.tail > 0).then_some(self.tail),
            since_seconds: (self.since_seconds > 0).then_some(self.since_seconds),
            ..Default::default()
        }
    }
}

/// Formats one output line, prefixed with the container name when the pod
/// has more than one container. The bytes are passed through undecoded.
pub fn format_line(line: &[u8], container: Option<&str>) -> Vec<u8> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);

    let mut formatted = match container {
        Some(name) => format!("[{}] ", name).into_bytes(),
        None => Vec::with_capacity(line.len() + 1),
    };
    formatted.extend_from_slice(line);
    formatted.push(b'\n');
    formatted
}

/// Streams the logs of one container of `pod` to `out`.
///
/// Returns the number of lines written. Stops at end of stream, or when
/// `cancel` fires in follow mode.
pub async fn stream_pod_logs<W>(
    client: kube::Client,
    namespace: &str,
    pod: &str,
    options: &LogOptions,
    out: &mut W,
    cancel: CancellationToken,
) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let found = client
        .get_pod(namespace, pod)
        .await
        .map_err(|e| Error::PodNotFound {
            pod: pod.to_string(),
            source: Box::new(e),
        })?;

    let container = select_container(&found, options.container.as_deref())?;
    let prefix = (container_names(&found).len() > 1).then_some(container.as_str());

    let pods: Api<Pod> = Api::namespaced(client, namespace);
    let params = options.to_params(&container);
    debug!("LOGS {}/{} container {} {:?}", namespace, pod, container, params);

    let stream = pods
        .log_stream(pod, &params)
        .await
        .map_err(|e| Error::Stream(format!("failed to get logs stream: {}", e)))?;

    write_lines(stream, prefix, out, cancel).await
}

/// Copies lines from `reader` to `out` until end of input or cancellation
pub async fn write_lines<R, W>(
    mut reader: R,
    prefix: Option<&str>,
    out: &mut W,
    cancel: CancellationToken,
) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();
    let mut written = 0;

    loop {
        line.clear();
        tokio::select! {
            () = cancel.cancelled() => break,
            result = reader.read_until(b'\n', &mut line) => match result {
                Ok(0) => break,
                Ok(_) => {
                    out.write_all(&format_line(&line, prefix)).await?;
                    written += 1;
                }
                Err(e) => return Err(Error::Stream(format!("error reading logs: {}", e))),
            },
        }
    }

    out.flush().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use futures::io::Cursor;

    #[test]
    fn test_params_skip_unset_limits() {
        let params = LogOptions::default().to_params("app");

        assert_eq!(params.container.as_deref(), Some("app"));
        assert!(params.tail_lines.is_none());
        assert!(params.since_seconds.is_none());
        assert!(!params.follow);
    }

    #[test]
    fn test_params_pass_positive_limits() {
        let options = LogOptions {
            follow: true,
            tail: 50,
            since_seconds: 300,
            timestamps: true,
            ..Default::default()
        };
        let params = options.to_params("app");

        assert_eq!(params.tail_lines, Some(50));
        assert_eq!(params.since_seconds, Some(300));
        assert!(params.follow);
        assert!(params.timestamps);

        let negative = LogOptions {
            tail: -1,
            ..Default::default()
        };
        assert!(negative.to_params("app").tail_lines.is_none());
    }

    #[test]
    fn test_format_line() {
        assert_eq!(format_line(b"hello\n", None), b"hello\n");
        assert_eq!(format_line(b"hello\r\n", None), b"hello\n");
        assert_eq!(format_line(b"hello", Some("sidecar")), b"[sidecar] hello\n");
    }

    #[tokio::test]
    async fn test_invalid_utf8_lines_pass_through() {
        let input = Cursor::new(b"good line\nlatin1 caf\xe9\nafter\n".to_vec());
        let mut out = Vec::new();

        let count = write_lines(input, Some("app"), &mut out, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(
            out,
            b"[app] good line\n[app] latin1 caf\xe9\n[app] after\n".to_vec()
        );
    }

    #[tokio::test]
    async fn test_write_lines_with_prefix() {
        let input = Cursor::new(b"first\nsecond\n".to_vec());
        let mut out = Vec::new();

        let count = write_lines(input, Some("app"), &mut out, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "[app] first\n[app] second\n");
    }

    #[tokio::test]
    async fn test_write_lines_keeps_last_unterminated_line() {
        let input = Cursor::new(b"one\ntwo".to_vec());
        let mut out = Vec::new();

        let count = write_lines(input, None, &mut out, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "one\ntwo\n");
    }

    #[tokio::test]
    async fn test_cancelled_stream_writes_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let (_tx, rx) = futures::channel::mpsc::unbounded::<std::io::Result<Vec<u8>>>();
        let pending = rx.into_async_read();
        let mut out = Vec::new();

        let count = write_lines(pending, None, &mut out, cancel).await.unwrap();
        assert_eq!(count, 0);
        assert!(out.is_empty());
    }
}
