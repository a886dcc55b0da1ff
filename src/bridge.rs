use anyhow::{anyhow, bail};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use crate::export::{DownloadSink, ExportOutcome, Exporter};

/// Requests the UI can send to the core. Each one carries its reply channel.
pub enum BridgeRequest {
    GetMeshCount { reply: oneshot::Sender<usize> },
    DownloadAllMeshes { reply: oneshot::Sender<ExportOutcome> },
}

/// Notifications from the core that nobody has to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    DownloadComplete { filename: String },
    /// One per export run, for the user to read.
    Notice(String),
}

pub fn channel(timeout: Duration) -> (BridgeClient, mpsc::UnboundedReceiver<BridgeRequest>) {
    let (requests, receiver) = mpsc::unbounded_channel();
    (BridgeClient { requests, timeout }, receiver)
}

/// Announces every successful write to the UI.
struct NotifyingSink<'a> {
    inner: &'a mut dyn DownloadSink,
    events: &'a mpsc::UnboundedSender<BridgeEvent>,
}

impl DownloadSink for NotifyingSink<'_> {
    fn write(&mut self, bytes: &[u8], suggested_filename: &str) -> anyhow::Result<()> {
        self.inner.write(bytes, suggested_filename)?;

        // The UI may have closed already
        let _ = self.events.send(BridgeEvent::DownloadComplete {
            filename: suggested_filename.to_string(),
        });

        Ok(())
    }
}

/// Answers requests until every client is gone.
pub async fn serve(
    exporter: Exporter,
    mut sink: Box<dyn DownloadSink>,
    mut requests: mpsc::UnboundedReceiver<BridgeRequest>,
    events: mpsc::UnboundedSender<BridgeEvent>,
) {
    while let Some(request) = requests.recv().await {
        match request {
            BridgeRequest::GetMeshCount { reply } => {
                let _ = reply.send(exporter.count());
            }
            BridgeRequest::DownloadAllMeshes { reply } => {
                let mut notifying = NotifyingSink {
                    inner: sink.as_mut(),
                    events: &events,
                };
                let outcome = exporter.export_all(&mut notifying);
                let _ = events.send(BridgeEvent::Notice(outcome.notice()));
                let _ = reply.send(outcome);
            }
        }
    }

    log::debug!("All bridge clients gone, stopping");
}

#[derive(Clone)]
pub struct BridgeClient {
    requests: mpsc::UnboundedSender<BridgeRequest>,
    timeout: Duration,
}

impl BridgeClient {
    pub async fn mesh_count(&self) -> anyhow::Result<usize> {
        self.request(|reply| BridgeRequest::GetMeshCount { reply })
            .await
    }

    pub async fn download_all(&self) -> anyhow::Result<ExportOutcome> {
        self.request(|reply| BridgeRequest::DownloadAllMeshes { reply })
            .await
    }

    async fn request<T>(
        &self,
        make_request: impl FnOnce(oneshot::Sender<T>) -> BridgeRequest,
    ) -> anyhow::Result<T> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(make_request(reply))
            .map_err(|_| anyhow!("Bridge unreachable: the core has shut down"))?;

        match tokio::time::timeout(self.timeout, response).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => bail!("Bridge unreachable: the core dropped the request"),
            Err(_) => bail!("Bridge unreachable: no answer within {:?}", self.timeout),
        }
    }
}
