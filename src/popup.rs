use std::time::{Duration, Instant};
use tokio::sync::watch;

use crate::bridge::{BridgeClient, BridgeEvent};
use crate::export::ExportOutcome;

pub const REFRESH_ERROR: &str = "Error: Please refresh the page";
pub const NO_MESHES_ERROR: &str = "No meshes found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Status {
    pub message: String,
    pub kind: StatusKind,
    shown_at: Instant,
}

/// State of the control panel: the mesh count, whether "download all" is
/// available, and the status line.
pub struct Popup {
    client: BridgeClient,
    status_duration: Duration,
    mesh_count: usize,
    download_enabled: bool,
    status: Option<Status>,
    last_download: Option<String>,
    last_notice: Option<String>,
}

impl Popup {
    pub fn new(client: BridgeClient, status_duration: Duration) -> Self {
        Self {
            client,
            status_duration,
            mesh_count: 0,
            download_enabled: false,
            status: None,
            last_download: None,
            last_notice: None,
        }
    }

    pub fn mesh_count(&self) -> usize {
        self.mesh_count
    }

    pub fn download_enabled(&self) -> bool {
        self.download_enabled
    }

    pub fn last_download(&self) -> Option<&str> {
        self.last_download.as_deref()
    }

    pub fn last_notice(&self) -> Option<&str> {
        self.last_notice.as_deref()
    }

    pub fn update_mesh_count(&mut self, count: usize) {
        self.mesh_count = count;
        self.download_enabled = count > 0;
    }

    fn show_status(&mut self, message: impl Into<String>, kind: StatusKind) {
        self.status = Some(Status {
            message: message.into(),
            kind,
            shown_at: Instant::now(),
        });
    }

    /// The status line as it looks at `now`. Errors stay until replaced.
    pub fn status_at(&self, now: Instant) -> Option<&Status> {
        self.status.as_ref().filter(|status| {
            status.kind == StatusKind::Error
                || now.saturating_duration_since(status.shown_at) < self.status_duration
        })
    }

    pub fn status(&self) -> Option<&Status> {
        self.status_at(Instant::now())
    }

    pub async fn refresh(&mut self) {
        match self.client.mesh_count().await {
            Ok(count) => self.update_mesh_count(count),
            Err(err) => {
                log::error!("Error requesting mesh count: {err:#}");
                self.show_status(REFRESH_ERROR, StatusKind::Error);
            }
        }
    }

    pub async fn download_all(&mut self) -> Option<ExportOutcome> {
        if self.mesh_count == 0 {
            self.show_status(NO_MESHES_ERROR, StatusKind::Error);
            return None;
        }

        self.download_enabled = false;
        let result = self.client.download_all().await;
        self.download_enabled = true;

        match result {
            Ok(outcome) => {
                self.show_status(
                    format!("Downloading {} meshes...", self.mesh_count),
                    StatusKind::Success,
                );
                Some(outcome)
            }
            Err(err) => {
                log::error!("Error downloading meshes: {err:#}");
                self.show_status(REFRESH_ERROR, StatusKind::Error);
                None
            }
        }
    }

    pub fn handle_event(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::DownloadComplete { filename } => {
                log::debug!("Download complete: {filename}");
                self.last_download = Some(filename);
            }
            BridgeEvent::Notice(message) => {
                log::info!("{message}");
                self.last_notice = Some(message);
            }
        }
    }

    /// Shows the newest polled count. Older polls are simply overwritten.
    pub fn apply_count_updates(&mut self, counts: &mut watch::Receiver<Option<usize>>) {
        if let Some(count) = *counts.borrow_and_update() {
            self.update_mesh_count(count);
        }
    }
}

/// Polls the mesh count every `interval` until the popup side of `counts` is
/// dropped. Failed polls are logged and retried on the next tick.
pub async fn auto_refresh(
    client: BridgeClient,
    interval: Duration,
    counts: watch::Sender<Option<usize>>,
) {
    let mut ticker = tokio::time::interval(interval);

    while !counts.is_closed() {
        ticker.tick().await;

        match client.mesh_count().await {
            Ok(count) => {
                let _ = counts.send(Some(count));
            }
            Err(err) => log::error!("Error requesting mesh count: {err:#}"),
        }
    }
}
