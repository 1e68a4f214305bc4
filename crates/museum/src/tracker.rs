//! Connection tracker: an actor that owns the live connection count.
//!
//! The count is only ever touched by the tracker task. Sessions report
//! in through a [`TrackerHandle`]: taking a [`ConnectionGuard`] counts a
//! connection, and dropping the guard uncounts it, however the session
//! ended. When a [`Heartbeat`] is configured the same task announces the
//! server once a minute with the current count.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::heartbeat::Heartbeat;

/// How often the server list is re-announced.
pub const HEARTBEAT_PERIOD: Duration = Duration::from_secs(60);

/// The tracker task has stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("connection tracker is not running")]
pub struct TrackerUnavailable;

enum TrackerCommand {
    Connected,
    Disconnected,
    Count { reply: oneshot::Sender<usize> },
}

/// Handle to a running tracker. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    sender: mpsc::UnboundedSender<TrackerCommand>,
}

impl TrackerHandle {
    /// Counts a new connection until the returned guard is dropped.
    pub fn connected(&self) -> ConnectionGuard {
        if self.sender.send(TrackerCommand::Connected).is_err() {
            tracing::warn!("connection tracker is gone, connection not counted");
        }
        ConnectionGuard {
            sender: self.sender.clone(),
        }
    }

    /// Returns the number of live connections.
    pub async fn count(&self) -> Result<usize, TrackerUnavailable> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(TrackerCommand::Count { reply: reply_tx })
            .map_err(|_| TrackerUnavailable)?;
        reply_rx.await.map_err(|_| TrackerUnavailable)
    }
}

/// Keeps one connection counted while it is alive.
///
/// `Drop` runs on every exit path of the session task, including panics,
/// so the count can't drift upwards.
#[derive(Debug)]
pub struct ConnectionGuard {
    sender: mpsc::UnboundedSender<TrackerCommand>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let _ = self.sender.send(TrackerCommand::Disconnected);
    }
}

/// Starts a tracker announcing every [`HEARTBEAT_PERIOD`].
pub fn spawn_tracker(heartbeat: Option<Heartbeat>) -> TrackerHandle {
    spawn_tracker_with_period(heartbeat, HEARTBEAT_PERIOD)
}

/// Starts a tracker with a custom heartbeat period.
///
/// The first periodic heartbeat fires one `period` after the start; the
/// initial announce is the caller's job.
pub fn spawn_tracker_with_period(heartbeat: Option<Heartbeat>, period: Duration) -> TrackerHandle {
    let (sender, receiver) = mpsc::unbounded_channel();
    let tracker = Tracker {
        connected: 0,
        heartbeat,
        period,
        receiver,
    };
    tokio::spawn(tracker.run());
    TrackerHandle { sender }
}

struct Tracker {
    connected: usize,
    heartbeat: Option<Heartbeat>,
    period: Duration,
    receiver: mpsc::UnboundedReceiver<TrackerCommand>,
}

impl Tracker {
    async fn run(mut self) {
        tracing::debug!(heartbeat = self.heartbeat.is_some(), "connection tracker started");

        let mut ticker = time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(TrackerCommand::Connected) => {
                        self.connected += 1;
                        tracing::debug!(connected = self.connected, "connection opened");
                    }
                    Some(TrackerCommand::Disconnected) => {
                        self.connected = self.connected.saturating_sub(1);
                        tracing::debug!(connected = self.connected, "connection closed");
                    }
                    Some(TrackerCommand::Count { reply }) => {
                        let _ = reply.send(self.connected);
                    }
                    None => break,
                },
                _ = ticker.tick(), if self.heartbeat.is_some() => self.beat(),
            }
        }

        tracing::debug!("connection tracker stopped");
    }

    /// Sends a heartbeat without holding up the command loop.
    fn beat(&self) {
        let Some(heartbeat) = self.heartbeat.clone() else {
            return;
        };
        let users = self.connected;
        tokio::spawn(async move {
            tracing::info!(users, "Sending heartbeat");
            if let Err(e) = heartbeat.send(users).await {
                tracing::warn!(error = %e, "heartbeat failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// A server list that answers every request with 200 and forwards
    /// each request line.
    async fn recording_server_list() -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/server/heartbeat/", listener.local_addr().unwrap());
        let (lines_tx, lines_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let lines_tx = lines_tx.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        let n = stream.read(&mut buf).await.unwrap();
                        if n == 0 {
                            break;
                        }
                        request.extend_from_slice(&buf[..n]);
                    }
                    let head = String::from_utf8_lossy(&request);
                    let _ = lines_tx.send(head.lines().next().unwrap_or_default().to_string());
                    let body = "http://example.net/play/tracked";
                    let reply = format!(
                        "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    stream.write_all(reply.as_bytes()).await.unwrap();
                });
            }
        });

        (url, lines_rx)
    }

    #[tokio::test]
    async fn test_periodic_heartbeat_announces_live_count() {
        let (url, mut requests) = recording_server_list().await;
        let heartbeat = Heartbeat::new("Tracked", 25565, 32, false).endpoint(url);
        let tracker = spawn_tracker_with_period(Some(heartbeat), Duration::from_millis(50));

        let _guard = tracker.connected();
        assert_eq!(tracker.count().await.unwrap(), 1);

        let line = time::timeout(Duration::from_secs(5), requests.recv())
            .await
            .expect("no heartbeat within 5s")
            .unwrap();
        assert!(line.starts_with("GET /server/heartbeat/?"), "{line}");
        assert!(line.contains("&users=1&"), "{line}");
    }

    #[tokio::test]
    async fn test_no_heartbeat_without_config() {
        let (_url, mut requests) = recording_server_list().await;
        let tracker = spawn_tracker_with_period(None, Duration::from_millis(10));
        let _guard = tracker.connected();

        time::sleep(Duration::from_millis(100)).await;
        assert!(requests.try_recv().is_err());
        assert_eq!(tracker.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_guards_track_count() {
        let tracker = spawn_tracker(None);
        assert_eq!(tracker.count().await.unwrap(), 0);

        let first = tracker.connected();
        let second = tracker.connected();
        assert_eq!(tracker.count().await.unwrap(), 2);

        drop(first);
        assert_eq!(tracker.count().await.unwrap(), 1);
        drop(second);
        assert_eq!(tracker.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_guard_dropped_in_panicking_task() {
        let tracker = spawn_tracker(None);
        let guard = tracker.connected();
        let task = tokio::spawn(async move {
            let _guard = guard;
            panic!("session blew up");
        });
        assert!(task.await.is_err());
        assert_eq!(tracker.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_one_count() {
        let tracker = spawn_tracker(None);
        let other = tracker.clone();
        let _guard = other.connected();
        assert_eq!(tracker.count().await.unwrap(), 1);
    }
}
