//! Replays recorded sensor events from JSON lines.

use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::SensorEvent;

/// Sensor replay errors.
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("Failed to read sensor stream: {0}")]
    Io(#[from] std::io::Error),
}

/// Read one JSON event per line from `reader` and forward it on `tx`.
///
/// Events carrying `at_ms` are held back until that offset from the start of
/// the replay has passed. Blank lines are skipped; malformed lines are logged
/// and skipped. Returns the number of events forwarded, stopping early if the
/// receiver is dropped.
pub async fn replay_lines<R>(reader: R, tx: mpsc::Sender<SensorEvent>) -> Result<usize, SensorError>
where
    R: AsyncBufRead + Unpin,
{
    let started = Instant::now();
    let mut lines = reader.lines();
    let mut line_no = 0usize;
    let mut forwarded = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: SensorEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Skipping malformed sensor line {}: {}", line_no, e);
                continue;
            }
        };

        if let Some(at_ms) = event.at_ms() {
            tokio::time::sleep_until(started + Duration::from_millis(at_ms)).await;
        }

        if tx.send(event).await.is_err() {
            tracing::debug!("Sensor receiver closed after {} events", forwarded);
            break;
        }
        forwarded += 1;
    }

    Ok(forwarded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::HandSample;

    #[tokio::test]
    async fn test_replay_skips_blank_and_malformed() {
        let input = concat!(
            "{\"type\":\"frame\",\"hands\":[{\"x\":1,\"y\":2,\"confidence\":0.5}]}\n",
            "\n",
            "not json\n",
            "{\"type\":\"zone\",\"xMin\":0,\"yMin\":0,\"xMax\":10,\"yMax\":10}\n",
        );
        let (tx, mut rx) = mpsc::channel(8);

        let forwarded = replay_lines(input.as_bytes(), tx).await.unwrap();
        assert_eq!(forwarded, 2);

        assert_eq!(
            rx.recv().await,
            Some(SensorEvent::frame(vec![HandSample::new(1.0, 2.0, 0.5)]))
        );
        assert!(matches!(rx.recv().await, Some(SensorEvent::Zone { .. })));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_replay_honours_offsets() {
        let input = "{\"type\":\"frame\",\"at_ms\":30}\n";
        let (tx, mut rx) = mpsc::channel(1);
        let started = std::time::Instant::now();

        replay_lines(input.as_bytes(), tx).await.unwrap();
        assert!(rx.recv().await.is_some());
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}
