//! Playout of synthesized frames for one room.
//!
//! Drains a session's frame receiver at real-time pace, one frame per frame
//! duration. Playout stops as soon as the session is closed; frames still
//! queued at that point are discarded.

use neo_voice::{CancelFlag, FrameReceiver};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Totals for one publisher run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishStats {
    pub frames: u64,
    pub utterances: u64,
    /// Frames dropped unplayed because the session was closed.
    pub discarded: u64,
}

/// Spawns the publisher task for `room`.
///
/// The task ends when `cancel` is raised or once every sender of `frames` is
/// gone, whichever comes first.
pub fn spawn_frame_publisher(
    room: String,
    frames: FrameReceiver,
    cancel: CancelFlag,
) -> JoinHandle<PublishStats> {
    tokio::spawn(publish_frames(room, frames, cancel))
}

async fn publish_frames(
    room: String,
    mut frames: FrameReceiver,
    cancel: CancelFlag,
) -> PublishStats {
    tracing::info!(room = %room, "frame publisher started");

    let mut stats = PublishStats::default();
    let mut current: Option<String> = None;
    let mut ticker = interval(Duration::from_millis(u64::from(neo_types::FRAME_DURATION_MS)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let audio = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            next = frames.recv() => match next {
                Some(audio) => audio,
                None => break,
            },
        };

        if current.as_deref() != Some(audio.request_id.as_str()) {
            if let Some(previous) = current.take() {
                tracing::debug!(room = %room, request_id = %previous, "utterance playout finished");
            }
            tracing::debug!(room = %room, request_id = %audio.request_id, "utterance playout started");
            stats.utterances += 1;
            current = Some(audio.request_id.clone());
            // Restart pacing so a new utterance starts without a burst.
            ticker.reset();
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                stats.discarded += 1;
                break;
            }
            _ = ticker.tick() => {}
        }
        stats.frames += 1;
        tracing::trace!(
            room = %room,
            request_id = %audio.request_id,
            samples = audio.frame.samples_per_channel,
            "frame published"
        );
    }

    if cancel.is_cancelled() {
        frames.close();
        while frames.try_recv().is_ok() {
            stats.discarded += 1;
        }
        if stats.discarded > 0 {
            tracing::info!(room = %room, discarded = stats.discarded, "dropped queued frames of closed session");
        }
    }

    tracing::info!(
        room = %room,
        frames = stats.frames,
        utterances = stats.utterances,
        "frame publisher stopped"
    );
    stats
}
