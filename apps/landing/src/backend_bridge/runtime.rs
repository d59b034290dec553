//! Backend worker: owns a tokio runtime on its own thread and turns queued commands into
//! timers, animation frames and submissions. Results come back as page events.

use std::{
    collections::HashMap,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender};
use page_core::Submitter;
use shared::protocol::PageEvent;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::backend_bridge::commands::BackendCommand;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub fn spawn_backend_thread(
    cmd_rx: Receiver<BackendCommand>,
    event_tx: Sender<PageEvent>,
    submitter: Arc<dyn Submitter>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = event_tx.try_send(PageEvent::BackendUnavailable {
                    effect: "runtime_startup".to_string(),
                });
                return;
            }
        };

        runtime.block_on(async move {
            let clock = Instant::now();
            let mut in_flight: HashMap<Uuid, JoinHandle<()>> = HashMap::new();
            tracing::debug!("backend worker ready");

            while let Ok(cmd) = cmd_rx.recv() {
                tracing::trace!(command = cmd.name(), "backend command received");
                in_flight.retain(|_, task| !task.is_finished());

                match cmd {
                    BackendCommand::StartTimer { timer, after } => {
                        let event_tx = event_tx.clone();
                        tokio::spawn(async move {
                            tokio::time::sleep(after).await;
                            deliver(&event_tx, PageEvent::TimerElapsed { timer });
                        });
                    }
                    BackendCommand::RequestFrame => {
                        let event_tx = event_tx.clone();
                        tokio::spawn(async move {
                            tokio::time::sleep(FRAME_INTERVAL).await;
                            let now_ms = clock.elapsed().as_secs_f64() * 1000.0;
                            deliver(&event_tx, PageEvent::AnimationFrame { now_ms });
                        });
                    }
                    BackendCommand::Submit { submission } => {
                        let submission_id = submission.submission_id;
                        let submitter = Arc::clone(&submitter);
                        let event_tx = event_tx.clone();
                        let task = tokio::spawn(async move {
                            let outcome = submitter.submit(&submission).await;
                            match &outcome {
                                Ok(_) => tracing::info!(%submission_id, "submission accepted"),
                                Err(err) => {
                                    tracing::warn!(%submission_id, error = %err, "submission failed")
                                }
                            }
                            deliver(
                                &event_tx,
                                PageEvent::SubmissionFinished {
                                    submission_id,
                                    outcome,
                                },
                            );
                        });
                        in_flight.insert(submission_id, task);
                    }
                    BackendCommand::CancelSubmission { submission_id } => {
                        match in_flight.remove(&submission_id) {
                            Some(task) => {
                                task.abort();
                                tracing::info!(%submission_id, "submission aborted");
                            }
                            None => tracing::debug!(
                                %submission_id,
                                "cancel requested for a submission that already finished"
                            ),
                        }
                    }
                    BackendCommand::Shutdown => break,
                }
            }

            for (_, task) in in_flight.drain() {
                task.abort();
            }
            tracing::debug!("backend worker stopped");
        });
    })
}

fn deliver(event_tx: &Sender<PageEvent>, event: PageEvent) {
    if event_tx.send(event).is_err() {
        tracing::debug!("page loop is gone; dropping backend event");
    }
}
