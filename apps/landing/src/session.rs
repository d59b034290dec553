//! The page loop: feeds events to the controller, applies its commands to the document
//! and queues its effects for the backend worker.

use std::{
    collections::{BTreeSet, HashSet, VecDeque},
    thread,
    time::Instant,
};

use anyhow::{bail, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use page_core::{Document, PageController};
use shared::protocol::{Effect, PageEvent, TimerId};
use uuid::Uuid;

use crate::backend_bridge::commands::BackendCommand;

/// Effects handed to the worker whose answering event has not arrived yet.
#[derive(Debug, Default)]
struct Outstanding {
    timers: BTreeSet<TimerId>,
    frame: bool,
    submissions: HashSet<Uuid>,
}

impl Outstanding {
    fn track(&mut self, effect: &Effect) {
        match effect {
            Effect::StartTimer { timer, .. } => {
                self.timers.insert(*timer);
            }
            Effect::RequestAnimationFrame => self.frame = true,
            Effect::Submit { submission } => {
                self.submissions.insert(submission.submission_id);
            }
            Effect::CancelSubmission { submission_id } => {
                self.submissions.remove(submission_id);
            }
        }
    }

    fn settle(&mut self, event: &PageEvent) {
        match event {
            PageEvent::TimerElapsed { timer } => {
                self.timers.remove(timer);
            }
            PageEvent::AnimationFrame { .. } => self.frame = false,
            PageEvent::SubmissionFinished { submission_id, .. } => {
                self.submissions.remove(submission_id);
            }
            _ => {}
        }
    }

    fn is_empty(&self) -> bool {
        self.timers.is_empty() && !self.frame && self.submissions.is_empty()
    }
}

pub struct Session {
    controller: PageController,
    doc: Document,
    cmd_tx: Sender<BackendCommand>,
    outstanding: Outstanding,
}

impl Session {
    pub fn new(controller: PageController, doc: Document, cmd_tx: Sender<BackendCommand>) -> Self {
        Self {
            controller,
            doc,
            cmd_tx,
            outstanding: Outstanding::default(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn controller(&self) -> &PageController {
        &self.controller
    }

    /// True when no timer, frame or submission is still owed an answer.
    pub fn is_idle(&self) -> bool {
        self.outstanding.is_empty()
    }

    /// A visitor action. Typing and scrolling change the document before the controller
    /// hears about them, as they would in a browser.
    pub fn user_event(&mut self, event: PageEvent) {
        match &event {
            PageEvent::FieldInput { field, value } => {
                if !self.doc.set_value(field.as_str(), value) {
                    tracing::warn!(%field, "typed into a field the page does not have");
                }
            }
            PageEvent::Scrolled { scroll_y } => self.doc.scroll_to(*scroll_y),
            _ => {}
        }
        self.dispatch(event);
    }

    /// Runs `event` and everything it causes synchronously: programmatic scrolls and
    /// intersection changes are fed back until the page is quiet. An effect the worker
    /// cannot take comes back as `BackendUnavailable`.
    pub fn dispatch(&mut self, event: PageEvent) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            self.outstanding.settle(&event);
            let scroll_before = self.doc.scroll_y();
            let reaction = self.controller.handle(event);

            for command in &reaction.commands {
                if let Err(err) = self.doc.apply(command) {
                    tracing::warn!(error = %err, "page rejected a command");
                    queue.push_back(PageEvent::ScriptError {
                        message: err.to_string(),
                    });
                }
            }
            for effect in reaction.effects {
                let name = effect.name();
                tracing::debug!(effect = name, "queueing effect");
                self.outstanding.track(&effect);
                if let Err(err) = send_backend_command(&self.cmd_tx, effect.into()) {
                    tracing::error!(effect = name, error = %err, "effect dropped");
                    self.outstanding = Outstanding::default();
                    queue.push_back(PageEvent::BackendUnavailable {
                        effect: name.to_string(),
                    });
                }
            }

            if self.doc.scroll_y() != scroll_before {
                queue.push_back(PageEvent::Scrolled {
                    scroll_y: self.doc.scroll_y(),
                });
            }
            queue.extend(self.doc.take_intersections());
        }
    }

    /// Handles worker events until `deadline`.
    pub fn pump_until(&mut self, event_rx: &Receiver<PageEvent>, deadline: Instant) {
        loop {
            match event_rx.recv_deadline(deadline) {
                Ok(event) => self.dispatch(event),
                Err(RecvTimeoutError::Timeout) => return,
                Err(RecvTimeoutError::Disconnected) => {
                    self.worker_lost();
                    thread::sleep(deadline.saturating_duration_since(Instant::now()));
                    return;
                }
            }
        }
    }

    /// Handles worker events until nothing is outstanding. Returns false if `deadline`
    /// passed first.
    pub fn settle(&mut self, event_rx: &Receiver<PageEvent>, deadline: Instant) -> bool {
        while !self.is_idle() {
            match event_rx.recv_deadline(deadline) {
                Ok(event) => self.dispatch(event),
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => self.worker_lost(),
            }
        }
        true
    }

    /// The worker hung up. Whatever it still owed will never arrive.
    fn worker_lost(&mut self) {
        if self.is_idle() {
            return;
        }
        tracing::error!(outstanding = ?self.outstanding, "backend worker stopped with work outstanding");
        self.outstanding = Outstanding::default();
        self.dispatch(PageEvent::BackendUnavailable {
            effect: "worker".to_string(),
        });
    }
}

pub fn send_backend_command(cmd_tx: &Sender<BackendCommand>, cmd: BackendCommand) -> Result<()> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => Ok(()),
        Err(TrySendError::Full(cmd)) => {
            tracing::warn!(command = cmd_name, "backend command queue is full; waiting");
            if cmd_tx.send(cmd).is_err() {
                bail!("backend worker disconnected while queueing {cmd_name}");
            }
            Ok(())
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::error!(command = cmd_name, "backend command queue disconnected");
            bail!("backend worker disconnected while queueing {cmd_name}")
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
