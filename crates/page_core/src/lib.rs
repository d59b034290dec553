//! Interactivity layer for the Solaroof landing page.
//!
//! A single [`PageController`] owns all page-lifetime state. The page reports
//! [`PageEvent`]s; each is turned into a [`Reaction`]: DOM mutations for the adapter to
//! apply and effects (timers, animation frames, submissions) for the runtime to execute.
//! Handlers never touch a DOM themselves.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use shared::{
    domain::{ElementId, FieldId, SubmissionState, SystemTier},
    error::{PageError, UnexpectedError},
    protocol::{Effect, PageEvent, Target, TimerId, UiCommand},
};
use tracing::{debug, error, info, warn};

pub mod accessibility;
pub mod animation;
pub mod calculator;
pub mod config;
pub mod dom;
pub mod form;
pub mod format;
pub mod modal;
pub mod navigation;
pub mod submission;
pub mod validators;

pub use config::{load_settings, SiteConfig};
pub use dom::Document;
pub use submission::{HttpSubmitter, SimulatedSubmitter, Submitter};

use animation::CounterAnimation;

/// What a handler asks of the outside world.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reaction {
    pub commands: Vec<UiCommand>,
    pub effects: Vec<Effect>,
}

impl Reaction {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.effects.is_empty()
    }

    pub(crate) fn push(&mut self, command: UiCommand) {
        self.commands.push(command);
    }

    pub(crate) fn extend(&mut self, commands: impl IntoIterator<Item = UiCommand>) {
        self.commands.extend(commands);
    }

    pub(crate) fn effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TimerAction {
    Apply(Vec<UiCommand>),
    ScrollSettled,
}

/// Page-lifetime state. Created once at page init, owned by the controller.
#[derive(Debug, Clone)]
pub struct PageState {
    pub initialized: bool,
    pub current_tier: SystemTier,
    pub is_nav_open: bool,
    pub submission: SubmissionState,
    pub animated_counters: HashSet<ElementId>,
    pub flagged_fields: BTreeSet<FieldId>,
    pub values: BTreeMap<FieldId, String>,
    pub scroll_y: f64,
    pub(crate) running_counters: Vec<CounterAnimation>,
    pub(crate) frame_requested: bool,
    pub(crate) pending_scroll: Option<TimerId>,
    pub(crate) timers: BTreeMap<TimerId, TimerAction>,
    next_timer: u64,
}

impl PageState {
    fn new(config: &SiteConfig) -> Self {
        Self {
            initialized: false,
            current_tier: config.calculator.default_tier,
            is_nav_open: false,
            submission: SubmissionState::Idle,
            animated_counters: HashSet::new(),
            flagged_fields: BTreeSet::new(),
            values: config
                .form
                .fields
                .iter()
                .map(|rule| (rule.id.clone(), String::new()))
                .collect(),
            scroll_y: 0.0,
            running_counters: Vec::new(),
            frame_requested: false,
            pending_scroll: None,
            timers: BTreeMap::new(),
            next_timer: 1,
        }
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}

pub struct PageController {
    config: SiteConfig,
    state: PageState,
}

impl PageController {
    pub fn new(config: SiteConfig) -> Self {
        let state = PageState::new(&config);
        Self { config, state }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn handle(&mut self, event: PageEvent) -> Reaction {
        let mut reaction = Reaction::default();
        match event {
            PageEvent::Loaded => self.on_loaded(&mut reaction),
            PageEvent::NavToggleClicked => self.on_nav_toggle(&mut reaction),
            PageEvent::NavLinkClicked { href } => self.on_nav_link(&href, &mut reaction),
            PageEvent::Scrolled { scroll_y } => self.on_scrolled(scroll_y, &mut reaction),
            PageEvent::CtaClicked { action } => self.on_cta(&action, &mut reaction),
            PageEvent::SizeButtonClicked { data_size } => {
                self.on_size_button(&data_size, &mut reaction)
            }
            PageEvent::FieldInput { field, value } => {
                self.on_field_input(field, value, &mut reaction)
            }
            PageEvent::FieldBlurred { field } => {
                self.validate_field(&field, &mut reaction);
            }
            PageEvent::FormSubmitted => self.on_form_submitted(&mut reaction),
            PageEvent::SubmissionFinished {
                submission_id,
                outcome,
            } => self.on_submission_finished(submission_id, outcome, &mut reaction),
            PageEvent::PageHidden => self.on_page_hidden(&mut reaction),
            PageEvent::Clicked { classes, .. } => self.on_document_click(&classes, &mut reaction),
            PageEvent::KeyDown { key } => self.on_key_down(&key, &mut reaction),
            PageEvent::Intersected { observer, entries } => {
                self.on_intersected(observer, entries, &mut reaction)
            }
            PageEvent::AnimationFrame { now_ms } => self.on_animation_frame(now_ms, &mut reaction),
            PageEvent::TimerElapsed { timer } => self.on_timer(timer, &mut reaction),
            PageEvent::SkipLinkFocused => self.on_skip_link_focus(true, &mut reaction),
            PageEvent::SkipLinkBlurred => self.on_skip_link_focus(false, &mut reaction),
            PageEvent::ScriptError { message } => {
                self.report_unexpected(UnexpectedError::new(message), &mut reaction)
            }
            PageEvent::BackendUnavailable { effect } => {
                self.on_backend_unavailable(&effect, &mut reaction)
            }
        }
        reaction
    }

    fn on_loaded(&mut self, reaction: &mut Reaction) {
        if self.state.initialized {
            warn!("page init requested twice; ignoring");
            return;
        }
        self.state.initialized = true;

        self.init_calculator(reaction);
        self.init_counters(reaction);
        self.init_scroll_animations(reaction);
        self.init_lazy_images(reaction);
        self.init_accessibility(reaction);

        track_event("Page", "Load", "Homepage");
        info!("landing page initialized");
    }

    pub(crate) fn schedule(&mut self, after_ms: u64, action: TimerAction, reaction: &mut Reaction) -> TimerId {
        let timer = TimerId(self.state.next_timer);
        self.state.next_timer += 1;
        self.state.timers.insert(timer, action);
        reaction.effect(Effect::StartTimer { timer, after_ms });
        timer
    }

    pub(crate) fn cancel_timer(&mut self, timer: TimerId) {
        self.state.timers.remove(&timer);
    }

    fn on_timer(&mut self, timer: TimerId, reaction: &mut Reaction) {
        match self.state.timers.remove(&timer) {
            Some(TimerAction::Apply(commands)) => reaction.extend(commands),
            Some(TimerAction::ScrollSettled) => self.on_scroll_settled(timer, reaction),
            None => debug!(timer = timer.0, "timer was cleared before it fired"),
        }
    }

    /// Logs a programming/environment fault and shows the generic failure message.
    pub(crate) fn report_unexpected(&mut self, err: UnexpectedError, reaction: &mut Reaction) {
        error!(error = %err, "unexpected page error");
        self.surface_error(err.into(), reaction);
    }

    /// Field errors go next to their field; everything else to the form status area.
    pub(crate) fn surface_error(&mut self, err: PageError, reaction: &mut Reaction) {
        let message = err.user_message();
        match err.field().cloned() {
            Some(field) => {
                reaction.extend(form::show_error(&field, &message));
                reaction.push(UiCommand::AddClass {
                    target: Target::Id(field.element()),
                    class: "error".into(),
                });
                self.state.flagged_fields.insert(field);
            }
            None => {
                reaction.extend(form::status_message(&self.config.form.status_id, &message));
                reaction.push(self.announce(&message));
            }
        }
    }
}

/// Analytics hook. Only logged; no tracking backend is wired up.
pub fn track_event(category: &str, action: &str, label: &str) {
    info!(target: "analytics", category, action, label, "track event");
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
