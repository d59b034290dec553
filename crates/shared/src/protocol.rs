use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{ContactSubmission, ElementId, FieldId, SubmissionReceipt},
    error::SubmissionError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObserverKind {
    Counters,
    Reveal,
    LazyImages,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverOptions {
    pub threshold: f64,
    pub root_margin: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    pub id: ElementId,
    pub is_intersecting: bool,
    #[serde(default)]
    pub intersection_ratio: f64,
    /// `data-*` attributes of the observed element, without the prefix.
    #[serde(default)]
    pub dataset: BTreeMap<String, String>,
}

/// Everything the page can report to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PageEvent {
    Loaded,
    NavToggleClicked,
    NavLinkClicked {
        href: String,
    },
    Scrolled {
        scroll_y: f64,
    },
    CtaClicked {
        action: String,
    },
    SizeButtonClicked {
        data_size: String,
    },
    FieldInput {
        field: FieldId,
        value: String,
    },
    FieldBlurred {
        field: FieldId,
    },
    FormSubmitted,
    SubmissionFinished {
        submission_id: Uuid,
        outcome: Result<SubmissionReceipt, SubmissionError>,
    },
    PageHidden,
    Clicked {
        #[serde(default)]
        target: Option<ElementId>,
        #[serde(default)]
        classes: Vec<String>,
    },
    KeyDown {
        key: String,
    },
    Intersected {
        observer: ObserverKind,
        entries: Vec<IntersectionEntry>,
    },
    AnimationFrame {
        now_ms: f64,
    },
    TimerElapsed {
        timer: TimerId,
    },
    SkipLinkFocused,
    SkipLinkBlurred,
    ScriptError {
        message: String,
    },
    /// The runtime could not hand an effect to its worker; it will never be answered.
    BackendUnavailable {
        effect: String,
    },
}

/// What a command applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Target {
    Id(ElementId),
    /// Every element matching a selector list such as `.modal, .size-btn[data-size="2"]`.
    All(String),
    /// First element matching `selector` inside `container`.
    Within {
        container: ElementId,
        selector: String,
    },
    Body,
}

impl Target {
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(ElementId(id.into()))
    }

    pub fn all(selector: impl Into<String>) -> Self {
        Self::All(selector.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "where", content = "parent", rename_all = "snake_case")]
pub enum InsertPosition {
    BodyStart,
    BodyEnd,
    LastChildOf(ElementId),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewElement {
    pub tag: String,
    pub id: Option<ElementId>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub styles: BTreeMap<String, String>,
}

/// A single DOM mutation requested by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum UiCommand {
    SetText {
        target: Target,
        text: String,
    },
    SetStyle {
        target: Target,
        property: String,
        value: String,
    },
    AddClass {
        target: Target,
        class: String,
    },
    RemoveClass {
        target: Target,
        class: String,
    },
    SetAttribute {
        target: Target,
        name: String,
        value: String,
    },
    SetDisabled {
        target: Target,
        disabled: bool,
    },
    Focus {
        target: Target,
    },
    ResetForm {
        form: ElementId,
    },
    ScrollToElement {
        id: ElementId,
        /// Element whose height is subtracted from the scroll position (the fixed navbar).
        offset_by: ElementId,
        margin_px: f64,
    },
    Navigate {
        href: String,
    },
    InsertElement {
        element: NewElement,
        position: InsertPosition,
    },
    Observe {
        observer: ObserverKind,
        selector: String,
        options: ObserverOptions,
    },
    Unobserve {
        observer: ObserverKind,
        id: ElementId,
    },
}

/// Work that needs time or I/O. Executed by the runtime, which reports back with a `PageEvent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    StartTimer { timer: TimerId, after_ms: u64 },
    RequestAnimationFrame,
    Submit { submission: ContactSubmission },
    CancelSubmission { submission_id: Uuid },
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartTimer { .. } => "start_timer",
            Self::RequestAnimationFrame => "request_animation_frame",
            Self::Submit { .. } => "submit",
            Self::CancelSubmission { .. } => "cancel_submission",
        }
    }
}
