//! Contact form: per-field rules, inline error surface, and the submission state machine.

use std::collections::BTreeMap;

use chrono::Utc;
use shared::{
    domain::{
        ContactSubmission, ElementId, FieldId, FieldKind, FieldRule, SubmissionReceipt,
        SubmissionState, ValidationResult,
    },
    error::{PageError, SubmissionError, UnexpectedError, ValidationError},
    protocol::{Effect, Target, UiCommand},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    modal,
    track_event,
    validators::{validate_email, validate_phone},
    PageController, Reaction,
};

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const EMAIL_REQUIRED_MESSAGE: &str = "Email is required";
pub const EMAIL_INVALID_MESSAGE: &str = "Please enter a valid email address";
pub const PHONE_REQUIRED_MESSAGE: &str = "Phone number is required";
pub const PHONE_INVALID_MESSAGE: &str = "Please enter a valid 10-digit phone number";
pub const SELECT_REQUIRED_MESSAGE: &str = "Please select an option";

const SUBMIT_BUTTON_SELECTOR: &str = "button[type=\"submit\"]";
const FORM_ERROR_SELECTOR: &str = ".form-error";
const ERROR_BORDER: &str = "var(--color-error)";
const DEFAULT_BORDER: &str = "var(--color-border)";

/// Applies `rule` to the trimmed `value`.
pub fn check_field(rule: &FieldRule, value: &str) -> ValidationResult {
    let value = value.trim();
    let field = rule.id.clone();
    let empty = value.is_empty();

    match rule.kind {
        FieldKind::Text => {
            if rule.required && empty {
                return ValidationResult::invalid(field, REQUIRED_MESSAGE);
            }
            if let Some(min) = rule.min_length {
                if !empty && value.chars().count() < min {
                    let label = rule.label.as_deref().unwrap_or("This field");
                    return ValidationResult::invalid(
                        field,
                        format!("{label} must be at least {min} characters"),
                    );
                }
            }
        }
        FieldKind::Email => {
            if rule.required && empty {
                return ValidationResult::invalid(field, EMAIL_REQUIRED_MESSAGE);
            }
            if !empty && !validate_email(value) {
                return ValidationResult::invalid(field, EMAIL_INVALID_MESSAGE);
            }
        }
        FieldKind::Tel => {
            if rule.required && empty {
                return ValidationResult::invalid(field, PHONE_REQUIRED_MESSAGE);
            }
            if !empty && !validate_phone(value) {
                return ValidationResult::invalid(field, PHONE_INVALID_MESSAGE);
            }
        }
        FieldKind::Select => {
            if rule.required && empty {
                return ValidationResult::invalid(field, SELECT_REQUIRED_MESSAGE);
            }
        }
        FieldKind::Other => {}
    }

    ValidationResult::ok(field)
}

pub fn show_error(field: &FieldId, message: &str) -> Vec<UiCommand> {
    let error_el = Target::Id(field.error_element());
    let input = Target::Id(field.element());
    vec![
        UiCommand::SetText {
            target: error_el.clone(),
            text: message.to_string(),
        },
        UiCommand::SetStyle {
            target: error_el,
            property: "display".into(),
            value: "block".into(),
        },
        UiCommand::SetStyle {
            target: input,
            property: "border-color".into(),
            value: ERROR_BORDER.into(),
        },
    ]
}

pub fn clear_error(field: &FieldId) -> Vec<UiCommand> {
    let error_el = Target::Id(field.error_element());
    let input = Target::Id(field.element());
    vec![
        UiCommand::SetText {
            target: error_el.clone(),
            text: String::new(),
        },
        UiCommand::SetStyle {
            target: error_el,
            property: "display".into(),
            value: "none".into(),
        },
        UiCommand::SetStyle {
            target: input,
            property: "border-color".into(),
            value: DEFAULT_BORDER.into(),
        },
    ]
}

/// Shows `message` in the form's top-level status area.
pub fn status_message(status: &ElementId, message: &str) -> Vec<UiCommand> {
    vec![
        UiCommand::SetText {
            target: Target::Id(status.clone()),
            text: message.to_string(),
        },
        UiCommand::SetStyle {
            target: Target::Id(status.clone()),
            property: "display".into(),
            value: "block".into(),
        },
        UiCommand::AddClass {
            target: Target::Id(status.clone()),
            class: "error".into(),
        },
    ]
}

pub fn clear_status(status: &ElementId) -> Vec<UiCommand> {
    vec![
        UiCommand::SetText {
            target: Target::Id(status.clone()),
            text: String::new(),
        },
        UiCommand::SetStyle {
            target: Target::Id(status.clone()),
            property: "display".into(),
            value: "none".into(),
        },
        UiCommand::RemoveClass {
            target: Target::Id(status.clone()),
            class: "error".into(),
        },
    ]
}

impl PageController {
    /// Validates one field and updates its inline error. An id with no configured rule is
    /// a page fault, not user input, and is reported as unexpected.
    pub fn validate_field(&mut self, field: &FieldId, reaction: &mut Reaction) -> bool {
        let Some(rule) = self.config.field_rule(field) else {
            self.report_unexpected(
                UnexpectedError::new(format!("unknown form field '{field}'")),
                reaction,
            );
            return true;
        };
        let value = self.state.values.get(field).map(String::as_str).unwrap_or("");
        let result = check_field(rule, value);

        reaction.extend(clear_error(field));
        match result.message {
            Some(message) if !result.valid => {
                self.surface_error(ValidationError::new(field.clone(), message).into(), reaction);
                false
            }
            _ => {
                reaction.push(UiCommand::RemoveClass {
                    target: Target::Id(field.element()),
                    class: "error".into(),
                });
                self.state.flagged_fields.remove(field);
                true
            }
        }
    }

    /// Runs every required field so each invalid one gets its message.
    pub fn validate_form(&mut self, reaction: &mut Reaction) -> bool {
        let required: Vec<FieldId> = self
            .config
            .form
            .fields
            .iter()
            .filter(|rule| rule.required)
            .map(|rule| rule.id.clone())
            .collect();

        required
            .iter()
            .fold(true, |all_valid, field| self.validate_field(field, reaction) && all_valid)
    }

    pub(crate) fn on_field_input(&mut self, field: FieldId, value: String, reaction: &mut Reaction) {
        if self.config.field_rule(&field).is_none() {
            self.report_unexpected(
                UnexpectedError::new(format!("input on unknown form field '{field}'")),
                reaction,
            );
            return;
        }
        if self.state.flagged_fields.remove(&field) {
            reaction.extend(clear_error(&field));
            reaction.push(UiCommand::RemoveClass {
                target: Target::Id(field.element()),
                class: "error".into(),
            });
        }
        self.state.values.insert(field, value);
    }

    pub(crate) fn on_form_submitted(&mut self, reaction: &mut Reaction) {
        if self.state.submission.is_submitting() {
            debug!("submit ignored; a submission is already in flight");
            return;
        }

        if !self.validate_form(reaction) {
            info!(
                invalid_fields = self.state.flagged_fields.len(),
                "form submission blocked by validation"
            );
            return;
        }

        let submission = ContactSubmission {
            submission_id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            fields: self
                .state
                .values
                .iter()
                .map(|(field, value)| (field.clone(), value.trim().to_string()))
                .collect::<BTreeMap<_, _>>(),
        };
        let submission_id = submission.submission_id;
        self.state.submission = SubmissionState::Submitting { submission_id };

        reaction.extend(clear_status(&self.config.form.status_id));
        reaction.extend(self.submit_button_busy(true));
        reaction.effect(Effect::Submit { submission });
        info!(%submission_id, "contact form submitting");
    }

    pub(crate) fn on_submission_finished(
        &mut self,
        submission_id: Uuid,
        outcome: Result<SubmissionReceipt, SubmissionError>,
        reaction: &mut Reaction,
    ) {
        if self.state.submission.in_flight() != Some(submission_id) {
            warn!(%submission_id, "ignoring result for a submission that is not in flight");
            return;
        }

        self.state.submission = SubmissionState::Idle;
        reaction.extend(self.submit_button_busy(false));

        match outcome {
            Ok(receipt) => {
                reaction.push(UiCommand::ResetForm {
                    form: self.config.form.form_id.clone(),
                });
                for value in self.state.values.values_mut() {
                    value.clear();
                }
                for field in std::mem::take(&mut self.state.flagged_fields) {
                    reaction.push(UiCommand::RemoveClass {
                        target: Target::Id(field.element()),
                        class: "error".into(),
                    });
                }
                reaction.push(UiCommand::SetText {
                    target: Target::all(FORM_ERROR_SELECTOR),
                    text: String::new(),
                });
                reaction.push(UiCommand::SetStyle {
                    target: Target::all(FORM_ERROR_SELECTOR),
                    property: "display".into(),
                    value: "none".into(),
                });
                reaction.extend(modal::show_modal(&self.config.form.success_modal_id));
                reaction.push(self.announce("Thank you! Your request has been submitted."));

                info!(
                    %submission_id,
                    accepted_at = %receipt.accepted_at,
                    "form submitted successfully"
                );
                track_event("Form", "Submit", "Contact");
            }
            Err(err) => {
                warn!(%submission_id, error = %err, "form submission failed");
                self.surface_error(PageError::from(err), reaction);
            }
        }
    }

    /// Leaving the page abandons an in-flight submission.
    pub(crate) fn on_page_hidden(&mut self, reaction: &mut Reaction) {
        let Some(submission_id) = self.state.submission.in_flight() else {
            return;
        };
        self.state.submission = SubmissionState::Idle;
        reaction.extend(self.submit_button_busy(false));
        reaction.effect(Effect::CancelSubmission { submission_id });
        self.surface_error(SubmissionError::Cancelled.into(), reaction);
        info!(%submission_id, "in-flight submission cancelled");
    }

    /// An effect never reached the runtime. A submission in flight can no longer finish,
    /// so the form is handed back before the fault is reported.
    pub(crate) fn on_backend_unavailable(&mut self, effect: &str, reaction: &mut Reaction) {
        if let Some(submission_id) = self.state.submission.in_flight() {
            self.state.submission = SubmissionState::Idle;
            reaction.extend(self.submit_button_busy(false));
            warn!(%submission_id, "submission abandoned; runtime unavailable");
        }
        self.report_unexpected(
            UnexpectedError::new(format!("runtime unavailable for {effect}")),
            reaction,
        );
    }

    fn submit_button_busy(&self, busy: bool) -> Vec<UiCommand> {
        let button = Target::Within {
            container: self.config.form.form_id.clone(),
            selector: SUBMIT_BUTTON_SELECTOR.into(),
        };
        let loading = if busy {
            UiCommand::AddClass {
                target: button.clone(),
                class: "loading".into(),
            }
        } else {
            UiCommand::RemoveClass {
                target: button.clone(),
                class: "loading".into(),
            }
        };
        vec![
            loading,
            UiCommand::SetDisabled {
                target: button,
                disabled: busy,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, kind: FieldKind, required: bool) -> FieldRule {
        FieldRule {
            id: FieldId::from(id),
            kind,
            required,
            min_length: None,
            label: None,
        }
    }

    #[test]
    fn empty_required_text_is_always_rejected() {
        let text = rule("city", FieldKind::Text, true);
        for value in ["", " ", "\t\n"] {
            let result = check_field(&text, value);
            assert!(!result.valid);
            assert_eq!(result.message.as_deref(), Some(REQUIRED_MESSAGE));
        }
    }

    #[test]
    fn min_length_applies_only_to_non_empty_values() {
        let mut name = rule("name", FieldKind::Text, false);
        name.min_length = Some(2);
        name.label = Some("Name".into());

        assert!(check_field(&name, "").valid);
        let short = check_field(&name, " A ");
        assert_eq!(
            short.message.as_deref(),
            Some("Name must be at least 2 characters")
        );
        assert!(check_field(&name, "Al").valid);
    }

    #[test]
    fn email_messages_distinguish_missing_from_malformed() {
        let email = rule("email", FieldKind::Email, true);
        assert_eq!(
            check_field(&email, "").message.as_deref(),
            Some(EMAIL_REQUIRED_MESSAGE)
        );
        assert_eq!(
            check_field(&email, "user@").message.as_deref(),
            Some(EMAIL_INVALID_MESSAGE)
        );
        assert!(check_field(&email, " user@example.com ").valid);

        let optional = rule("altEmail", FieldKind::Email, false);
        assert!(check_field(&optional, "").valid);
        assert!(!check_field(&optional, "nope").valid);
    }

    #[test]
    fn phone_messages_distinguish_missing_from_malformed() {
        let phone = rule("phone", FieldKind::Tel, true);
        assert_eq!(
            check_field(&phone, "").message.as_deref(),
            Some(PHONE_REQUIRED_MESSAGE)
        );
        assert_eq!(
            check_field(&phone, "12345").message.as_deref(),
            Some(PHONE_INVALID_MESSAGE)
        );
        assert!(check_field(&phone, "98765 43210").valid);
    }

    #[test]
    fn select_and_other_kinds() {
        let select = rule("propertyType", FieldKind::Select, true);
        assert_eq!(
            check_field(&select, "").message.as_deref(),
            Some(SELECT_REQUIRED_MESSAGE)
        );
        assert!(check_field(&select, "residential").valid);

        let other = rule("message", FieldKind::Other, true);
        assert!(check_field(&other, "").valid);
    }

    #[test]
    fn error_surface_targets_field_and_its_error_element() {
        let field = FieldId::from("email");
        let shown = show_error(&field, "Email is required");
        assert_eq!(
            shown[0],
            UiCommand::SetText {
                target: Target::id("emailError"),
                text: "Email is required".into()
            }
        );
        assert_eq!(clear_error(&field), clear_error(&field));
        assert_eq!(clear_error(&field).len(), shown.len());
    }
}
