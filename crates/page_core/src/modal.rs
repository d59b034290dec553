use shared::{
    domain::ElementId,
    protocol::{Target, UiCommand},
};

use crate::{PageController, Reaction};

const MODAL_CLASS: &str = "modal";
const MODAL_CLOSE_CLASS: &str = "modal-close";

/// Opens a modal, locks page scroll and moves focus to its close button.
pub fn show_modal(id: &ElementId) -> Vec<UiCommand> {
    vec![
        UiCommand::AddClass {
            target: Target::Id(id.clone()),
            class: "show".into(),
        },
        UiCommand::SetStyle {
            target: Target::Body,
            property: "overflow".into(),
            value: "hidden".into(),
        },
        UiCommand::Focus {
            target: Target::Within {
                container: id.clone(),
                selector: format!(".{MODAL_CLOSE_CLASS}"),
            },
        },
    ]
}

/// Closes every open modal.
pub fn close_modal() -> Vec<UiCommand> {
    vec![
        UiCommand::RemoveClass {
            target: Target::all(format!(".{MODAL_CLASS}")),
            class: "show".into(),
        },
        UiCommand::SetStyle {
            target: Target::Body,
            property: "overflow".into(),
            value: "auto".into(),
        },
    ]
}

impl PageController {
    /// Backdrop (`.modal`) and close-button clicks dismiss modals.
    pub(crate) fn on_document_click(&mut self, classes: &[String], reaction: &mut Reaction) {
        if classes
            .iter()
            .any(|class| class == MODAL_CLASS || class == MODAL_CLOSE_CLASS)
        {
            reaction.extend(close_modal());
        }
    }

    pub(crate) fn on_key_down(&mut self, key: &str, reaction: &mut Reaction) {
        if key == "Escape" {
            reaction.extend(close_modal());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_modal_focuses_close_button_inside_modal() {
        let commands = show_modal(&ElementId::from("successModal"));
        assert!(commands.contains(&UiCommand::Focus {
            target: Target::Within {
                container: ElementId::from("successModal"),
                selector: ".modal-close".into(),
            }
        }));
    }
}
