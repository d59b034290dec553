use std::collections::BTreeMap;

use shared::protocol::{InsertPosition, NewElement, Target, UiCommand};

use crate::{PageController, Reaction};

const SCREEN_READER_ONLY: &str = "sr-only";

impl PageController {
    /// Adds the keyboard skip link and the live region used for announcements.
    pub(crate) fn init_accessibility(&mut self, reaction: &mut Reaction) {
        let page = &self.config.page;

        let skip_link = NewElement {
            tag: "a".into(),
            id: Some(page.skip_link_id.clone()),
            text: "Skip to main content".into(),
            classes: vec!["skip-link".into(), SCREEN_READER_ONLY.into()],
            attributes: BTreeMap::from([(
                "href".to_string(),
                format!("#{}", page.main_content_id),
            )]),
            styles: [
                ("position", "fixed"),
                ("top", "10px"),
                ("left", "10px"),
                ("z-index", "9999"),
                ("background", "var(--color-primary)"),
                ("color", "white"),
                ("padding", "8px 16px"),
                ("text-decoration", "none"),
                ("border-radius", "4px"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        };

        let announcer = NewElement {
            tag: "div".into(),
            id: Some(page.announcer_id.clone()),
            classes: vec![SCREEN_READER_ONLY.into()],
            attributes: BTreeMap::from([
                ("aria-live".to_string(), "polite".to_string()),
                ("aria-atomic".to_string(), "true".to_string()),
            ]),
            ..NewElement::default()
        };

        reaction.push(UiCommand::InsertElement {
            element: skip_link,
            position: InsertPosition::BodyStart,
        });
        reaction.push(UiCommand::InsertElement {
            element: announcer,
            position: InsertPosition::BodyEnd,
        });
    }

    pub(crate) fn on_skip_link_focus(&mut self, focused: bool, reaction: &mut Reaction) {
        let target = Target::Id(self.config.page.skip_link_id.clone());
        let class = SCREEN_READER_ONLY.to_string();
        reaction.push(if focused {
            UiCommand::RemoveClass { target, class }
        } else {
            UiCommand::AddClass { target, class }
        });
    }

    /// Text for the polite live region.
    pub fn announce(&self, message: &str) -> UiCommand {
        UiCommand::SetText {
            target: Target::Id(self.config.page.announcer_id.clone()),
            text: message.to_string(),
        }
    }
}
