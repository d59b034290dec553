use shared::{
    domain::ElementId,
    protocol::{Target, UiCommand},
};
use tracing::{debug, warn};

use crate::{PageController, Reaction, TimerAction};

const SCROLLED_BACKGROUND: &str = "rgba(255, 255, 255, 0.95)";
const SCROLLED_SHADOW: &str = "0 2px 20px rgba(0, 0, 0, 0.1)";
const TOP_BACKGROUND: &str = "rgba(255, 255, 255, 0.85)";

impl PageController {
    pub(crate) fn on_nav_toggle(&mut self, reaction: &mut Reaction) {
        self.state.is_nav_open = !self.state.is_nav_open;
        let page = &self.config.page;
        if self.state.is_nav_open {
            reaction.extend([
                UiCommand::SetStyle {
                    target: Target::Id(page.nav_menu_id.clone()),
                    property: "display".into(),
                    value: "flex".into(),
                },
                UiCommand::AddClass {
                    target: Target::Id(page.nav_toggle_id.clone()),
                    class: "active".into(),
                },
                UiCommand::SetStyle {
                    target: Target::Body,
                    property: "overflow".into(),
                    value: "hidden".into(),
                },
            ]);
        } else {
            self.close_mobile_nav(reaction);
        }
    }

    pub fn close_mobile_nav(&mut self, reaction: &mut Reaction) {
        self.state.is_nav_open = false;
        let page = &self.config.page;
        reaction.extend([
            UiCommand::SetStyle {
                target: Target::Id(page.nav_menu_id.clone()),
                property: "display".into(),
                value: "none".into(),
            },
            UiCommand::RemoveClass {
                target: Target::Id(page.nav_toggle_id.clone()),
                class: "active".into(),
            },
            UiCommand::SetStyle {
                target: Target::Body,
                property: "overflow".into(),
                value: "auto".into(),
            },
        ]);
    }

    pub(crate) fn on_nav_link(&mut self, href: &str, reaction: &mut Reaction) {
        match href.strip_prefix('#') {
            Some(section) if !section.is_empty() => {
                reaction.push(self.scroll_command(section));
            }
            _ => warn!(href, "nav link does not point at an in-page section"),
        }
    }

    /// Smooth-scrolls so the section's top sits just below the fixed navbar.
    pub fn scroll_to_section(&self, section: &str) -> Reaction {
        let mut reaction = Reaction::default();
        reaction.push(self.scroll_command(section));
        reaction
    }

    fn scroll_command(&self, section: &str) -> UiCommand {
        UiCommand::ScrollToElement {
            id: ElementId::from(section),
            offset_by: self.config.page.navbar_id.clone(),
            margin_px: self.config.navigation.scroll_margin_px,
        }
    }

    pub(crate) fn on_scrolled(&mut self, scroll_y: f64, reaction: &mut Reaction) {
        self.state.scroll_y = scroll_y;
        if let Some(pending) = self.state.pending_scroll.take() {
            self.cancel_timer(pending);
        }
        let debounce_ms = self.config.navigation.scroll_debounce_ms;
        let timer = self.schedule(debounce_ms, TimerAction::ScrollSettled, reaction);
        self.state.pending_scroll = Some(timer);
    }

    pub(crate) fn on_scroll_settled(&mut self, timer: shared::protocol::TimerId, reaction: &mut Reaction) {
        if self.state.pending_scroll == Some(timer) {
            self.state.pending_scroll = None;
        }
        let navbar = Target::Id(self.config.page.navbar_id.clone());
        let scrolled = self.state.scroll_y > self.config.navigation.scroll_threshold_px;
        let (background, shadow) = if scrolled {
            (SCROLLED_BACKGROUND, SCROLLED_SHADOW)
        } else {
            (TOP_BACKGROUND, "none")
        };
        reaction.push(UiCommand::SetStyle {
            target: navbar.clone(),
            property: "background".into(),
            value: background.into(),
        });
        reaction.push(UiCommand::SetStyle {
            target: navbar,
            property: "box-shadow".into(),
            value: shadow.into(),
        });
    }

    pub(crate) fn on_cta(&mut self, action: &str, reaction: &mut Reaction) {
        match action {
            "quote" => reaction.push(self.scroll_command("contact")),
            "calculator" => reaction.push(self.scroll_command("calculator")),
            "phone" => reaction.push(UiCommand::Navigate {
                href: self.config.page.phone_href.clone(),
            }),
            other => {
                warn!(action = other, "unknown CTA action");
                return;
            }
        }
        debug!(action, "cta handled");
    }
}
