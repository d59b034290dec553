//! The landing page markup as an in-memory tree, laid out for a 1280x800 viewport.

use shared::domain::FieldKind;

use super::{Document, Element, Rect, Viewport};
use crate::{calculator, config::SiteConfig};

const WIDTH: f64 = 1280.0;
const NAV_HEIGHT: f64 = 72.0;

struct Builder {
    doc: Document,
}

impl Builder {
    fn add(&mut self, parent: Option<usize>, element: Element) -> usize {
        self.doc.attach(parent.unwrap_or(super::BODY), element, None)
    }
}

fn section(id: &str, top: f64, height: f64) -> Element {
    Element::new("section")
        .with_id(id)
        .with_rect(Rect::new(top, 0.0, WIDTH, height))
}

fn block(tag: &str, class: &str, top: f64, height: f64) -> Element {
    Element::new(tag)
        .with_class(class)
        .with_rect(Rect::new(top, 40.0, 360.0, height))
}

/// Builds the page the controller is written against, with form controls taken from the
/// configured field rules.
pub fn landing_page(config: &SiteConfig) -> Document {
    let mut b = Builder {
        doc: Document::new(Viewport {
            width: WIDTH,
            height: 800.0,
        }),
    };
    let page = &config.page;

    let navbar = b.add(
        None,
        Element::new("nav")
            .with_id(page.navbar_id.as_str())
            .with_rect(Rect::new(0.0, 0.0, WIDTH, NAV_HEIGHT)),
    );
    b.add(
        Some(navbar),
        Element::new("button")
            .with_id(page.nav_toggle_id.as_str())
            .with_class("nav-toggle"),
    );
    let menu = b.add(
        Some(navbar),
        Element::new("ul")
            .with_id(page.nav_menu_id.as_str())
            .with_class("nav-menu"),
    );
    for target in ["calculator", "benefits", "contact"] {
        b.add(
            Some(menu),
            Element::new("a")
                .with_class("nav-link")
                .with_attr("href", format!("#{target}")),
        );
    }

    let main = b.add(
        None,
        Element::new("main").with_id(page.main_content_id.as_str()),
    );
    b.add(Some(main), section("hero", 0.0, 800.0));

    let credentials = b.add(Some(main), section("credentials", 800.0, 500.0));
    for (i, target) in ["100000", "25", "50"].into_iter().enumerate() {
        let top = 900.0 + i as f64 * 120.0;
        let card = b.add(
            Some(credentials),
            block("div", "credential-card", top, 110.0).with_id(format!("credentialCard{}", i + 1)),
        );
        b.add(
            Some(card),
            Element::new("span")
                .with_id(format!("credential{}", i + 1))
                .with_class("credential-number")
                .with_attr("data-target", target)
                .with_text("0")
                .with_rect(Rect::new(top + 10.0, 60.0, 200.0, 60.0)),
        );
    }

    let calc = b.add(Some(main), section("calculator", 1300.0, 700.0));
    for size in 1..=3u8 {
        let mut button = Element::new("button")
            .with_id(format!("size{size}"))
            .with_class("size-btn")
            .with_attr("data-size", size.to_string());
        if config.calculator.default_tier.0 == size {
            button = button.with_class("active");
        }
        b.add(Some(calc), button);
    }
    for id in [
        calculator::PRODUCTION_ID,
        calculator::SAVINGS_ID,
        calculator::TOTAL_SAVINGS_ID,
        calculator::CO2_ID,
    ] {
        b.add(Some(calc), Element::new("span").with_id(id).with_class("result-value"));
    }

    let benefits = b.add(Some(main), section("benefits", 2000.0, 600.0));
    b.add(Some(benefits), block("div", "benefit-card", 2050.0, 200.0).with_id("benefitSavings"));
    b.add(Some(benefits), block("div", "feature-card", 2050.0, 200.0).with_id("featureWarranty"));
    b.add(Some(benefits), block("div", "diagram-step", 2300.0, 200.0).with_id("stepInstall"));
    b.add(
        Some(benefits),
        Element::new("img")
            .with_id("installPhoto")
            .with_class("lazy")
            .with_attr("data-src", "/images/rooftop-install.webp")
            .with_rect(Rect::new(2350.0, 600.0, 480.0, 220.0)),
    );

    let contact = b.add(Some(main), section("contact", 2600.0, 900.0));
    let form = b.add(
        Some(contact),
        Element::new("form").with_id(config.form.form_id.as_str()),
    );
    for rule in &config.form.fields {
        let mut control = match rule.kind {
            FieldKind::Text => Element::new("input").with_attr("type", "text"),
            FieldKind::Email => Element::new("input").with_attr("type", "email"),
            FieldKind::Tel => Element::new("input").with_attr("type", "tel"),
            FieldKind::Select => Element::new("select"),
            FieldKind::Other => Element::new("textarea"),
        }
        .with_id(rule.id.as_str());
        if rule.required {
            control = control.with_attr("required", "");
        }
        b.add(Some(form), control);
        b.add(
            Some(form),
            Element::new("div")
                .with_id(rule.id.error_element().as_str())
                .with_class("form-error"),
        );
    }
    b.add(
        Some(form),
        Element::new("button")
            .with_id("submitButton")
            .with_class("btn")
            .with_attr("type", "submit"),
    );
    b.add(
        Some(form),
        Element::new("div")
            .with_id(config.form.status_id.as_str())
            .with_class("form-status")
            .with_attr("role", "alert"),
    );

    let modal = b.add(
        None,
        Element::new("div")
            .with_id(config.form.success_modal_id.as_str())
            .with_class("modal"),
    );
    b.add(
        Some(modal),
        Element::new("button")
            .with_id("successModalClose")
            .with_class("modal-close"),
    );

    b.doc
}
