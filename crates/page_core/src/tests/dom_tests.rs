use super::*;
use crate::SiteConfig;

fn page() -> Document {
    landing_page(&SiteConfig::builtin().expect("builtin config"))
}

#[test]
fn ratio_is_share_of_element_inside_root() {
    let root = Rect::new(0.0, 0.0, 100.0, 100.0);
    assert_eq!(intersection_ratio(Rect::new(0.0, 0.0, 50.0, 50.0), root), 1.0);
    assert_eq!(intersection_ratio(Rect::new(75.0, 0.0, 100.0, 50.0), root), 0.5);
    assert_eq!(intersection_ratio(Rect::new(200.0, 0.0, 10.0, 10.0), root), 0.0);
    assert_eq!(intersection_ratio(Rect::new(10.0, 10.0, 0.0, 0.0), root), 1.0);
}

#[test]
fn root_margin_accepts_css_shorthand() {
    assert_eq!(
        Margins::parse("0px 0px -100px 0px"),
        Margins {
            top: 0.0,
            right: 0.0,
            bottom: -100.0,
            left: 0.0
        }
    );
    assert_eq!(Margins::parse("10px").bottom, 10.0);
    assert_eq!(Margins::parse("auto"), Margins::default());
}

#[test]
fn commands_on_missing_elements_touch_nothing() {
    let mut doc = page();
    let touched = doc
        .apply(&UiCommand::SetText {
            target: Target::id("doesNotExist"),
            text: "x".into(),
        })
        .expect("apply");
    assert_eq!(touched, 0);
}

#[test]
fn clearing_an_error_twice_equals_clearing_once() {
    let field = shared::domain::FieldId::from("email");
    let mut once = page();
    let mut twice = page();
    for command in crate::form::show_error(&field, "Email is required") {
        once.apply(&command).expect("apply");
        twice.apply(&command).expect("apply");
    }
    for command in crate::form::clear_error(&field) {
        once.apply(&command).expect("apply");
        twice.apply(&command).expect("apply");
    }
    for command in crate::form::clear_error(&field) {
        twice.apply(&command).expect("apply");
    }

    let once_json = serde_json::to_value(once.snapshot()).expect("snapshot");
    let twice_json = serde_json::to_value(twice.snapshot()).expect("snapshot");
    assert_eq!(once_json, twice_json);
    assert_eq!(once.text("emailError"), Some(""));
    assert_eq!(once.style("emailError", "display"), Some("none"));
}

#[test]
fn within_target_picks_first_match_inside_container() {
    let mut doc = page();
    doc.apply(&UiCommand::Focus {
        target: Target::Within {
            container: ElementId::from("successModal"),
            selector: ".modal-close".into(),
        },
    })
    .expect("focus");
    assert_eq!(
        doc.focused().and_then(|el| el.id.as_ref()).map(ElementId::as_str),
        Some("successModalClose")
    );
}

#[test]
fn reset_form_clears_only_its_controls() {
    let mut doc = page();
    assert!(doc.set_value("email", "a@b.co"));
    assert!(doc.set_value("message", "call after 6pm"));
    assert!(!doc.set_value("nope", "x"));

    let touched = doc
        .apply(&UiCommand::ResetForm {
            form: ElementId::from("contactForm"),
        })
        .expect("reset");
    assert_eq!(touched, 6);
    assert_eq!(doc.value("email"), Some(""));
    assert_eq!(doc.value("message"), Some(""));
}

#[test]
fn scroll_to_element_leaves_room_for_navbar() {
    let mut doc = page();
    doc.apply(&UiCommand::ScrollToElement {
        id: ElementId::from("calculator"),
        offset_by: ElementId::from("navbar"),
        margin_px: 20.0,
    })
    .expect("scroll");
    assert_eq!(doc.scroll_y(), 1300.0 - 72.0 - 20.0);
}

#[test]
fn inserted_elements_land_at_body_edges() {
    let mut doc = page();
    doc.apply(&UiCommand::InsertElement {
        element: NewElement {
            tag: "a".into(),
            id: Some(ElementId::from("skipLink")),
            ..NewElement::default()
        },
        position: InsertPosition::BodyStart,
    })
    .expect("insert");

    let snapshot = doc.snapshot();
    assert_eq!(snapshot.elements[0].tag, "body");
    assert_eq!(
        snapshot.elements[1].id.as_ref().map(ElementId::as_str),
        Some("skipLink")
    );

    let err = doc
        .apply(&UiCommand::InsertElement {
            element: NewElement::default(),
            position: InsertPosition::LastChildOf(ElementId::from("ghost")),
        })
        .expect_err("unknown parent");
    assert_eq!(err, DomError::UnknownParent(ElementId::from("ghost")));
}

#[test]
fn observers_report_changes_only() {
    let mut doc = page();
    doc.apply(&UiCommand::Observe {
        observer: ObserverKind::Counters,
        selector: ".credential-number".into(),
        options: ObserverOptions {
            threshold: 0.5,
            root_margin: "0px 0px -100px 0px".into(),
        },
    })
    .expect("observe");

    // Initial callback reports every target, none visible at the top of the page.
    let initial = doc.take_intersections();
    let [PageEvent::Intersected { entries, .. }] = initial.as_slice() else {
        panic!("expected one intersection event, got {initial:?}");
    };
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|entry| !entry.is_intersecting));
    assert!(doc.take_intersections().is_empty());

    doc.scroll_to(600.0);
    let events = doc.take_intersections();
    let [PageEvent::Intersected { entries, .. }] = events.as_slice() else {
        panic!("expected one intersection event, got {events:?}");
    };
    assert!(entries.iter().all(|entry| entry.is_intersecting));
    assert_eq!(
        entries[0].dataset.get("target").map(String::as_str),
        Some("100000")
    );
}

#[test]
fn unobserved_elements_stop_reporting() {
    let mut doc = page();
    doc.apply(&UiCommand::Observe {
        observer: ObserverKind::LazyImages,
        selector: "img[data-src]".into(),
        options: ObserverOptions {
            threshold: 0.0,
            root_margin: "0px".into(),
        },
    })
    .expect("observe");
    doc.take_intersections();

    let removed = doc
        .apply(&UiCommand::Unobserve {
            observer: ObserverKind::LazyImages,
            id: ElementId::from("installPhoto"),
        })
        .expect("unobserve");
    assert_eq!(removed, 1);

    doc.scroll_to(2000.0);
    assert!(doc.take_intersections().is_empty());
}
