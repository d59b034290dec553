//! In-memory DOM adapter. Applies [`UiCommand`]s to a flat element tree and emulates the
//! bits of the browser the controller relies on: scrolling, focus, form reset and
//! intersection observers.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use shared::{
    domain::ElementId,
    protocol::{
        InsertPosition, IntersectionEntry, NewElement, ObserverKind, ObserverOptions, PageEvent,
        Target, UiCommand,
    },
};
use thiserror::Error;

mod fixture;
mod selector;

pub use fixture::landing_page;
use selector::SelectorList;

const BODY: usize = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("unsupported selector '{0}'")]
    UnsupportedSelector(String),
    #[error("no element with id '{0}'")]
    UnknownParent(ElementId),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Share of `element` inside `root`, in `0.0..=1.0`. Zero-area elements count as fully
/// visible when their origin lies inside the root.
pub fn intersection_ratio(element: Rect, root: Rect) -> f64 {
    let overlap_w = element.right().min(root.right()) - element.left.max(root.left);
    let overlap_h = element.bottom().min(root.bottom()) - element.top.max(root.top);
    let area = element.width * element.height;
    if area <= 0.0 {
        let inside = element.top >= root.top
            && element.top <= root.bottom()
            && element.left >= root.left
            && element.left <= root.right();
        return if inside { 1.0 } else { 0.0 };
    }
    if overlap_w <= 0.0 || overlap_h <= 0.0 {
        return 0.0;
    }
    (overlap_w * overlap_h / area).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Element {
    pub tag: String,
    pub id: Option<ElementId>,
    pub classes: BTreeSet<String>,
    pub attributes: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    pub text: String,
    pub value: String,
    pub disabled: bool,
    pub rect: Rect,
    #[serde(skip)]
    parent: Option<usize>,
    #[serde(skip)]
    children: Vec<usize>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: BTreeSet::new(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            text: String::new(),
            value: String::new(),
            disabled: false,
            rect: Rect::default(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(ElementId(id.into()));
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }

    /// `data-*` attributes with the prefix stripped.
    pub fn dataset(&self) -> BTreeMap<String, String> {
        self.attributes
            .iter()
            .filter_map(|(name, value)| {
                name.strip_prefix("data-")
                    .map(|key| (key.to_string(), value.clone()))
            })
            .collect()
    }

    fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "select" | "textarea")
    }
}

impl From<NewElement> for Element {
    fn from(new: NewElement) -> Self {
        let mut element = Element::new(new.tag);
        element.id = new.id;
        element.text = new.text;
        element.classes = new.classes.into_iter().collect();
        element.attributes = new.attributes;
        element.styles = new.styles;
        element
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Margins {
    top: f64,
    right: f64,
    bottom: f64,
    left: f64,
}

impl Margins {
    /// CSS shorthand with one to four `px` values; anything else means no margin.
    fn parse(raw: &str) -> Self {
        let values: Option<Vec<f64>> = raw
            .split_whitespace()
            .map(|part| part.trim_end_matches("px").parse::<f64>().ok())
            .collect();
        match values.as_deref() {
            Some([all]) => Self {
                top: *all,
                right: *all,
                bottom: *all,
                left: *all,
            },
            Some([vertical, horizontal]) => Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            },
            Some([top, horizontal, bottom]) => Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            },
            Some([top, right, bottom, left]) => Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            },
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone)]
struct Observation {
    kind: ObserverKind,
    threshold: f64,
    margins: Margins,
    targets: Vec<usize>,
    last_state: HashMap<usize, bool>,
}

#[derive(Debug, Serialize)]
pub struct DocumentSnapshot<'a> {
    pub scroll_y: f64,
    pub location: Option<&'a str>,
    pub focused: Option<&'a ElementId>,
    pub elements: Vec<&'a Element>,
}

#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
    focused: Option<usize>,
    location: Option<String>,
    scroll_y: f64,
    viewport: Viewport,
    observations: Vec<Observation>,
}

impl Document {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            elements: vec![Element::new("body")],
            focused: None,
            location: None,
            scroll_y: 0.0,
            viewport,
            observations: Vec::new(),
        }
    }

    /// Appends `element` under `parent` (the body when `None`).
    pub fn append(&mut self, parent: Option<&ElementId>, element: Element) -> Result<usize, DomError> {
        let parent = match parent {
            Some(id) => self
                .find(id.as_str())
                .ok_or_else(|| DomError::UnknownParent(id.clone()))?,
            None => BODY,
        };
        Ok(self.attach(parent, element, None))
    }

    fn attach(&mut self, parent: usize, mut element: Element, at: Option<usize>) -> usize {
        let idx = self.elements.len();
        element.parent = Some(parent);
        self.elements.push(element);
        let children = &mut self.elements[parent].children;
        match at {
            Some(pos) => children.insert(pos.min(children.len()), idx),
            None => children.push(idx),
        }
        idx
    }

    fn find(&self, id: &str) -> Option<usize> {
        self.elements
            .iter()
            .position(|el| el.id.as_ref().map(ElementId::as_str) == Some(id))
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.find(id).map(|idx| &self.elements[idx])
    }

    pub fn body(&self) -> &Element {
        &self.elements[BODY]
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.element(id).map(|el| el.text.as_str())
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.element(id).map(|el| el.value.as_str())
    }

    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    pub fn style(&self, id: &str, property: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.style(property))
    }

    pub fn focused(&self) -> Option<&Element> {
        self.focused.map(|idx| &self.elements[idx])
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Simulates user typing. Returns false when no such control exists.
    pub fn set_value(&mut self, id: &str, value: &str) -> bool {
        match self.find(id) {
            Some(idx) => {
                self.elements[idx].value = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Simulates the user scrolling the window.
    pub fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y.max(0.0);
    }

    pub fn query_all(&self, selector: &str) -> Result<Vec<&Element>, DomError> {
        Ok(self
            .query_indices(selector)?
            .into_iter()
            .map(|idx| &self.elements[idx])
            .collect())
    }

    fn document_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.elements.len());
        let mut stack = vec![BODY];
        while let Some(idx) = stack.pop() {
            order.push(idx);
            stack.extend(self.elements[idx].children.iter().rev());
        }
        order
    }

    fn query_indices(&self, selector: &str) -> Result<Vec<usize>, DomError> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .document_order()
            .into_iter()
            .filter(|&idx| list.matches(&self.elements[idx]))
            .collect())
    }

    fn is_descendant(&self, idx: usize, ancestor: usize) -> bool {
        let mut current = self.elements[idx].parent;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.elements[parent].parent;
        }
        false
    }

    fn resolve(&self, target: &Target) -> Result<Vec<usize>, DomError> {
        match target {
            Target::Id(id) => Ok(self.find(id.as_str()).into_iter().collect()),
            Target::All(selector) => self.query_indices(selector),
            Target::Within {
                container,
                selector,
            } => {
                let Some(container) = self.find(container.as_str()) else {
                    return Ok(Vec::new());
                };
                Ok(self
                    .query_indices(selector)?
                    .into_iter()
                    .find(|&idx| self.is_descendant(idx, container))
                    .into_iter()
                    .collect())
            }
            Target::Body => Ok(vec![BODY]),
        }
    }

    /// Applies one command and returns how many elements it touched. Missing targets are
    /// not an error; the page simply does not have them.
    pub fn apply(&mut self, command: &UiCommand) -> Result<usize, DomError> {
        match command {
            UiCommand::SetText { target, text } => {
                self.each(target, |el| el.text = text.clone())
            }
            UiCommand::SetStyle {
                target,
                property,
                value,
            } => self.each(target, |el| {
                el.styles.insert(property.clone(), value.clone());
            }),
            UiCommand::AddClass { target, class } => self.each(target, |el| {
                el.classes.insert(class.clone());
            }),
            UiCommand::RemoveClass { target, class } => self.each(target, |el| {
                el.classes.remove(class);
            }),
            UiCommand::SetAttribute {
                target,
                name,
                value,
            } => self.each(target, |el| {
                el.attributes.insert(name.clone(), value.clone());
            }),
            UiCommand::SetDisabled { target, disabled } => {
                self.each(target, |el| el.disabled = *disabled)
            }
            UiCommand::Focus { target } => {
                let first = self.resolve(target)?.into_iter().next();
                if first.is_some() {
                    self.focused = first;
                }
                Ok(usize::from(first.is_some()))
            }
            UiCommand::ResetForm { form } => {
                let Some(form) = self.find(form.as_str()) else {
                    return Ok(0);
                };
                let controls: Vec<usize> = (0..self.elements.len())
                    .filter(|&idx| self.elements[idx].is_form_control() && self.is_descendant(idx, form))
                    .collect();
                for &idx in &controls {
                    let element = &mut self.elements[idx];
                    element.value = element.attributes.get("value").cloned().unwrap_or_default();
                }
                Ok(controls.len())
            }
            UiCommand::ScrollToElement {
                id,
                offset_by,
                margin_px,
            } => {
                let Some(section) = self.element(id.as_str()).map(|el| el.rect) else {
                    return Ok(0);
                };
                let offset = self
                    .element(offset_by.as_str())
                    .map(|el| el.rect.height)
                    .unwrap_or_default();
                self.scroll_to(section.top - offset - margin_px);
                Ok(1)
            }
            UiCommand::Navigate { href } => {
                self.location = Some(href.clone());
                Ok(0)
            }
            UiCommand::InsertElement { element, position } => {
                let element = Element::from(element.clone());
                match position {
                    InsertPosition::BodyStart => self.attach(BODY, element, Some(0)),
                    InsertPosition::BodyEnd => self.attach(BODY, element, None),
                    InsertPosition::LastChildOf(parent) => {
                        let parent = self
                            .find(parent.as_str())
                            .ok_or_else(|| DomError::UnknownParent(parent.clone()))?;
                        self.attach(parent, element, None)
                    }
                };
                Ok(1)
            }
            UiCommand::Observe {
                observer,
                selector,
                options,
            } => {
                let targets = self.query_indices(selector)?;
                let count = targets.len();
                self.observe(*observer, options, targets);
                Ok(count)
            }
            UiCommand::Unobserve { observer, id } => {
                let Some(idx) = self.find(id.as_str()) else {
                    return Ok(0);
                };
                let mut removed = 0;
                for observation in self.observations.iter_mut().filter(|o| o.kind == *observer) {
                    let before = observation.targets.len();
                    observation.targets.retain(|&t| t != idx);
                    observation.last_state.remove(&idx);
                    removed += before - observation.targets.len();
                }
                Ok(removed)
            }
        }
    }

    fn each(&mut self, target: &Target, mut f: impl FnMut(&mut Element)) -> Result<usize, DomError> {
        let indices = self.resolve(target)?;
        for &idx in &indices {
            f(&mut self.elements[idx]);
        }
        Ok(indices.len())
    }

    fn observe(&mut self, kind: ObserverKind, options: &ObserverOptions, targets: Vec<usize>) {
        self.observations.push(Observation {
            kind,
            threshold: options.threshold,
            margins: Margins::parse(&options.root_margin),
            targets,
            last_state: HashMap::new(),
        });
    }

    /// Intersection changes since the last call, one event per observer with changes.
    /// Newly observed elements always report their first state.
    pub fn take_intersections(&mut self) -> Vec<PageEvent> {
        let viewport = self.viewport;
        let scroll_y = self.scroll_y;
        let elements = &self.elements;
        let mut events = Vec::new();

        for observation in &mut self.observations {
            let m = observation.margins;
            let root = Rect::new(
                scroll_y - m.top,
                -m.left,
                viewport.width + m.left + m.right,
                viewport.height + m.top + m.bottom,
            );

            let mut entries = Vec::new();
            for &idx in &observation.targets {
                let element = &elements[idx];
                let ratio = intersection_ratio(element.rect, root);
                let intersecting = ratio > 0.0 && ratio >= observation.threshold;
                if observation.last_state.insert(idx, intersecting) == Some(intersecting) {
                    continue;
                }
                let Some(id) = element.id.clone() else {
                    continue;
                };
                entries.push(IntersectionEntry {
                    id,
                    is_intersecting: intersecting,
                    intersection_ratio: ratio,
                    dataset: element.dataset(),
                });
            }

            if !entries.is_empty() {
                events.push(PageEvent::Intersected {
                    observer: observation.kind,
                    entries,
                });
            }
        }
        events
    }

    pub fn snapshot(&self) -> DocumentSnapshot<'_> {
        DocumentSnapshot {
            scroll_y: self.scroll_y,
            location: self.location.as_deref(),
            focused: self.focused().and_then(|el| el.id.as_ref()),
            elements: self
                .document_order()
                .into_iter()
                .map(|idx| &self.elements[idx])
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/dom_tests.rs"]
mod tests;
