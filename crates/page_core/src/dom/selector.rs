//! The small selector subset the page uses: `tag`, `#id`, `.class`, `[attr]`, `[attr="v"]`,
//! compounds of those, and comma-separated lists. No combinators.

use super::{DomError, Element};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attributes.is_empty()
    }

    pub(crate) fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id.as_ref().map(|own| own.as_str()) != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| element.classes.contains(class)) {
            return false;
        }
        self.attributes.iter().all(|(name, expected)| {
            match (element.attributes.get(name), expected) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorList(Vec<Compound>);

impl SelectorList {
    pub(crate) fn parse(raw: &str) -> Result<Self, DomError> {
        let compounds = raw
            .split(',')
            .map(parse_compound)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(compounds))
    }

    pub(crate) fn matches(&self, element: &Element) -> bool {
        self.0.iter().any(|compound| compound.matches(element))
    }
}

fn parse_compound(raw: &str) -> Result<Compound, DomError> {
    let unsupported = || DomError::UnsupportedSelector(raw.trim().to_string());
    let chars: Vec<char> = raw.trim().chars().collect();
    let mut i = 0;
    let mut compound = Compound::default();

    let tag = take_ident(&chars, &mut i);
    if !tag.is_empty() {
        compound.tag = Some(tag.to_ascii_lowercase());
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                i += 1;
                let id = take_ident(&chars, &mut i);
                if id.is_empty() {
                    return Err(unsupported());
                }
                compound.id = Some(id);
            }
            '.' => {
                i += 1;
                let class = take_ident(&chars, &mut i);
                if class.is_empty() {
                    return Err(unsupported());
                }
                compound.classes.push(class);
            }
            '[' => {
                i += 1;
                let name = take_ident(&chars, &mut i);
                if name.is_empty() {
                    return Err(unsupported());
                }
                let value = if chars.get(i) == Some(&'=') {
                    i += 1;
                    match chars.get(i).copied() {
                        Some(quote @ ('"' | '\'')) => {
                            i += 1;
                            let start = i;
                            while i < chars.len() && chars[i] != quote {
                                i += 1;
                            }
                            if i >= chars.len() {
                                return Err(unsupported());
                            }
                            let value: String = chars[start..i].iter().collect();
                            i += 1;
                            Some(value)
                        }
                        _ => Some(take_ident(&chars, &mut i)),
                    }
                } else {
                    None
                };
                if chars.get(i) != Some(&']') {
                    return Err(unsupported());
                }
                i += 1;
                compound.attributes.push((name, value));
            }
            _ => return Err(unsupported()),
        }
    }

    if compound.is_empty() {
        return Err(unsupported());
    }
    Ok(compound)
}

fn take_ident(chars: &[char], i: &mut usize) -> String {
    let start = *i;
    while *i < chars.len() && (chars[*i].is_alphanumeric() || chars[*i] == '-' || chars[*i] == '_') {
        *i += 1;
    }
    chars[start..*i].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(size: &str) -> Element {
        Element::new("button")
            .with_class("size-btn")
            .with_attr("data-size", size)
    }

    #[test]
    fn matches_class_and_attribute_value() {
        let list = SelectorList::parse(".size-btn[data-size=\"2\"]").expect("parse");
        assert!(list.matches(&button("2")));
        assert!(!list.matches(&button("3")));
    }

    #[test]
    fn matches_any_member_of_a_list() {
        let list = SelectorList::parse(".feature-card, .benefit-card").expect("parse");
        assert!(list.matches(&Element::new("div").with_class("benefit-card")));
        assert!(!list.matches(&Element::new("div").with_class("hero")));
    }

    #[test]
    fn matches_tag_with_attribute_presence() {
        let list = SelectorList::parse("img[data-src]").expect("parse");
        assert!(list.matches(&Element::new("img").with_attr("data-src", "/a.webp")));
        assert!(!list.matches(&Element::new("div").with_attr("data-src", "/a.webp")));
        assert!(!list.matches(&Element::new("img")));
    }

    #[test]
    fn rejects_descendant_combinators() {
        assert!(matches!(
            SelectorList::parse("#contactForm .form-error"),
            Err(DomError::UnsupportedSelector(_))
        ));
        assert!(SelectorList::parse("").is_err());
    }
}
