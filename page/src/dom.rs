use std::collections::HashMap;

use crate::payload::FIELD_NAMES;

/// Class that marks the selected tab and its visible panel.
pub const ACTIVE_CLASS: &str = "active";

pub const PREDICT_BUTTON: &str = "#btn-predict";
pub const SCORE_OUTPUT: &str = "#res-score";
pub const LABEL_OUTPUT: &str = "#res-label";
pub const PROB_OUTPUT: &str = "#res-prob";
pub const TAB_SELECTOR: &str = ".tab";
pub const SCREEN_SELECTOR: &str = ".screen";

/// Index of an element inside a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Debug, Default)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    classes: Vec<String>,
    attributes: HashMap<String, String>,
    pub value: String,
    pub text_content: String,
    pub color: Option<String>,
    pub disabled: bool,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// `data-*` attribute lookup, e.g. `dataset("target")` reads `data-target`.
    pub fn dataset(&self, key: &str) -> Option<&str> {
        self.attr(&format!("data-{}", key))
    }

    fn matches(&self, selector: &Selector<'_>) -> bool {
        match selector {
            Selector::Id(id) => self.id.as_deref() == Some(*id),
            Selector::Class(class) => self.has_class(class),
            Selector::Tag(tag) => self.tag.eq_ignore_ascii_case(tag),
        }
    }
}

enum Selector<'a> {
    Id(&'a str),
    Class(&'a str),
    Tag(&'a str),
}

impl<'a> Selector<'a> {
    fn parse(raw: &'a str) -> Option<Self> {
        let raw = raw.trim();
        if let Some(id) = raw.strip_prefix('#') {
            (!id.is_empty()).then_some(Selector::Id(id))
        } else if let Some(class) = raw.strip_prefix('.') {
            (!class.is_empty()).then_some(Selector::Class(class))
        } else if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            Some(Selector::Tag(raw))
        } else {
            None
        }
    }
}

/// Flat in-memory document: the markup the page logic reads from and
/// renders into. Supports `#id`, `.class` and bare tag selectors.
#[derive(Clone, Debug, Default)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markup of the prediction page: three tabs/screens (the first one
    /// active), one input per request field, the predict button and the
    /// three result slots.
    pub fn prediction_page() -> Self {
        let mut doc = Self::new();
        for n in 1..=3 {
            let mut tab = Element::new("button")
                .with_id(format!("tab-{}", n))
                .with_class("tab")
                .with_attr("data-target", format!("#screen-{}", n));
            let mut screen = Element::new("section")
                .with_id(format!("screen-{}", n))
                .with_class("screen");
            if n == 1 {
                tab.add_class(ACTIVE_CLASS);
                screen.add_class(ACTIVE_CLASS);
            }
            doc.append(tab);
            doc.append(screen);
        }
        for name in FIELD_NAMES {
            doc.append(Element::new("input").with_id(name));
        }
        doc.append(Element::new("button").with_id("btn-predict"));
        doc.append(Element::new("span").with_id("res-score"));
        doc.append(Element::new("span").with_id("res-label"));
        doc.append(Element::new("span").with_id("res-prob"));
        doc
    }

    pub fn append(&mut self, element: Element) -> NodeId {
        self.elements.push(element);
        NodeId(self.elements.len() - 1)
    }

    pub fn get(&self, node: NodeId) -> Option<&Element> {
        self.elements.get(node.0)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.elements.get_mut(node.0)
    }

    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        let selector = Selector::parse(selector)?;
        self.elements
            .iter()
            .position(|e| e.matches(&selector))
            .map(NodeId)
    }

    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.matches(&selector))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    pub fn select(&self, selector: &str) -> Option<&Element> {
        self.query_selector(selector).and_then(|n| self.get(n))
    }

    pub fn select_mut(&mut self, selector: &str) -> Option<&mut Element> {
        let node = self.query_selector(selector)?;
        self.get_mut(node)
    }

    /// Current `value` of the element with the given id, `None` if the
    /// element does not exist.
    pub fn input_value(&self, id: &str) -> Option<&str> {
        self.select(&format!("#{}", id)).map(|e| e.value.as_str())
    }

    pub fn set_input_value(&mut self, id: &str, value: &str) -> bool {
        match self.select_mut(&format!("#{}", id)) {
            Some(el) => {
                el.value = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn text(&self, selector: &str) -> Option<&str> {
        self.select(selector).map(|e| e.text_content.as_str())
    }

    pub fn set_text(&mut self, selector: &str, text: &str) {
        if let Some(el) = self.select_mut(selector) {
            el.text_content = text.to_string();
        }
    }

    /// Ids of the elements under `selector` that carry the active class.
    pub fn active_ids(&self, selector: &str) -> Vec<String> {
        self.query_selector_all(selector)
            .into_iter()
            .filter_map(|n| self.get(n))
            .filter(|e| e.has_class(ACTIVE_CLASS))
            .filter_map(|e| e.id.clone())
            .collect()
    }
}
