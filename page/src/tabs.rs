use thiserror::Error;

use crate::dom::{Document, NodeId, ACTIVE_CLASS, SCREEN_SELECTOR, TAB_SELECTOR};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TabError {
    #[error("element is not part of the document")]
    UnknownTab,
    #[error("tab has no data-target attribute")]
    MissingTarget,
    #[error("no panel matches {0}")]
    PanelNotFound(String),
}

/// Makes `tab` the single active tab and shows its `data-target` panel.
///
/// All tabs and screens are cleared before the target is resolved, so a
/// dangling target leaves no screen active.
pub fn activate_tab(doc: &mut Document, tab: NodeId) -> Result<NodeId, TabError> {
    let target = doc
        .get(tab)
        .ok_or(TabError::UnknownTab)?
        .dataset("target")
        .map(str::to_string);

    for node in doc.query_selector_all(TAB_SELECTOR) {
        if let Some(el) = doc.get_mut(node) {
            el.remove_class(ACTIVE_CLASS);
        }
    }
    if let Some(el) = doc.get_mut(tab) {
        el.add_class(ACTIVE_CLASS);
    }

    for node in doc.query_selector_all(SCREEN_SELECTOR) {
        if let Some(el) = doc.get_mut(node) {
            el.remove_class(ACTIVE_CLASS);
        }
    }

    let target = target.ok_or(TabError::MissingTarget)?;
    let panel = doc
        .query_selector(&target)
        .ok_or_else(|| TabError::PanelNotFound(target.clone()))?;
    if let Some(el) = doc.get_mut(panel) {
        el.add_class(ACTIVE_CLASS);
    }
    Ok(panel)
}
