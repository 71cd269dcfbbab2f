use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, error};

use crate::dom::{Document, NodeId, PREDICT_BUTTON, TAB_SELECTOR};
use crate::host::Host;
use crate::predict::{PredictFlow, PredictOutcome};
use crate::session::{self, SessionState};
use crate::tabs::{self, TabError};
use crate::transport::Transport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binding {
    ActivateTab,
    Predict,
}

#[derive(Debug)]
pub enum ClickOutcome {
    /// No handler is bound to the element.
    Unbound,
    Tab(Result<NodeId, TabError>),
    Predict(PredictOutcome),
}

/// The prediction page: a document plus the host and backend it talks to.
///
/// [`Page::init`] plays the role of the page load: it runs the session
/// guard and binds the tab and predict handlers. Clicks are dispatched
/// through [`Page::click`].
pub struct Page<H, T> {
    document: RwLock<Document>,
    host: H,
    transport: T,
    bindings: RwLock<HashMap<NodeId, Binding>>,
    predict: PredictFlow,
}

impl<H: Host, T: Transport> Page<H, T> {
    pub fn new(document: Document, host: H, transport: T) -> Self {
        Self {
            document: RwLock::new(document),
            host,
            transport,
            bindings: RwLock::new(HashMap::new()),
            predict: PredictFlow::new(),
        }
    }

    /// Runs the session guard, then binds handlers. A redirect does not stop
    /// the bindings from being registered. Calling it again re-checks the
    /// session and leaves one binding per element.
    pub fn init(&self) -> SessionState {
        let session = session::guard(&self.host);

        let doc = self.document.read().expect("document lock poisoned");
        let mut bindings = self.bindings.write().expect("bindings lock poisoned");
        for tab in doc.query_selector_all(TAB_SELECTOR) {
            bindings.insert(tab, Binding::ActivateTab);
        }
        match doc.query_selector(PREDICT_BUTTON) {
            Some(button) => {
                bindings.insert(button, Binding::Predict);
            }
            None => error!("[anemia-page] {} not found, predictions disabled", PREDICT_BUTTON),
        }
        debug!("[anemia-page] {} handlers bound", bindings.len());

        session
    }

    pub async fn click(&self, node: NodeId) -> ClickOutcome {
        let binding = self
            .bindings
            .read()
            .expect("bindings lock poisoned")
            .get(&node)
            .copied();

        match binding {
            None => ClickOutcome::Unbound,
            Some(Binding::ActivateTab) => {
                let result = tabs::activate_tab(&mut self.document_mut(), node);
                if let Err(ref e) = result {
                    error!("[anemia-page] Tab activation failed: {}", e);
                }
                ClickOutcome::Tab(result)
            }
            Some(Binding::Predict) => ClickOutcome::Predict(
                self.predict
                    .run(&self.document, &self.host, &self.transport)
                    .await,
            ),
        }
    }

    pub async fn click_selector(&self, selector: &str) -> ClickOutcome {
        let node = self.document().query_selector(selector);
        match node {
            Some(node) => self.click(node).await,
            None => ClickOutcome::Unbound,
        }
    }

    pub fn bindings(&self) -> usize {
        self.bindings.read().expect("bindings lock poisoned").len()
    }

    pub fn document(&self) -> RwLockReadGuard<'_, Document> {
        self.document.read().expect("document lock poisoned")
    }

    pub fn document_mut(&self) -> RwLockWriteGuard<'_, Document> {
        self.document.write().expect("document lock poisoned")
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn predict_flow(&self) -> &PredictFlow {
        &self.predict
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::Notify;

    use super::*;
    use crate::dom::{LABEL_OUTPUT, PROB_OUTPUT, SCORE_OUTPUT, SCREEN_SELECTOR};
    use crate::host::MemoryHost;
    use crate::predict::{PredictState, COLOR_HIGH};
    use crate::session::{LOGIN_PAGE, ROLE_KEY};
    use crate::testing::{Reply, ScriptedTransport};

    const HIGH_RISK: &str = r#"{"score":0.82,"label":"Alto","prob":0.73}"#;

    fn signed_in_page(reply: Reply) -> Page<MemoryHost, ScriptedTransport> {
        Page::new(
            Document::prediction_page(),
            MemoryHost::new().with_item(ROLE_KEY, "medico"),
            ScriptedTransport::new(reply),
        )
    }

    #[test]
    fn missing_session_redirects_before_any_request() {
        let page = Page::new(
            Document::prediction_page(),
            MemoryHost::new(),
            ScriptedTransport::new(Reply::body(HIGH_RISK)),
        );

        assert_eq!(page.init(), SessionState::Redirected);

        assert_eq!(page.host().navigations(), vec![LOGIN_PAGE.to_string()]);
        assert!(page.transport().requests().is_empty());
        // Handlers are still registered after the redirect request.
        assert_eq!(page.bindings(), 4);
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let page = signed_in_page(Reply::body(HIGH_RISK));
        page.init();
        page.init();
        assert_eq!(page.bindings(), 4);

        page.click_selector(PREDICT_BUTTON).await;
        assert_eq!(page.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn nothing_is_bound_before_init() {
        let page = signed_in_page(Reply::body(HIGH_RISK));
        assert!(matches!(
            page.click_selector(PREDICT_BUTTON).await,
            ClickOutcome::Unbound
        ));
        assert!(page.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn tab_click_switches_screens() {
        let page = signed_in_page(Reply::body(HIGH_RISK));
        page.init();

        let outcome = page.click_selector("#tab-2").await;

        assert!(matches!(outcome, ClickOutcome::Tab(Ok(_))));
        let doc = page.document();
        assert_eq!(doc.active_ids(TAB_SELECTOR), vec!["tab-2".to_string()]);
        assert_eq!(doc.active_ids(SCREEN_SELECTOR), vec!["screen-2".to_string()]);
    }

    #[tokio::test]
    async fn predict_click_renders_result() {
        let page = signed_in_page(Reply::body(HIGH_RISK));
        page.init();
        page.document_mut().set_input_value("child_age_months", "24");

        let outcome = page.click_selector(PREDICT_BUTTON).await;

        assert!(matches!(outcome, ClickOutcome::Predict(PredictOutcome::Rendered(_))));
        let doc = page.document();
        assert_eq!(doc.text(SCORE_OUTPUT), Some("0.82"));
        assert_eq!(doc.text(LABEL_OUTPUT), Some("Alto"));
        assert_eq!(doc.text(PROB_OUTPUT), Some("73%"));
        assert_eq!(doc.select(LABEL_OUTPUT).unwrap().color.as_deref(), Some(COLOR_HIGH));
    }

    #[tokio::test]
    async fn second_click_while_in_flight_is_ignored() {
        let gate = Arc::new(Notify::new());
        let page = Page::new(
            Document::prediction_page(),
            MemoryHost::new().with_item(ROLE_KEY, "medico"),
            ScriptedTransport::gated(Reply::body(HIGH_RISK), gate.clone()),
        );
        page.init();

        let (first, second, _) = tokio::join!(
            page.click_selector(PREDICT_BUTTON),
            async {
                let outcome = page.click_selector(PREDICT_BUTTON).await;
                assert!(page.document().select(PREDICT_BUTTON).unwrap().disabled);
                assert_eq!(page.predict_flow().state(), PredictState::AwaitingResponse);
                outcome
            },
            async { gate.notify_one() },
        );

        assert!(matches!(first, ClickOutcome::Predict(PredictOutcome::Rendered(_))));
        assert!(matches!(second, ClickOutcome::Predict(PredictOutcome::Ignored)));
        assert_eq!(page.transport().requests().len(), 1);
        assert!(!page.document().select(PREDICT_BUTTON).unwrap().disabled);
        assert_eq!(page.predict_flow().state(), PredictState::Idle);
    }
}
