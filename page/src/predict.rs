use std::sync::{Mutex, RwLock};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::coerce::js_string;
use crate::dom::{Document, LABEL_OUTPUT, PREDICT_BUTTON, PROB_OUTPUT, SCORE_OUTPUT};
use crate::host::Host;
use crate::payload::{PredictionRequest, PredictionResult};
use crate::transport::{Transport, TransportError, PREDICT_PATH};

/// Shown in a result slot when the backend sent no value.
pub const PLACEHOLDER: &str = "—";

pub const COLOR_HIGH: &str = "#ef4444";
pub const COLOR_MODERATE: &str = "#f59e0b";
pub const COLOR_LOW: &str = "#22c55e";

pub const CONNECT_ALERT: &str = "No se pudo conectar al servidor.";
pub const DECODE_ALERT: &str = "Error inesperado procesando respuesta del servidor.";
pub const BACKEND_ALERT_PREFIX: &str = "⚠️ Error: ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredictState {
    Idle,
    BuildingPayload,
    AwaitingResponse,
    RenderingResult,
    RenderingError,
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("could not reach the backend: {0}")]
    Transport(String),
    #[error("could not decode the backend response: {0}")]
    Decode(String),
    #[error("backend rejected the request: {0}")]
    Backend(String),
}

impl PredictError {
    pub fn alert_message(&self) -> String {
        match self {
            PredictError::Transport(_) => CONNECT_ALERT.to_string(),
            PredictError::Decode(_) => DECODE_ALERT.to_string(),
            PredictError::Backend(msg) => format!("{}{}", BACKEND_ALERT_PREFIX, msg),
        }
    }
}

impl From<TransportError> for PredictError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connect { .. } => PredictError::Transport(err.to_string()),
            TransportError::Body { .. } => PredictError::Decode(err.to_string()),
        }
    }
}

#[derive(Debug)]
pub enum PredictOutcome {
    Rendered(Rendering),
    Failed(PredictError),
    /// A request was already in flight; the activation was dropped.
    Ignored,
}

/// Text and colour written into the result slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendering {
    pub score: String,
    pub label: String,
    pub prob: String,
    pub color: &'static str,
}

impl Rendering {
    pub fn from_result(result: &PredictionResult) -> Self {
        Self {
            score: format_score(result.score),
            label: result
                .label
                .clone()
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            prob: format_prob(result.prob),
            color: label_color(result.label.as_deref()),
        }
    }

    pub fn apply(&self, doc: &mut Document) {
        doc.set_text(SCORE_OUTPUT, &self.score);
        doc.set_text(LABEL_OUTPUT, &self.label);
        doc.set_text(PROB_OUTPUT, &self.prob);
        if let Some(el) = doc.select_mut(LABEL_OUTPUT) {
            el.color = Some(self.color.to_string());
        }
    }
}

pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) => js_string(s),
        None => PLACEHOLDER.to_string(),
    }
}

/// Whole percent, rounding halves up. Zero reads as "no probability".
pub fn format_prob(prob: Option<f64>) -> String {
    match prob {
        Some(p) if p != 0.0 && !p.is_nan() => {
            let pct = (p * 100.0 + 0.5).floor();
            format!("{}%", pct)
        }
        _ => PLACEHOLDER.to_string(),
    }
}

pub fn label_color(label: Option<&str>) -> &'static str {
    match label {
        Some("Alto") => COLOR_HIGH,
        Some("Moderado") => COLOR_MODERATE,
        _ => COLOR_LOW,
    }
}

/// Parses a response body and splits off backend-reported errors.
pub fn decode_response(body: &str) -> Result<PredictionResult, PredictError> {
    let result: PredictionResult =
        serde_json::from_str(body).map_err(|e| PredictError::Decode(e.to_string()))?;
    if let Some(err) = result.backend_error() {
        return Err(PredictError::Backend(err.to_string()));
    }
    Ok(result)
}

/// The predict button's request/response cycle. One cycle at a time: an
/// activation while a request is in flight is ignored and the button stays
/// disabled until the cycle ends.
pub struct PredictFlow {
    state: Mutex<PredictState>,
}

impl Default for PredictFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictFlow {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PredictState::Idle),
        }
    }

    pub fn state(&self) -> PredictState {
        *self.state.lock().expect("predict state lock poisoned")
    }

    fn set_state(&self, next: PredictState) {
        *self.state.lock().expect("predict state lock poisoned") = next;
    }

    fn try_begin(&self) -> bool {
        let mut state = self.state.lock().expect("predict state lock poisoned");
        if *state != PredictState::Idle {
            return false;
        }
        *state = PredictState::BuildingPayload;
        true
    }

    pub async fn run<H, T>(&self, document: &RwLock<Document>, host: &H, transport: &T) -> PredictOutcome
    where
        H: Host + ?Sized,
        T: Transport,
    {
        if !self.try_begin() {
            warn!("[anemia-page] Prediction already in flight, ignoring click");
            return PredictOutcome::Ignored;
        }

        let _cycle = CycleGuard {
            flow: self,
            document,
        };

        let request = {
            let mut doc = document.write().expect("document lock poisoned");
            if let Some(button) = doc.select_mut(PREDICT_BUTTON) {
                button.disabled = true;
            }
            PredictionRequest::from_document(&doc)
        };

        let outcome = match self.exchange(&request, transport).await {
            Ok(result) => {
                self.set_state(PredictState::RenderingResult);
                let rendering = Rendering::from_result(&result);
                rendering.apply(&mut document.write().expect("document lock poisoned"));
                PredictOutcome::Rendered(rendering)
            }
            Err(err) => {
                self.set_state(PredictState::RenderingError);
                error!("[anemia-page] Prediction failed: {}", err);
                host.alert(&err.alert_message());
                PredictOutcome::Failed(err)
            }
        };

        outcome
    }

    async fn exchange<T: Transport>(
        &self,
        request: &PredictionRequest,
        transport: &T,
    ) -> Result<PredictionResult, PredictError> {
        let body =
            serde_json::to_string(request).map_err(|e| PredictError::Transport(e.to_string()))?;
        info!("[anemia-page] Sending payload to backend: {}", body);

        self.set_state(PredictState::AwaitingResponse);
        let response = transport.post_json(PREDICT_PATH, body).await?;

        let result = decode_response(&response)?;
        info!("[anemia-page] Backend response: {:?}", result);
        Ok(result)
    }
}

/// Ends a predict cycle when dropped, so a cancelled request still
/// re-enables the button and returns the flow to idle.
struct CycleGuard<'a> {
    flow: &'a PredictFlow,
    document: &'a RwLock<Document>,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        let mut doc = self
            .document
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(button) = doc.select_mut(PREDICT_BUTTON) {
            button.disabled = false;
        }
        *self
            .flow
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = PredictState::Idle;
    }
}
