//! Page-side logic of the anemia risk form: session guard, tab switching,
//! form coercion and the predict request/response cycle.
//!
//! The DOM is modelled by [`dom::Document`]; storage, navigation and alerts
//! come from a [`host::Host`]; the backend is reached through a
//! [`transport::Transport`].

pub mod coerce;
pub mod dom;
pub mod host;
pub mod login;
pub mod page;
pub mod payload;
pub mod predict;
pub mod session;
pub mod tabs;
pub mod transport;

#[cfg(test)]
mod testing;

pub use page::{ClickOutcome, Page};
pub use payload::{PredictionRequest, PredictionResult, FIELD_NAMES};
pub use predict::{PredictError, PredictOutcome, Rendering};
pub use session::SessionState;
