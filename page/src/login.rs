use thiserror::Error;
use tracing::{error, info, warn};

use crate::host::Host;
use crate::payload::{LoginRequest, LoginResponse};
use crate::predict::{CONNECT_ALERT, DECODE_ALERT};
use crate::session::{HOME_PAGE, ROLE_KEY};
use crate::transport::{Transport, TransportError, LOGIN_PATH};

const REJECTED_FALLBACK: &str = "Credenciales incorrectas";

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("could not reach the backend: {0}")]
    Transport(String),
    #[error("could not decode the login response: {0}")]
    Decode(String),
}

impl LoginError {
    pub fn alert_message(&self) -> &'static str {
        match self {
            LoginError::Transport(_) => CONNECT_ALERT,
            LoginError::Decode(_) => DECODE_ALERT,
        }
    }
}

impl From<TransportError> for LoginError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connect { .. } => LoginError::Transport(err.to_string()),
            TransportError::Body { .. } => LoginError::Decode(err.to_string()),
        }
    }
}

#[derive(Debug)]
pub enum LoginOutcome {
    LoggedIn { role: String },
    Rejected(String),
    Failed(LoginError),
}

/// Exchanges credentials for a role. On success the role is stored under
/// [`ROLE_KEY`] and the host is sent to the home page.
pub async fn login<H, T>(host: &H, transport: &T, username: &str, password: &str) -> LoginOutcome
where
    H: Host + ?Sized,
    T: Transport,
{
    let request = LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    };
    let body = match serde_json::to_string(&request) {
        Ok(body) => body,
        Err(e) => return fail(host, LoginError::Transport(e.to_string())),
    };

    let response = match transport.post_json(LOGIN_PATH, body).await {
        Ok(text) => text,
        Err(e) => return fail(host, e.into()),
    };

    let parsed: LoginResponse = match serde_json::from_str(&response) {
        Ok(parsed) => parsed,
        Err(e) => return fail(host, LoginError::Decode(e.to_string())),
    };

    match (parsed.status.as_str(), parsed.role) {
        ("ok", Some(role)) if !role.is_empty() => {
            info!("[anemia-page] Logged in as {} with role {}", username, role);
            host.set_item(ROLE_KEY, &role);
            host.navigate(HOME_PAGE);
            LoginOutcome::LoggedIn { role }
        }
        ("ok", _) => fail(host, LoginError::Decode("login response without role".to_string())),
        _ => {
            let message = parsed
                .message
                .unwrap_or_else(|| REJECTED_FALLBACK.to_string());
            warn!("[anemia-page] Login rejected for {}: {}", username, message);
            host.alert(&message);
            LoginOutcome::Rejected(message)
        }
    }
}

/// Drops the stored role; the next page load redirects to login.
pub fn logout<H: Host + ?Sized>(host: &H) {
    host.remove_item(ROLE_KEY);
}

fn fail<H: Host + ?Sized>(host: &H, err: LoginError) -> LoginOutcome {
    error!("[anemia-page] Login failed: {}", err);
    host.alert(err.alert_message());
    LoginOutcome::Failed(err)
}
