use tracing::{info, warn};

use crate::host::Host;

/// Storage key holding the signed-in user's role.
pub const ROLE_KEY: &str = "role";
pub const LOGIN_PAGE: &str = "login.html";
pub const HOME_PAGE: &str = "index.html";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Active { role: String },
    Redirected,
}

/// Checks for a stored role and sends the host to the login page when there
/// is none. Navigation is requested, not awaited: callers keep initialising.
pub fn guard<H: Host + ?Sized>(host: &H) -> SessionState {
    match host.get_item(ROLE_KEY).filter(|role| !role.is_empty()) {
        Some(role) => {
            info!("[anemia-page] Session active with role {}", role);
            SessionState::Active { role }
        }
        None => {
            warn!("[anemia-page] No session role stored, redirecting to {}", LOGIN_PAGE);
            host.navigate(LOGIN_PAGE);
            SessionState::Redirected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    #[test]
    fn stored_role_keeps_the_page() {
        let host = MemoryHost::new().with_item(ROLE_KEY, "medico");
        assert_eq!(
            guard(&host),
            SessionState::Active {
                role: "medico".to_string()
            }
        );
        assert!(host.navigations().is_empty());
    }

    #[test]
    fn missing_role_redirects_to_login() {
        let host = MemoryHost::new();
        assert_eq!(guard(&host), SessionState::Redirected);
        assert_eq!(host.navigations(), vec![LOGIN_PAGE.to_string()]);
    }

    #[test]
    fn empty_role_counts_as_missing() {
        let host = MemoryHost::new().with_item(ROLE_KEY, "");
        assert_eq!(guard(&host), SessionState::Redirected);
    }
}
