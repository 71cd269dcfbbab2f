use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

#[derive(Clone, Debug, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Deserialize)]
struct UsersFile {
    users: Vec<User>,
}

/// Accounts allowed to sign in, loaded once at startup.
#[derive(Clone, Debug, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    /// Reads `{ "users": [...] }`. A missing file yields an empty directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            warn!("[anemia-risk] Users file {:?} not found, logins will fail", path);
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let file: UsersFile = serde_json::from_str(&contents)?;
        info!("[anemia-risk] {} users loaded", file.users.len());
        Ok(Self::new(file.users))
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.username == username && u.password == password)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
