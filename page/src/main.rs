use std::collections::HashMap;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Mutex;

use anemia_page::dom::{Document, LABEL_OUTPUT, PREDICT_BUTTON, PROB_OUTPUT, SCORE_OUTPUT};
use anemia_page::host::Host;
use anemia_page::login::{self, LoginOutcome};
use anemia_page::transport::{HttpTransport, DEFAULT_API_URL};
use anemia_page::{ClickOutcome, Page, PredictOutcome, FIELD_NAMES};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "anemia-page", version, about = "Terminal host for the anemia risk form")]
struct Cli {
    /// Backend base URL.
    #[arg(long, env = "ANEMIA_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// JSON file standing in for the browser's local storage.
    #[arg(long, env = "ANEMIA_SESSION_FILE", default_value = "./session.json")]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Read `field=value` lines from stdin and request a prediction.
    Predict,
    /// Sign in and store the returned role.
    Login { username: String, password: String },
    /// Forget the stored role.
    Logout,
}

/// Local storage persisted to a JSON file. Navigation is recorded so the
/// caller can stop once the page asked to leave.
struct TerminalHost {
    path: PathBuf,
    storage: Mutex<HashMap<String, String>>,
    navigated_to: Mutex<Option<String>>,
}

impl TerminalHost {
    fn open(path: PathBuf) -> anyhow::Result<Self> {
        let storage = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            storage: Mutex::new(storage),
            navigated_to: Mutex::new(None),
        })
    }

    fn navigated_to(&self) -> Option<String> {
        self.navigated_to.lock().expect("navigation lock poisoned").clone()
    }

    fn persist(&self, storage: &HashMap<String, String>) {
        let result = serde_json::to_string_pretty(storage)
            .map_err(anyhow::Error::from)
            .and_then(|json| std::fs::write(&self.path, json).map_err(Into::into));
        if let Err(e) = result {
            error!("[anemia-page] Failed to write {:?}: {}", self.path, e);
        }
    }
}

impl Host for TerminalHost {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage
            .lock()
            .expect("storage lock poisoned")
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        let mut storage = self.storage.lock().expect("storage lock poisoned");
        storage.insert(key.to_string(), value.to_string());
        self.persist(&storage);
    }

    fn remove_item(&self, key: &str) {
        let mut storage = self.storage.lock().expect("storage lock poisoned");
        storage.remove(key);
        self.persist(&storage);
    }

    fn navigate(&self, href: &str) {
        info!("[anemia-page] Navigating to {}", href);
        *self.navigated_to.lock().expect("navigation lock poisoned") = Some(href.to_string());
    }

    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let host = TerminalHost::open(cli.session_file)?;
    let transport = HttpTransport::new(&cli.api_url)?;
    info!("[anemia-page] Backend: {}", transport.base_url());

    match cli.command.unwrap_or(Command::Predict) {
        Command::Login { username, password } => {
            match login::login(&host, &transport, &username, &password).await {
                LoginOutcome::LoggedIn { role } => println!("Signed in as {} ({})", username, role),
                LoginOutcome::Rejected(_) | LoginOutcome::Failed(_) => std::process::exit(1),
            }
        }
        Command::Logout => {
            login::logout(&host);
            println!("Signed out");
        }
        Command::Predict => predict(host, transport).await?,
    }

    Ok(())
}

async fn predict(host: TerminalHost, transport: HttpTransport) -> anyhow::Result<()> {
    let page = Page::new(Document::prediction_page(), host, transport);
    page.init();
    if let Some(href) = page.host().navigated_to() {
        eprintln!("No active session (page moved to {}). Run `anemia-page login` first.", href);
        std::process::exit(1);
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((name, value)) = trimmed.split_once('=') else {
            warn!("[anemia-page] Ignoring line without '=': {}", trimmed);
            continue;
        };
        let name = name.trim();
        if !FIELD_NAMES.contains(&name) {
            warn!("[anemia-page] Unknown field {}", name);
            continue;
        }
        page.document_mut().set_input_value(name, value.trim());
    }

    match page.click_selector(PREDICT_BUTTON).await {
        ClickOutcome::Predict(PredictOutcome::Rendered(rendering)) => {
            let doc = page.document();
            println!("score: {}", doc.text(SCORE_OUTPUT).unwrap_or_default());
            println!("label: {} ({})", doc.text(LABEL_OUTPUT).unwrap_or_default(), rendering.color);
            println!("prob:  {}", doc.text(PROB_OUTPUT).unwrap_or_default());
            Ok(())
        }
        _ => std::process::exit(1),
    }
}
