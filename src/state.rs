use tokio::sync::Mutex;

use crate::config::Config;
use crate::credentials::{CredentialError, CredentialStore, Users};
use crate::gateway::ModelGateway;
use crate::session::SessionStore;

/// Shared application state passed to every route handler.
pub struct AppState {
    pub gateway: ModelGateway,
    pub credentials: CredentialStore,
    /// Guards the in-memory registry and serializes whole-file rewrites.
    pub users: Mutex<Users>,
    pub sessions: SessionStore,
    pub contact_emails: Vec<String>,
}

impl AppState {
    pub fn new(gateway: ModelGateway, credentials: CredentialStore, users: Users) -> Self {
        Self {
            gateway,
            credentials,
            users: Mutex::new(users),
            sessions: SessionStore::new(),
            contact_emails: Vec::new(),
        }
    }

    pub fn with_contact_emails(mut self, emails: Vec<String>) -> Self {
        self.contact_emails = emails;
        self
    }

    /// Load the credential file named in `cfg` and wire up the Gemini gateway.
    pub fn from_config(cfg: &Config) -> Result<Self, CredentialError> {
        let credentials = CredentialStore::new(&cfg.users_file);
        let users = credentials.load()?;
        Ok(Self::new(ModelGateway::from_config(cfg), credentials, users)
            .with_contact_emails(cfg.contact_emails.clone()))
    }
}
