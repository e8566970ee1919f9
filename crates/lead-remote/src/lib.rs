//! # lead-remote
//!
//! HTTP adapters for the services a row is resolved against:
//! - email finder and verifier ([`prospect`])
//! - LinkedIn profile finder ([`linkedin`])
//! - the user's sync webhook ([`webhook`])
//!
//! Lookups return a soft [`Lookup`] rather than an error so a batch never
//! aborts on a single bad row.

pub mod linkedin;
pub mod prospect;
pub mod webhook;

mod error;
mod http;
mod lookup;

pub use error::RemoteError;
pub use http::check_response;
pub use linkedin::LinkedinClient;
pub use lookup::Lookup;
pub use prospect::{ProspectClient, VerifyVerdict};
pub use webhook::WebhookClient;

use async_trait::async_trait;
use lead_config::LeadsConfig;

/// The three lookups a row can need.
///
/// The row processor only talks to this trait; tests substitute scripted
/// implementations.
#[async_trait]
pub trait ProspectServices: Send + Sync {
    async fn find_email(&self, name: &str, company: &str) -> Lookup<String>;

    async fn verify_email(&self, email: &str) -> Lookup<VerifyVerdict>;

    async fn find_linkedin_url(&self, name: &str, company: &str) -> Lookup<String>;
}

/// Production [`ProspectServices`] backed by the HTTP clients.
///
/// A service left unconfigured answers every call with a failed lookup
/// naming the missing setting.
#[derive(Debug, Clone, Default)]
pub struct RemoteClients {
    prospect: Option<ProspectClient>,
    linkedin: Option<LinkedinClient>,
}

impl RemoteClients {
    /// Build whichever clients the configuration enables.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Http`] if an HTTP client cannot be built.
    pub fn from_config(config: &LeadsConfig) -> Result<Self, RemoteError> {
        let prospect = if config.prospect.is_configured() {
            Some(ProspectClient::new(&config.prospect)?)
        } else {
            None
        };
        let linkedin = if config.linkedin.is_configured() {
            Some(LinkedinClient::new(&config.linkedin)?)
        } else {
            None
        };
        Ok(Self { prospect, linkedin })
    }
}

fn unconfigured<T>(service: &'static str, hint: &'static str) -> Lookup<T> {
    Lookup::failed(RemoteError::NotConfigured { service, hint }.to_string())
}

#[async_trait]
impl ProspectServices for RemoteClients {
    async fn find_email(&self, name: &str, company: &str) -> Lookup<String> {
        match &self.prospect {
            Some(client) => client.find_email(name, company).await,
            None => unconfigured("email finder", "LEADS_PROSPECT__API_KEY"),
        }
    }

    async fn verify_email(&self, email: &str) -> Lookup<VerifyVerdict> {
        match &self.prospect {
            Some(client) => client.verify_email(email).await,
            None => unconfigured("email verifier", "LEADS_PROSPECT__API_KEY"),
        }
    }

    async fn find_linkedin_url(&self, name: &str, company: &str) -> Lookup<String> {
        match &self.linkedin {
            Some(client) => client.find_linkedin_url(name, company).await,
            None => unconfigured("LinkedIn finder", "LEADS_LINKEDIN__API_KEY"),
        }
    }
}
