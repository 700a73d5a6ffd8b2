//! Kubernetes client module
//!
//! Handles connection to the Kubernetes/OpenShift API server and provides
//! a configured client for the collector.
//!
//! Two ways in:
//! - explicit cluster URL with username/password or a bearer token
//!   (what `oc login` asks for); a password is first traded for a token at
//!   the OpenShift OAuth server
//! - the default kubeconfig loading strategy (in-cluster config,
//!   `KUBECONFIG`, `~/.kube/config`)

mod client;
mod oauth;

pub use client::{
    KubeResourceClient, ResourceClient, ResourceQuery, api_resource, classify_error,
};

pub use oauth::{OAuthError, authorize_url, request_token, token_from_location};

#[cfg(test)]
pub use client::MockResourceClient;

use crate::error::CollectError;
use crate::models::ResourceKind;
use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Namespace;
use kube::api::ListParams;
use kube::{Api, Client, Config};
use std::fmt;
use url::Url;

/// Secret half of a cluster login
#[derive(Clone)]
pub enum Credential {
    Basic { username: String, password: String },
    Token(String),
}

/// Everything needed to open a session against an explicit API server
#[derive(Clone)]
pub struct ClusterCredentials {
    pub server: String,
    pub credential: Credential,
}

impl ClusterCredentials {
    pub fn basic(server: impl Into<String>, username: impl Into<String>, password: String) -> Self {
        Self {
            server: server.into(),
            credential: Credential::Basic {
                username: username.into(),
                password,
            },
        }
    }

    pub fn token(server: impl Into<String>, token: String) -> Self {
        Self {
            server: server.into(),
            credential: Credential::Token(token),
        }
    }

    pub fn username(&self) -> Option<&str> {
        match &self.credential {
            Credential::Basic { username, .. } => Some(username),
            Credential::Token(_) => None,
        }
    }
}

// Never print the password or token
impl fmt::Debug for ClusterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match &self.credential {
            Credential::Basic { .. } => "basic",
            Credential::Token(_) => "token",
        };
        f.debug_struct("ClusterCredentials")
            .field("server", &self.server)
            .field("username", &self.username())
            .field("method", &method)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Validate an API server URL before handing it to the client
pub fn parse_server_url(server: &str) -> Result<Url> {
    let url = Url::parse(server.trim())
        .with_context(|| format!("Invalid cluster URL: {}", server))?;
    if !matches!(url.scheme(), "https" | "http") {
        anyhow::bail!("Cluster URL must use http or https: {}", server);
    }
    if url.host_str().is_none() {
        anyhow::bail!("Cluster URL has no host: {}", server);
    }
    Ok(url)
}

/// Trade a password for an OAuth bearer token where the cluster offers one
///
/// Token credentials pass through unchanged. An API server that advertises
/// no OAuth server (plain Kubernetes) keeps Basic credentials.
pub async fn exchange_password(
    credentials: ClusterCredentials,
    insecure_skip_tls_verify: bool,
) -> Result<ClusterCredentials> {
    let Credential::Basic { username, password } = credentials.credential.clone() else {
        return Ok(credentials);
    };
    let server = parse_server_url(&credentials.server)?;

    let exchanged =
        oauth::request_token(&server, &username, &password, insecure_skip_tls_verify).await;
    match exchanged {
        Ok(token) => {
            tracing::info!(username = %username, "Obtained OAuth token");
            Ok(ClusterCredentials::token(credentials.server.clone(), token))
        }
        Err(OAuthError::NotAdvertised) => {
            tracing::debug!("No OAuth server advertised, using basic authentication");
            Ok(credentials)
        }
        Err(e) => Err(e).context("Failed to obtain an OAuth token"),
    }
}

/// Build a client for an explicit API server and credential
pub fn connect(credentials: &ClusterCredentials, insecure_skip_tls_verify: bool) -> Result<Client> {
    let url = parse_server_url(&credentials.server)?;
    let cluster_url = url
        .as_str()
        .parse()
        .with_context(|| format!("Invalid cluster URL: {}", url))?;

    let mut config = Config::new(cluster_url);
    config.accept_invalid_certs = insecure_skip_tls_verify;
    match &credentials.credential {
        Credential::Basic { username, password } => {
            config.auth_info.username = Some(username.clone());
            config.auth_info.password = Some(password.clone().into());
        }
        Credential::Token(token) => {
            config.auth_info.token = Some(token.clone().into());
        }
    }

    tracing::debug!(
        server = %url,
        username = credentials.username().unwrap_or(""),
        insecure = insecure_skip_tls_verify,
        "Creating Kubernetes client"
    );
    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    Ok(client)
}

/// Initialize a client from the default kubeconfig loading strategy
pub async fn create_client(insecure_skip_tls_verify: bool) -> Result<Client> {
    let mut config = Config::infer()
        .await
        .context("Failed to load kubeconfig")?;
    if insecure_skip_tls_verify {
        config.accept_invalid_certs = true;
    }
    tracing::debug!(server = %config.cluster_url, "Creating Kubernetes client from kubeconfig");
    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    Ok(client)
}

/// Confirm the session is accepted before any collection starts
///
/// Issues the smallest possible namespace listing. A rejected session maps to
/// `CollectError::Auth`; an unreachable server to `Transport`.
pub async fn verify_session(client: &Client) -> Result<(), CollectError> {
    let api: Api<Namespace> = Api::all(client.clone());
    api.list_metadata(&ListParams::default().limit(1))
        .await
        .map(|_| ())
        .map_err(|e| classify_error(e, &ResourceQuery::cluster(ResourceKind::Namespace)))
}
