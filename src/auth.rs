//! OAuth2 authentication management for the Gmail API

use google_gmail1::{hyper_rustls, hyper_util, yup_oauth2, Gmail};
use std::env;
use std::path::Path;
use yup_oauth2::ApplicationSecret;

use crate::error::{Result, SweepError};

/// Full mailbox access. Permanent thread deletion is rejected under the
/// narrower `gmail.modify` scope, so the whole tool runs with this one.
pub const FULL_MAIL_SCOPE: &str = "https://mail.google.com/";

/// Scopes requested during the OAuth flow
pub const REQUIRED_SCOPES: &[&str] = &[FULL_MAIL_SCOPE];

/// Type alias for Gmail Hub to simplify type signatures
pub type GmailHub =
    Gmail<hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>>;

/// Resolve the OAuth2 application secret.
///
/// Prefers the credentials JSON file; when it is absent, falls back to the
/// `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET` environment variables so the
/// tool can run without a credentials download.
pub async fn resolve_application_secret(credentials_path: &Path) -> Result<ApplicationSecret> {
    if credentials_path.exists() {
        return yup_oauth2::read_application_secret(credentials_path)
            .await
            .map_err(|e| SweepError::AuthError(format!("Failed to read credentials: {}", e)));
    }

    tracing::info!(
        "Credentials file not found at {:?}, trying environment variables",
        credentials_path
    );
    load_credentials_from_env()
}

/// Initialize a Gmail API hub with OAuth2 authentication.
///
/// Uses the InstalledFlow (desktop app flow) with token persistence to disk,
/// pre-authenticates with the required scopes so the cached token carries
/// them, and builds an HTTP/1 client with TLS. The persisted token file is
/// restricted to owner read/write.
pub async fn initialize_gmail_hub(
    credentials_path: &Path,
    token_cache_path: &Path,
) -> Result<GmailHub> {
    let secret = resolve_application_secret(credentials_path).await?;

    // HTTPRedirect opens a browser for user authorization
    let auth = yup_oauth2::InstalledFlowAuthenticator::builder(
        secret,
        yup_oauth2::InstalledFlowReturnMethod::HTTPRedirect,
    )
    .persist_tokens_to_disk(token_cache_path)
    .build()
    .await
    .map_err(|e| SweepError::AuthError(format!("Failed to build authenticator: {}", e)))?;

    let _token = auth
        .token(REQUIRED_SCOPES)
        .await
        .map_err(|e| SweepError::AuthError(format!("Failed to obtain token: {}", e)))?;

    // Every flow that reaches this point has persisted (or refreshed) the
    // token cache, so harden it here rather than in each caller
    if token_cache_path.exists() {
        secure_token_file(token_cache_path).await?;
    }

    let client = hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
        .build(
            hyper_rustls::HttpsConnectorBuilder::new()
                .with_native_roots()
                .map_err(|e| SweepError::AuthError(format!("Failed to load TLS roots: {}", e)))?
                .https_or_http()
                .enable_http1()
                .build(),
        );

    Ok(Gmail::new(client, auth))
}

/// Load OAuth2 credentials from environment variables.
///
/// Fails before any remote call when a variable is missing.
///
/// # Environment Variables
/// - `GOOGLE_CLIENT_ID`: OAuth2 client ID
/// - `GOOGLE_CLIENT_SECRET`: OAuth2 client secret
/// - `GOOGLE_REDIRECT_URL`: Redirect URI (optional, defaults to http://localhost:8080)
pub fn load_credentials_from_env() -> Result<ApplicationSecret> {
    let client_id = env::var("GOOGLE_CLIENT_ID")
        .map_err(|_| SweepError::ConfigError("GOOGLE_CLIENT_ID not set".to_string()))?;
    let client_secret = env::var("GOOGLE_CLIENT_SECRET")
        .map_err(|_| SweepError::ConfigError("GOOGLE_CLIENT_SECRET not set".to_string()))?;
    let redirect_url = env::var("GOOGLE_REDIRECT_URL")
        .unwrap_or_else(|_| "http://localhost:8080".to_string());

    Ok(ApplicationSecret {
        client_id,
        client_secret,
        auth_uri: "https://accounts.google.com/o/oauth2/auth".to_string(),
        token_uri: "https://oauth2.googleapis.com/token".to_string(),
        redirect_uris: vec![redirect_url],
        ..Default::default()
    })
}

/// Restrict the token cache to owner read/write on Unix systems
#[cfg(unix)]
pub async fn secure_token_file(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;
    Ok(())
}

/// Windows uses ACLs instead of Unix permissions; nothing to do here
#[cfg(windows)]
pub async fn secure_token_file(_path: &Path) -> Result<()> {
    Ok(())
}
