//! Authorization header construction for Jira and Tempo.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

use crate::config::{AuthMethod, JiraConfig};

/// Returns the `Authorization` value for a Jira request.
///
/// Tokens that already carry a scheme are sent untouched.
pub fn jira_authorization(config: &JiraConfig) -> String {
    let token = config.api_token.trim();
    if token.starts_with("Basic ") || token.starts_with("Bearer ") {
        return token.to_string();
    }

    match config.auth_method {
        AuthMethod::Basic => basic_credentials(&config.email, token),
        AuthMethod::Bearer => format!("Bearer {}", token),
        AuthMethod::Auto if config.is_cloud() => basic_credentials(&config.email, token),
        AuthMethod::Auto => format!("Bearer {}", token),
    }
}

pub fn tempo_authorization(token: &str) -> String {
    format!("Bearer {}", token.trim())
}

fn basic_credentials(email: &str, token: &str) -> String {
    let raw = format!("{}:{}", email.trim(), token);
    format!("Basic {}", BASE64_STANDARD.encode(raw))
}
