use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "worklog-bridge";
pub const DEFAULT_COOLDOWN_MS: u64 = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const TEMPO_EU_HOST: &str = "https://api.eu.tempo.io";
pub const TEMPO_DEFAULT_HOST: &str = "https://api.tempo.io";

const CLOUD_HOST_MARKER: &str = ".atlassian.net";
const AUTH_TYPE_PARAM: &str = "os_authType=basic";

/// How the Jira token is presented in the `Authorization` header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthMethod {
    /// Basic for Atlassian Cloud hosts, Bearer (personal access token) for everything else.
    Auto,
    Basic,
    Bearer,
}

impl AuthMethod {
    pub fn from_name(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "basic" => AuthMethod::Basic,
            "bearer" => AuthMethod::Bearer,
            _ => AuthMethod::Auto,
        }
    }
}

#[derive(Clone, Debug)]
pub struct JiraConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub auth_method: AuthMethod,
    pub user_agent: String,
    pub cooldown: Duration,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl JiraConfig {
    pub fn new(
        base_url: impl AsRef<str>,
        email: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: normalize_base_url(base_url.as_ref()),
            email: email.into(),
            api_token: api_token.into(),
            auth_method: AuthMethod::Auto,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn with_auth_method(mut self, method: AuthMethod) -> Self {
        self.auth_method = method;
        self
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn with_cooldown(mut self, duration: Duration) -> Self {
        self.cooldown = duration;
        self
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    pub fn with_connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = duration;
        self
    }

    /// Atlassian Cloud sites live under `*.atlassian.net`; anything else is Server/Data Center.
    pub fn is_cloud(&self) -> bool {
        self.base_url.contains(CLOUD_HOST_MARKER)
    }

    pub fn is_complete(&self) -> bool {
        !self.base_url.is_empty() && !self.email.trim().is_empty() && !self.api_token.trim().is_empty()
    }

    /// Resolves a REST endpoint to a full URL.
    ///
    /// Server/Data Center installs do not expose REST v3, so v3 paths are
    /// rewritten to their v2 equivalents there. Every Jira request carries
    /// `os_authType=basic` so servers never fall back to cookie auth.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        let mut path = if endpoint.starts_with('/') {
            endpoint.to_string()
        } else {
            format!("/{}", endpoint)
        };

        if !self.is_cloud() {
            path = path
                .replace("/rest/api/3/search/jql", "/rest/api/2/search")
                .replace("/rest/api/3/", "/rest/api/2/");
        }

        let mut url = format!("{}{}", self.base_url, path);
        if !url.contains("os_authType") {
            let separator = if url.contains('?') { '&' } else { '?' };
            url.push(separator);
            url.push_str(AUTH_TYPE_PARAM);
        }
        url
    }
}

#[derive(Clone, Debug)]
pub struct TempoConfig {
    pub base_url: String,
    pub token: String,
    pub user_agent: String,
    pub cooldown: Duration,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl TempoConfig {
    /// Tempo Cloud serves EU tenants (Atlassian Cloud sites) from a dedicated host.
    pub fn for_jira_host(jira_base_url: &str, token: impl Into<String>) -> Self {
        let host = if jira_base_url.contains(CLOUD_HOST_MARKER) {
            TEMPO_EU_HOST
        } else {
            TEMPO_DEFAULT_HOST
        };
        Self {
            base_url: host.to_string(),
            token: token.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = normalize_base_url(base_url.as_ref());
        self
    }

    pub fn with_cooldown(mut self, duration: Duration) -> Self {
        self.cooldown = duration;
        self
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

/// Trims whitespace and trailing slashes, and assumes `https://` when no scheme is given.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
