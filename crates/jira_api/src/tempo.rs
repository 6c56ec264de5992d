//! Client for the Tempo Cloud REST API (v4).

use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderName, AUTHORIZATION};
use reqwest::{Client as HttpClient, Method, RequestBuilder};

use crate::auth::tempo_authorization;
use crate::client::{build_http_client, ensure_success, header_value, parse_json};
use crate::config::TempoConfig;
use crate::error::{JiraError, Result};
use crate::models::{TempoPage, TempoWorklog, TempoWorklogCreate, WorkAttribute};
use crate::rate_limiter::RateLimiter;

const WORKLOG_PAGE_LIMIT: &str = "1000";
const MAX_FOLLOWED_PAGES: usize = 20;

#[derive(Clone)]
pub struct TempoClient {
    http: HttpClient,
    config: TempoConfig,
    limiter: RateLimiter,
}

impl TempoClient {
    pub fn new(config: TempoConfig) -> Result<Self> {
        let limiter = RateLimiter::new(config.cooldown);
        Self::new_with_limiter(config, limiter)
    }

    pub fn new_with_limiter(config: TempoConfig, limiter: RateLimiter) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(JiraError::Configuration("Tempo token is required".into()));
        }
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, header_value(tempo_authorization(&config.token))?);
        headers.insert(
            HeaderName::from_static("x-tempo-api-key"),
            header_value(config.token.trim().to_string())?,
        );
        let http = build_http_client(
            headers,
            &config.user_agent,
            config.timeout,
            config.connect_timeout,
        )?;
        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    pub fn config(&self) -> &TempoConfig {
        &self.config
    }

    async fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.limiter.hit().await;
        tracing::debug!(%method, url = url.as_str(), "tempo request");
        self.http.request(method, url)
    }

    /// Worklogs authored by `account_id` between `from` and `to` inclusive.
    ///
    /// Follows `metadata.next` links so long windows are not truncated.
    pub async fn user_worklogs(
        &self,
        account_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TempoWorklog>> {
        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();
        let url = self
            .config
            .endpoint_url(&format!("/4/worklogs/user/{}", account_id));
        let request = self
            .request(Method::GET, url)
            .await
            .query(&[("from", from.as_str()), ("to", to.as_str()), ("limit", WORKLOG_PAGE_LIMIT)]);
        let mut page: TempoPage<TempoWorklog> = parse_json(request.send().await?).await?;
        let mut worklogs = std::mem::take(&mut page.results);

        let mut followed = 0;
        while let Some(next) = page.metadata.as_ref().and_then(|meta| meta.next.clone()) {
            if followed >= MAX_FOLLOWED_PAGES {
                tracing::warn!(account_id, "stopping Tempo pagination after {} pages", followed);
                break;
            }
            followed += 1;
            let request = self.request(Method::GET, next).await;
            page = parse_json(request.send().await?).await?;
            worklogs.append(&mut page.results);
        }
        Ok(worklogs)
    }

    pub async fn work_attributes(&self) -> Result<Vec<WorkAttribute>> {
        let url = self.config.endpoint_url("/4/work-attributes");
        let request = self.request(Method::GET, url).await;
        let page: TempoPage<WorkAttribute> = parse_json(request.send().await?).await?;
        Ok(page.results)
    }

    pub async fn create_worklog(&self, payload: &TempoWorklogCreate) -> Result<()> {
        let url = self.config.endpoint_url("/4/worklogs");
        let request = self.request(Method::POST, url).await.json(payload);
        ensure_success(request.send().await?).await
    }

    pub async fn delete_worklog(&self, worklog_id: &str) -> Result<()> {
        let url = self.config.endpoint_url(&format!("/4/worklogs/{}", worklog_id));
        let request = self.request(Method::DELETE, url).await;
        ensure_success(request.send().await?).await
    }
}
