use crate::auth::jira_authorization;
use crate::config::JiraConfig;
use crate::error::{JiraError, Result};
use crate::models::{
    IssuePickerIssue, IssuePickerResponse, JiraIssue, JiraUser, JiraWorklog, JqlSearchRequest,
    SearchResults, WorklogCreateRequest, WorklogPage,
};
use crate::rate_limiter::RateLimiter;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const ISSUE_FIELDS: &str = "summary,issuetype,status,labels";
const SEARCH_FIELDS: [&str; 4] = ["key", "summary", "labels", "issuetype"];
const PARENT_SEARCH_FIELDS: [&str; 4] = ["key", "summary", "issuetype", "status"];
pub const DEFAULT_SEARCH_LIMIT: u32 = 100;

/// Async client for the Jira REST API (Cloud v3 or Server/Data Center v2).
#[derive(Clone)]
pub struct JiraClient {
    http: HttpClient,
    config: JiraConfig,
    limiter: RateLimiter,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let limiter = RateLimiter::new(config.cooldown);
        Self::new_with_limiter(config, limiter)
    }

    pub fn new_with_limiter(config: JiraConfig, limiter: RateLimiter) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(JiraError::Configuration("Jira base URL is required".into()));
        }
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, header_value(jira_authorization(&config))?);
        headers.insert(
            HeaderName::from_static("x-atlassian-token"),
            HeaderValue::from_static("nocheck"),
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

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    async fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        self.limiter.hit().await;
        let url = self.config.endpoint_url(endpoint);
        tracing::debug!(%method, endpoint, "jira request");
        self.http.request(method, url)
    }

    async fn get<T>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut request = self.request(Method::GET, endpoint).await;
        if !query.is_empty() {
            request = request.query(query);
        }
        parse_json(request.send().await?).await
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, endpoint).await.json(body);
        parse_json(request.send().await?).await
    }

    pub async fn myself(&self) -> Result<JiraUser> {
        self.get("/rest/api/3/myself", &[]).await
    }

    pub async fn search_jql(&self, jql: &str, max_results: u32) -> Result<Vec<JiraIssue>> {
        self.search_with_fields(jql, &SEARCH_FIELDS, max_results).await
    }

    /// JQL search returning the fields needed to present destination parents.
    pub async fn search_parents(&self, jql: &str, max_results: u32) -> Result<Vec<JiraIssue>> {
        self.search_with_fields(jql, &PARENT_SEARCH_FIELDS, max_results)
            .await
    }

    async fn search_with_fields(
        &self,
        jql: &str,
        fields: &[&str],
        max_results: u32,
    ) -> Result<Vec<JiraIssue>> {
        let payload = JqlSearchRequest {
            jql,
            fields,
            max_results: max_results.clamp(1, 1000),
        };
        let results: SearchResults = self.post("/rest/api/3/search/jql", &payload).await?;
        Ok(results.issues)
    }

    pub async fn issue(&self, key_or_id: &str) -> Result<JiraIssue> {
        let endpoint = format!("/rest/api/2/issue/{}", key_or_id);
        self.get(&endpoint, &[("fields", ISSUE_FIELDS)]).await
    }

    pub async fn issue_worklogs(&self, issue_key: &str) -> Result<Vec<JiraWorklog>> {
        let endpoint = format!("/rest/api/3/issue/{}/worklog", issue_key);
        let page: WorklogPage = self.get(&endpoint, &[]).await?;
        Ok(page.worklogs)
    }

    pub async fn add_worklog(&self, issue_key: &str, payload: &WorklogCreateRequest) -> Result<()> {
        let endpoint = format!("/rest/api/2/issue/{}/worklog?adjustEstimate=leave", issue_key);
        let request = self.request(Method::POST, &endpoint).await.json(payload);
        ensure_success(request.send().await?).await
    }

    pub async fn delete_worklog(&self, issue_key_or_id: &str, worklog_id: &str) -> Result<()> {
        let endpoint = format!(
            "/rest/api/2/issue/{}/worklog/{}",
            issue_key_or_id, worklog_id
        );
        let request = self.request(Method::DELETE, &endpoint).await;
        ensure_success(request.send().await?).await
    }

    pub async fn issue_picker(&self, query: &str) -> Result<Vec<IssuePickerIssue>> {
        let response: IssuePickerResponse = self
            .get("/rest/api/3/issue/picker", &[("query", query)])
            .await?;
        Ok(response.into_issues())
    }
}

pub(crate) fn build_http_client(
    mut headers: HeaderMap,
    user_agent: &str,
    timeout: Duration,
    connect_timeout: Duration,
) -> Result<HttpClient> {
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, header_value(user_agent.to_string())?);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .build()
        .map_err(|err| JiraError::Other(err.to_string()))
}

pub(crate) fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| JiraError::Configuration(err.to_string()))
}

pub(crate) async fn parse_json<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if status.is_success() {
        response.json::<T>().await.map_err(JiraError::from)
    } else {
        Err(error_from_response(status, response).await)
    }
}

pub(crate) async fn ensure_success(response: Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(error_from_response(status, response).await)
    }
}

async fn error_from_response(status: StatusCode, response: Response) -> JiraError {
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%status, "request rejected");
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        JiraError::Authentication(format!("Access denied ({}) - {}", status, body))
    } else {
        JiraError::http(status, extract_error_message(&body), body)
    }
}

/// Pulls the first human-readable message out of a Jira or Tempo error body.
fn extract_error_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    value
        .get("errorMessages")
        .and_then(Value::as_array)
        .and_then(|messages| messages.first())
        .and_then(Value::as_str)
        .or_else(|| {
            value
                .get("errors")
                .and_then(Value::as_array)
                .and_then(|errors| errors.first())
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
        })
        .or_else(|| value.get("code").and_then(Value::as_str))
        .map(str::to_string)
}
