//! Jira and Tempo backed implementations of the collaborator traits.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use jira_api::{
    AttributeValue, JiraClient, JiraConfig, JiraIssue, JiraUser, JiraWorklog, TempoClient,
    TempoConfig, TempoWorklog, TempoWorklogCreate, WorklogAuthor, WorklogCreateRequest,
    DEFAULT_SEARCH_LIMIT,
};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::bridge::{AttributeDef, ParentTask, ResolvedIssue, WorklogEntry, WorklogWrite};
use crate::config::ConnectionProfile;
use crate::error::{BridgeError, Result};
use crate::issue_cache::IssueCache;
use crate::tracker::{DestinationTracker, SourceTracker};

static ISSUE_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+-\d+$").expect("invalid issue key regex"));
static PROJECT_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("invalid project key regex"));
static HTML_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>?").expect("invalid tag regex"));

/// Days before the work date whose worklogs still surface a parent.
const PARENT_WINDOW_DAYS: i64 = 6;
const MIN_SEARCH_LENGTH: usize = 2;
const WORKLOG_START_TIME: &str = "09:00:00";
const DEFAULT_ISSUE_TYPE: &str = "Task";
const UNTITLED_SUMMARY: &str = "Untitled";

fn day_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn escape_jql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// JQL for the parent search box.
///
/// Summary prefix always; an exact key match when the query looks like an
/// issue key, otherwise a key prefix plus a project match for bare
/// alphanumeric queries.
pub fn build_search_jql(query: &str) -> String {
    let trimmed = query.trim();
    let clean = escape_jql(trimmed);
    let summary = format!("summary ~ \"{}*\"", clean);
    if ISSUE_KEY_REGEX.is_match(trimmed) {
        return format!("key = \"{}\" OR {}", clean, summary);
    }
    let mut jql = format!("key ~ \"{}*\" OR {}", clean, summary);
    if PROJECT_KEY_REGEX.is_match(trimmed) {
        jql.push_str(&format!(" OR project = \"{}\"", clean));
    }
    jql
}

fn strip_html(text: &str) -> String {
    HTML_TAG_REGEX.replace_all(text, "").trim().to_string()
}

/// Email first, then account id, then username. No match means someone else's worklog.
fn is_own_worklog(author: Option<&WorklogAuthor>, email: &str, me: Option<&JiraUser>) -> bool {
    let Some(author) = author else {
        return false;
    };
    if let Some(address) = author.email_address.as_deref() {
        if !email.is_empty() && address.eq_ignore_ascii_case(email) {
            return true;
        }
    }
    let Some(me) = me else {
        return false;
    };
    if let (Some(mine), Some(theirs)) = (me.account_id.as_deref(), author.account_id.as_deref()) {
        if mine == theirs {
            return true;
        }
    }
    matches!(
        (me.name.as_deref(), author.name.as_deref()),
        (Some(mine), Some(theirs)) if mine == theirs
    )
}

fn author_label(author: Option<&WorklogAuthor>) -> String {
    author
        .and_then(|author| {
            author
                .display_name
                .clone()
                .or_else(|| author.email_address.clone())
                .or_else(|| author.name.clone())
        })
        .unwrap_or_default()
}

fn entry_from_worklog(issue: &JiraIssue, worklog: &JiraWorklog, day: &str) -> WorklogEntry {
    let summary = issue.summary().unwrap_or(UNTITLED_SUMMARY).to_string();
    let mut entry = WorklogEntry::new(worklog.id.clone(), issue.key.clone(), worklog.time_spent_seconds)
        .with_summary(summary.clone())
        .with_issue_type(issue.issue_type_name().unwrap_or_default())
        .with_labels(issue.fields.labels.clone())
        .with_started(day)
        .with_comment(worklog.comment_text().unwrap_or(summary));
    entry.author = author_label(worklog.author.as_ref());
    entry
}

fn resolved_from_issue(issue: &JiraIssue) -> ResolvedIssue {
    ResolvedIssue {
        id: issue.id.clone(),
        key: issue.key.clone(),
        summary: issue.summary().unwrap_or(UNTITLED_SUMMARY).to_string(),
        issue_type: issue.issue_type_name().unwrap_or(DEFAULT_ISSUE_TYPE).to_string(),
        status: issue.status_name().unwrap_or_default().to_string(),
    }
}

fn parent_from_resolved(issue: &ResolvedIssue, children: Vec<WorklogEntry>) -> ParentTask {
    let mut parent = ParentTask::new(issue.id.clone(), issue.key.clone(), issue.summary.clone())
        .with_children(children);
    parent.issue_type = issue.issue_type.clone();
    parent.status = issue.status.clone();
    parent
}

async fn fetch_own_worklogs(
    client: &JiraClient,
    issue: &JiraIssue,
    day: &str,
    email: &str,
    me: Option<&JiraUser>,
) -> Vec<WorklogEntry> {
    match client.issue_worklogs(&issue.key).await {
        Ok(worklogs) => worklogs
            .iter()
            .filter(|worklog| worklog.started_on(day))
            .filter(|worklog| is_own_worklog(worklog.author.as_ref(), email, me))
            .map(|worklog| entry_from_worklog(issue, worklog, day))
            .collect(),
        Err(err) => {
            warn!("Failed to load worklogs of {}: {}", issue.key, err);
            Vec::new()
        }
    }
}

fn jira_client(profile: &ConnectionProfile) -> Result<JiraClient> {
    let config = JiraConfig::new(&profile.base_url, profile.email.clone(), profile.api_token.clone());
    Ok(JiraClient::new(config)?)
}

/// Reads the user's own worklogs for a day from the source Jira.
pub struct JiraSource {
    client: JiraClient,
    email: String,
}

impl JiraSource {
    pub fn new(client: JiraClient) -> Self {
        let email = client.config().email.clone();
        Self { client, email }
    }

    pub fn from_profile(profile: &ConnectionProfile) -> Result<Self> {
        Ok(Self::new(jira_client(profile)?))
    }
}

#[async_trait]
impl SourceTracker for JiraSource {
    async fn fetch_worklogs(&self, date: NaiveDate) -> Result<Vec<WorklogEntry>> {
        let day = day_string(date);
        let me = match self.client.myself().await {
            Ok(user) => Some(user),
            Err(err) => {
                warn!("Failed to identify source user: {}", err);
                None
            }
        };
        let jql = format!("worklogDate = '{}' AND worklogAuthor = currentUser()", day);
        let issues = self.client.search_jql(&jql, DEFAULT_SEARCH_LIMIT).await?;

        let mut entries = Vec::new();
        for issue in &issues {
            let mut own = fetch_own_worklogs(&self.client, issue, &day, &self.email, me.as_ref()).await;
            entries.append(&mut own);
        }
        debug!("loaded {} source worklogs for {} from {} issues", entries.len(), day, issues.len());
        Ok(entries)
    }
}

/// Destination Jira, writing natively or through Tempo when a token is set.
pub struct JiraDestination {
    client: JiraClient,
    tempo: Option<TempoClient>,
    email: String,
    cache: IssueCache,
}

impl JiraDestination {
    pub fn new(client: JiraClient, tempo: Option<TempoClient>) -> Self {
        let email = client.config().email.clone();
        Self {
            client,
            tempo,
            email,
            cache: IssueCache::default(),
        }
    }

    pub fn from_profile(profile: &ConnectionProfile) -> Result<Self> {
        let client = jira_client(profile)?;
        let tempo = if profile.uses_tempo() {
            let config = TempoConfig::for_jira_host(&client.config().base_url, profile.tempo_token.trim());
            Some(TempoClient::new(config)?)
        } else {
            None
        };
        Ok(Self::new(client, tempo))
    }

    async fn fetch_tempo_parents(&self, tempo: &TempoClient, date: NaiveDate) -> Result<Vec<ParentTask>> {
        let Some(account_id) = self.current_account_id().await? else {
            warn!("No destination account id; skipping Tempo worklogs");
            return Ok(Vec::new());
        };
        let from = date - Duration::days(PARENT_WINDOW_DAYS);
        let worklogs = tempo.user_worklogs(&account_id, from, date).await?;
        let day = day_string(date);

        let mut order: Vec<String> = Vec::new();
        let mut by_issue: HashMap<String, Vec<TempoWorklog>> = HashMap::new();
        for worklog in worklogs {
            let Some(issue_id) = worklog.issue.as_ref().map(|issue| issue.id.clone()) else {
                continue;
            };
            let bucket = by_issue.entry(issue_id.clone()).or_insert_with(|| {
                order.push(issue_id);
                Vec::new()
            });
            if worklog.start_date == day {
                bucket.push(worklog);
            }
        }

        let mut parents = Vec::with_capacity(order.len());
        for issue_id in order {
            let issue = match self.resolve_issue(&issue_id).await {
                Ok(Some(issue)) => issue,
                Ok(None) => continue,
                Err(err) => {
                    warn!("Failed to load destination issue {}: {}", issue_id, err);
                    continue;
                }
            };
            let children = by_issue
                .remove(&issue_id)
                .unwrap_or_default()
                .into_iter()
                .map(|worklog| {
                    let text = worklog
                        .description
                        .clone()
                        .filter(|text| !text.trim().is_empty())
                        .unwrap_or_else(|| issue.summary.clone());
                    WorklogEntry::new(worklog.tempo_worklog_id, issue.key.clone(), worklog.time_spent_seconds)
                        .with_summary(text.clone())
                        .with_comment(text)
                        .with_started(day.clone())
                })
                .collect();
            parents.push(parent_from_resolved(&issue, children));
        }
        Ok(parents)
    }

    async fn fetch_native_parents(&self, date: NaiveDate) -> Result<Vec<ParentTask>> {
        let from = day_string(date - Duration::days(PARENT_WINDOW_DAYS));
        let day = day_string(date);
        let me = match self.client.myself().await {
            Ok(user) => Some(user),
            Err(err) => {
                warn!("Failed to identify destination user: {}", err);
                None
            }
        };
        let jql = format!(
            "worklogAuthor = currentUser() AND worklogDate >= '{}' AND worklogDate <= '{}'",
            from, day
        );
        let issues = self.client.search_parents(&jql, DEFAULT_SEARCH_LIMIT).await?;

        let mut parents = Vec::with_capacity(issues.len());
        for issue in &issues {
            let children = fetch_own_worklogs(&self.client, issue, &day, &self.email, me.as_ref()).await;
            let resolved = resolved_from_issue(issue);
            self.cache.store_issue(resolved.clone());
            parents.push(parent_from_resolved(&resolved, children));
        }
        Ok(parents)
    }
}

#[async_trait]
impl DestinationTracker for JiraDestination {
    fn uses_time_tracking_addon(&self) -> bool {
        self.tempo.is_some()
    }

    async fn fetch_parents(&self, date: NaiveDate) -> Result<Vec<ParentTask>> {
        let parents = match &self.tempo {
            Some(tempo) => self.fetch_tempo_parents(tempo, date).await?,
            None => self.fetch_native_parents(date).await?,
        };
        debug!("loaded {} destination parents for {}", parents.len(), day_string(date));
        Ok(parents)
    }

    async fn search_issues(&self, query: &str) -> Result<Vec<ParentTask>> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LENGTH {
            return Ok(Vec::new());
        }
        match self.client.search_parents(&build_search_jql(query), DEFAULT_SEARCH_LIMIT).await {
            Ok(issues) if !issues.is_empty() => {
                return Ok(issues
                    .iter()
                    .map(|issue| parent_from_resolved(&resolved_from_issue(issue), Vec::new()))
                    .collect());
            }
            Ok(_) => {}
            Err(err) => warn!("JQL search for {:?} failed, trying issue picker: {}", query, err),
        }

        let picked = self.client.issue_picker(query).await?;
        Ok(picked
            .into_iter()
            .map(|issue| {
                let summary = issue
                    .summary_text
                    .as_deref()
                    .map(strip_html)
                    .filter(|summary| !summary.is_empty())
                    .unwrap_or_else(|| UNTITLED_SUMMARY.to_string());
                let mut parent = ParentTask::new(issue.id, issue.key, summary);
                parent.issue_type = DEFAULT_ISSUE_TYPE.to_string();
                parent.status = "Active".to_string();
                parent
            })
            .collect())
    }

    async fn current_account_id(&self) -> Result<Option<String>> {
        if let Some(account_id) = self.cache.account_id() {
            return Ok(Some(account_id));
        }
        let account_id = self.client.myself().await?.account_id;
        if let Some(account_id) = &account_id {
            self.cache.store_account_id(account_id.clone());
        }
        Ok(account_id)
    }

    async fn resolve_issue(&self, key_or_id: &str) -> Result<Option<ResolvedIssue>> {
        if let Some(issue) = self.cache.issue(key_or_id) {
            return Ok(Some(issue));
        }
        match self.client.issue(key_or_id).await {
            Ok(issue) => {
                let resolved = resolved_from_issue(&issue);
                self.cache.store_issue(resolved.clone());
                Ok(Some(resolved))
            }
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(BridgeError::from(err)),
        }
    }

    async fn fetch_required_attribute_definitions(&self) -> Result<Vec<AttributeDef>> {
        let Some(tempo) = &self.tempo else {
            return Ok(Vec::new());
        };
        Ok(tempo
            .work_attributes()
            .await?
            .into_iter()
            .filter(|attribute| attribute.required)
            .map(|attribute| AttributeDef {
                key: attribute.key,
                name: attribute.name,
                required: attribute.required,
                values: attribute.values,
            })
            .collect())
    }

    async fn create_worklog(&self, write: &WorklogWrite) -> Result<bool> {
        if let (Some(tempo), Some(issue_id), Some(author)) =
            (&self.tempo, write.parent_issue_id, write.author_account_id.as_deref())
        {
            let attributes: Vec<AttributeValue> = write
                .attributes
                .iter()
                .map(|choice| AttributeValue {
                    key: choice.key.clone(),
                    value: choice.value.clone(),
                })
                .collect();
            let payload = TempoWorklogCreate {
                issue_id,
                time_spent_seconds: write.time_spent_seconds,
                start_date: write.start_date.clone(),
                start_time: WORKLOG_START_TIME.to_string(),
                description: write.description.clone(),
                author_account_id: author.to_string(),
                attributes: (!attributes.is_empty()).then_some(attributes),
            };
            tempo.create_worklog(&payload).await?;
            return Ok(true);
        }

        if self.tempo.is_some() {
            debug!("Tempo details missing for {}, writing natively", write.parent_key);
        }
        let payload = WorklogCreateRequest {
            time_spent_seconds: write.time_spent_seconds,
            started: format!("{}T{}.000+0000", write.start_date, WORKLOG_START_TIME),
            comment: write.description.clone(),
        };
        self.client.add_worklog(&write.parent_key, &payload).await?;
        Ok(true)
    }

    async fn delete_worklog(&self, worklog_id: &str, parent_key_or_id: &str) -> Result<bool> {
        match &self.tempo {
            Some(tempo) => tempo.delete_worklog(worklog_id).await?,
            None => self.client.delete_worklog(parent_key_or_id, worklog_id).await?,
        }
        debug!("deleted destination worklog {}", worklog_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::AttributeChoice;
    use jira_api::RateLimiter;
    use mockito::Matcher;
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 14).unwrap()
    }

    fn client_for(server: &mockito::ServerGuard) -> JiraClient {
        let config = JiraConfig::new(server.url(), "me@acme.io", "token");
        JiraClient::new_with_limiter(config, RateLimiter::unthrottled()).unwrap()
    }

    fn tempo_for(server: &mockito::ServerGuard) -> TempoClient {
        let config = TempoConfig::for_jira_host(&server.url(), "tempo-token").with_base_url(server.url());
        TempoClient::new_with_limiter(config, RateLimiter::unthrottled()).unwrap()
    }

    async fn mock_myself(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("GET", "/rest/api/2/myself")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"accountId": "acc-1", "name": "me", "displayName": "Me"}).to_string())
            .create_async()
            .await
    }

    #[test]
    fn search_jql_depends_on_query_shape() {
        assert_eq!(build_search_jql(" DST-12 "), r#"key = "DST-12" OR summary ~ "DST-12*""#);
        assert_eq!(
            build_search_jql("DST"),
            r#"key ~ "DST*" OR summary ~ "DST*" OR project = "DST""#
        );
        assert_eq!(
            build_search_jql("login \"page\""),
            r#"key ~ "login \"page\"*" OR summary ~ "login \"page\"*""#
        );
    }

    #[test]
    fn own_worklogs_match_email_then_account_then_name() {
        let me = JiraUser {
            account_id: Some("acc-1".into()),
            name: Some("me".into()),
            ..JiraUser::default()
        };
        let by_email = WorklogAuthor {
            email_address: Some("ME@acme.io".into()),
            ..WorklogAuthor::default()
        };
        let by_account = WorklogAuthor {
            account_id: Some("acc-1".into()),
            ..WorklogAuthor::default()
        };
        let by_name = WorklogAuthor {
            name: Some("me".into()),
            ..WorklogAuthor::default()
        };
        let stranger = WorklogAuthor {
            account_id: Some("acc-2".into()),
            email_address: Some("other@acme.io".into()),
            ..WorklogAuthor::default()
        };
        assert!(is_own_worklog(Some(&by_email), "me@acme.io", None));
        assert!(is_own_worklog(Some(&by_account), "me@acme.io", Some(&me)));
        assert!(is_own_worklog(Some(&by_name), "", Some(&me)));
        assert!(!is_own_worklog(Some(&stranger), "me@acme.io", Some(&me)));
        assert!(!is_own_worklog(None, "me@acme.io", Some(&me)));
    }

    #[test]
    fn picker_markup_is_stripped() {
        assert_eq!(strip_html("<b>Log</b>in page "), "Login page");
        assert_eq!(strip_html("plain"), "plain");
    }

    #[tokio::test]
    async fn source_keeps_only_own_worklogs_of_the_day() {
        let mut server = mockito::Server::new_async().await;
        let myself = mock_myself(&mut server).await;
        let search = server
            .mock("POST", "/rest/api/2/search")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({
                "jql": "worklogDate = '2024-05-14' AND worklogAuthor = currentUser()"
            })))
            .with_status(200)
            .with_body(
                json!({"issues": [{"id": "100", "key": "ABC-1", "fields": {
                    "summary": "Login page", "labels": ["ops"], "issuetype": {"name": "Bug"}
                }}]})
                .to_string(),
            )
            .create_async()
            .await;
        let _mock = server
            .mock("GET", "/rest/api/2/issue/ABC-1/worklog")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({"worklogs": [
                    {"id": "1", "author": {"accountId": "acc-1"}, "started": "2024-05-14T08:00:00.000+0000", "timeSpentSeconds": 1800, "comment": "Review"},
                    {"id": "2", "author": {"accountId": "acc-1"}, "started": "2024-05-13T08:00:00.000+0000", "timeSpentSeconds": 600},
                    {"id": "3", "author": {"accountId": "acc-9"}, "started": "2024-05-14T10:00:00.000+0000", "timeSpentSeconds": 900},
                    {"id": "4", "author": {"emailAddress": "me@acme.io", "displayName": "Me"}, "started": "2024-05-14T11:00:00.000+0000", "timeSpentSeconds": 3600}
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let source = JiraSource::new(client_for(&server));
        let entries = source.fetch_worklogs(date()).await.unwrap();

        let ids: Vec<&str> = entries.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
        assert_eq!(entries[0].comment, "Review");
        assert_eq!(entries[1].comment, "Login page");
        assert_eq!(entries[1].author, "Me");
        assert_eq!(entries[0].labels, vec!["ops"]);
        assert_eq!(entries[0].issue_type, "Bug");
        assert_eq!(entries[0].started, "2024-05-14");
        myself.assert_async().await;
        search.assert_async().await;
    }

    #[tokio::test]
    async fn tempo_parents_group_window_and_keep_only_the_day() {
        let mut server = mockito::Server::new_async().await;
        let _myself = mock_myself(&mut server).await;
        let worklogs = server
            .mock("GET", "/4/worklogs/user/acc-1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("from".into(), "2024-05-08".into()),
                Matcher::UrlEncoded("to".into(), "2024-05-14".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({"results": [
                    {"tempoWorklogId": 91, "issue": {"id": 10001}, "timeSpentSeconds": 1800, "startDate": "2024-05-14", "description": "[ABC-1] Review"},
                    {"tempoWorklogId": 92, "issue": {"id": 10001}, "timeSpentSeconds": 600, "startDate": "2024-05-10"},
                    {"tempoWorklogId": 93, "issue": {"id": 10002}, "timeSpentSeconds": 900, "startDate": "2024-05-09"}
                ]})
                .to_string(),
            )
            .create_async()
            .await;
        let mut issue_mocks = Vec::new();
        for (id, key, summary) in [("10001", "DST-1", "Development"), ("10002", "DST-2", "Meetings")] {
            let mock = server
                .mock("GET", format!("/rest/api/2/issue/{}", id).as_str())
                .match_query(Matcher::Any)
                .with_status(200)
                .with_body(
                    json!({"id": id, "key": key, "fields": {
                        "summary": summary, "issuetype": {"name": "Task"}, "status": {"name": "In Progress"}
                    }})
                    .to_string(),
                )
                .create_async()
                .await;
            issue_mocks.push(mock);
        }

        let destination = JiraDestination::new(client_for(&server), Some(tempo_for(&server)));
        let parents = destination.fetch_parents(date()).await.unwrap();

        assert_eq!(parents.len(), 2);
        assert_eq!(parents[0].id, "10001");
        assert_eq!(parents[0].issue_key, "DST-1");
        assert_eq!(parents[0].status, "In Progress");
        assert_eq!(parents[0].children.len(), 1);
        assert_eq!(parents[0].children[0].id, "91");
        assert_eq!(parents[0].children[0].provenance_key(), Some("ABC-1"));
        assert_eq!(parents[0].initial_total_time_seconds, 1800);
        assert!(parents[1].children.is_empty());
        assert_eq!(parents[1].initial_total_time_seconds, 0);
        worklogs.assert_async().await;

        let cached = destination.resolve_issue("DST-2").await.unwrap().unwrap();
        assert_eq!(cached.numeric_id(), Some(10002));
    }

    #[tokio::test]
    async fn search_falls_back_to_issue_picker() {
        let mut server = mockito::Server::new_async().await;
        let search = server
            .mock("POST", "/rest/api/2/search")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({
                "jql": "key = \"DST-1\" OR summary ~ \"DST-1*\""
            })))
            .with_status(200)
            .with_body(json!({"issues": []}).to_string())
            .create_async()
            .await;
        let picker = server
            .mock("GET", "/rest/api/2/issue/picker")
            .match_query(Matcher::UrlEncoded("query".into(), "DST-1".into()))
            .with_status(200)
            .with_body(
                json!({"sections": [{"issues": [
                    {"id": 10001, "key": "DST-1", "summaryText": "<b>Log</b>in page"}
                ]}]})
                .to_string(),
            )
            .create_async()
            .await;

        let destination = JiraDestination::new(client_for(&server), None);
        let parents = destination.search_issues("DST-1").await.unwrap();
        assert!(destination.search_issues("D").await.unwrap().is_empty());

        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].issue_summary, "Login page");
        assert_eq!(parents[0].status, "Active");
        search.assert_async().await;
        picker.assert_async().await;
    }

    #[tokio::test]
    async fn native_writes_start_at_nine() {
        let mut server = mockito::Server::new_async().await;
        let create = server
            .mock("POST", "/rest/api/2/issue/DST-1/worklog")
            .match_query(Matcher::UrlEncoded("adjustEstimate".into(), "leave".into()))
            .match_body(Matcher::Json(json!({
                "timeSpentSeconds": 1800,
                "started": "2024-05-14T09:00:00.000+0000",
                "comment": "[ABC-1] Review"
            })))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/rest/api/2/issue/DST-1/worklog/77")
            .match_query(Matcher::Any)
            .with_status(204)
            .create_async()
            .await;

        let destination = JiraDestination::new(client_for(&server), None);
        let write = WorklogWrite {
            parent_key: "DST-1".into(),
            parent_issue_id: None,
            author_account_id: None,
            time_spent_seconds: 1800,
            start_date: "2024-05-14".into(),
            description: "[ABC-1] Review".into(),
            attributes: Vec::new(),
        };
        assert!(destination.create_worklog(&write).await.unwrap());
        assert!(destination.delete_worklog("77", "DST-1").await.unwrap());
        create.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn tempo_writes_carry_attributes_and_deletes_use_tempo_ids() {
        let mut server = mockito::Server::new_async().await;
        let create = server
            .mock("POST", "/4/worklogs")
            .match_body(Matcher::Json(json!({
                "issueId": 10001,
                "timeSpentSeconds": 1800,
                "startDate": "2024-05-14",
                "startTime": "09:00:00",
                "description": "[ABC-1] Review",
                "authorAccountId": "acc-1",
                "attributes": [{"key": "_Category_", "value": "Coding"}]
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/4/worklogs/91")
            .with_status(204)
            .create_async()
            .await;

        let destination = JiraDestination::new(client_for(&server), Some(tempo_for(&server)));
        let write = WorklogWrite {
            parent_key: "DST-1".into(),
            parent_issue_id: Some(10001),
            author_account_id: Some("acc-1".into()),
            time_spent_seconds: 1800,
            start_date: "2024-05-14".into(),
            description: "[ABC-1] Review".into(),
            attributes: vec![AttributeChoice {
                key: "_Category_".into(),
                value: "Coding".into(),
            }],
        };
        assert!(destination.uses_time_tracking_addon());
        assert!(destination.create_worklog(&write).await.unwrap());
        assert!(destination.delete_worklog("91", "DST-1").await.unwrap());
        create.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn failed_writes_surface_as_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/rest/api/2/issue/DST-9/worklog")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(json!({"errorMessages": ["Issue does not exist"]}).to_string())
            .create_async()
            .await;

        let destination = JiraDestination::new(client_for(&server), None);
        let write = WorklogWrite {
            parent_key: "DST-9".into(),
            parent_issue_id: None,
            author_account_id: None,
            time_spent_seconds: 60,
            start_date: "2024-05-14".into(),
            description: "[ABC-1] x".into(),
            attributes: Vec::new(),
        };
        assert!(matches!(
            destination.create_worklog(&write).await,
            Err(BridgeError::Remote(_))
        ));
    }
}
