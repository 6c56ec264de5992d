//! Identity of the authenticated Jira user (`/myself`).

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    /// Cloud identifier; absent on Server/Data Center.
    pub account_id: Option<String>,
    /// Username; only populated on Server/Data Center.
    pub name: Option<String>,
    pub email_address: Option<String>,
    pub display_name: Option<String>,
}
