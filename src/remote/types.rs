//! Raw payload shapes returned by the Jira REST v3 API.
//!
//! Only the fields the mirror needs are modelled. Everything nested is
//! optional and defaults to absent. Identifiers are accepted as either JSON
//! strings or numbers and normalized to `String`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept a string or numeric id.
fn string_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Optional variant of [`string_id`]; `null` and missing are `None`.
fn opt_string_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Treat an explicit `null` like a missing field.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A user reference (project lead, worklog author).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    pub account_id: Option<String>,
    pub display_name: Option<String>,
}

/// Entry of `GET /rest/api/3/project/search`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProject {
    #[serde(deserialize_with = "string_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub key: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    pub project_type_key: Option<String>,
    /// Legacy type field, used when `projectTypeKey` is absent
    pub project_type: Option<String>,
    pub lead: Option<RemoteUser>,
}

/// Anything with a display name (status, issue type).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteNamed {
    pub name: Option<String>,
}

/// A reference to another entity by id and key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteRef {
    #[serde(default, deserialize_with = "opt_string_id")]
    pub id: Option<String>,
    pub key: Option<String>,
}

/// Link type description embedded in an issue link.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteLinkType {
    pub name: Option<String>,
    pub inward: Option<String>,
    pub outward: Option<String>,
}

/// One entry of an issue's `fields.issuelinks`.
///
/// Per the remote's contract exactly one of `inward_issue` and
/// `outward_issue` is set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteIssueLink {
    #[serde(default, deserialize_with = "opt_string_id")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub link_type: Option<RemoteLinkType>,
    pub inward_issue: Option<RemoteRef>,
    pub outward_issue: Option<RemoteRef>,
}

/// The projected `fields` object of a searched issue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteIssueFields {
    pub summary: Option<String>,
    pub status: Option<RemoteNamed>,
    pub issuetype: Option<RemoteNamed>,
    pub project: Option<RemoteRef>,
    pub created: Option<String>,
    pub updated: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub issuelinks: Vec<RemoteIssueLink>,
}

/// Entry of `GET /rest/api/3/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteIssue {
    #[serde(deserialize_with = "string_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub key: String,
    #[serde(default, deserialize_with = "null_default")]
    pub fields: RemoteIssueFields,
}

/// Worklog visibility restriction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteVisibility {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub value: Option<String>,
}

/// Entry of `GET /rest/api/3/issue/{id}/worklog`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteWorklog {
    #[serde(deserialize_with = "string_id")]
    pub id: String,
    pub author: Option<RemoteUser>,
    /// Plain string or an ADF document
    pub comment: Option<Value>,
    /// Kept raw so non-numeric values map to absent instead of failing
    pub time_spent_seconds: Option<Value>,
    pub started: Option<String>,
    pub updated: Option<String>,
    pub visibility: Option<RemoteVisibility>,
}
