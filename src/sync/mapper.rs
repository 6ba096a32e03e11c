//! Remote payload to canonical record mapping.
//!
//! Pure functions; nothing here touches the network or the store.

use chrono::DateTime;
use serde_json::Value;
use tracing::warn;

use crate::model::{Issue, IssueLink, Project, Worklog};
use crate::remote::{RemoteIssue, RemoteIssueLink, RemoteProject, RemoteWorklog};

use super::adf::flatten_document;

/// An issue plus the raw links it carried, which feed [`derive_links`].
#[derive(Debug, Clone)]
pub struct MappedIssue {
    pub issue: Issue,
    pub links: Vec<RemoteIssueLink>,
}

/// Map a project listing entry.
#[must_use]
pub fn map_project(remote: &RemoteProject, synced_at: i64) -> Project {
    Project {
        id: remote.id.clone(),
        key: remote.key.clone(),
        name: remote.name.clone(),
        project_type: remote
            .project_type_key
            .clone()
            .or_else(|| remote.project_type.clone()),
        lead_account_id: remote.lead.as_ref().and_then(|l| l.account_id.clone()),
        last_synced_at: synced_at,
    }
}

/// Map a searched issue, keeping its embedded links for edge derivation.
#[must_use]
pub fn map_issue(remote: &RemoteIssue) -> MappedIssue {
    let fields = &remote.fields;
    MappedIssue {
        issue: Issue {
            id: remote.id.clone(),
            key: remote.key.clone(),
            project_id: fields.project.as_ref().and_then(|p| p.id.clone()),
            summary: fields.summary.clone(),
            status: fields.status.as_ref().and_then(|s| s.name.clone()),
            issue_type: fields.issuetype.as_ref().and_then(|t| t.name.clone()),
            created_at: fields.created.as_deref().and_then(parse_timestamp),
            updated_at: fields.updated.as_deref().and_then(parse_timestamp),
        },
        links: fields.issuelinks.clone(),
    }
}

/// Derive directed edges from the links embedded in each issue.
///
/// `inwardIssue` gives `inward -> current`, `outwardIssue` gives
/// `current -> outward`. An entry carrying both yields two edges sharing
/// one link id; the second write wins in the store.
#[must_use]
pub fn derive_links(issues: &[MappedIssue]) -> Vec<IssueLink> {
    let mut edges = Vec::new();

    for mapped in issues {
        let current = &mapped.issue.id;

        for link in &mapped.links {
            let inward_id = link.inward_issue.as_ref().and_then(|r| r.id.clone());
            let outward_id = link.outward_issue.as_ref().and_then(|r| r.id.clone());
            let link_type = link.link_type.as_ref();

            let link_id = link.id.clone().unwrap_or_else(|| {
                let type_name = link_type.and_then(|t| t.name.as_deref()).unwrap_or("");
                let counterpart = inward_id.as_deref().or(outward_id.as_deref()).unwrap_or("");
                format!("{current}-{type_name}-{counterpart}")
            });

            let edge = |source: &str, target: &str| IssueLink {
                link_id: link_id.clone(),
                type_name: link_type.and_then(|t| t.name.clone()),
                inward_description: link_type.and_then(|t| t.inward.clone()),
                outward_description: link_type.and_then(|t| t.outward.clone()),
                source_issue_id: source.to_string(),
                target_issue_id: target.to_string(),
            };

            if let Some(inward) = &inward_id {
                edges.push(edge(inward, current));
            }
            if let Some(outward) = &outward_id {
                edges.push(edge(current, outward));
            }
        }
    }

    edges
}

/// Map one worklog entry of `issue_id`.
#[must_use]
pub fn map_worklog(issue_id: &str, remote: &RemoteWorklog) -> Worklog {
    let comment = match &remote.comment {
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(doc @ (Value::Object(_) | Value::Array(_))) => flatten_document(Some(doc)),
        _ => None,
    };

    Worklog {
        worklog_id: remote.id.clone(),
        issue_id: issue_id.to_string(),
        author_account_id: remote.author.as_ref().and_then(|a| a.account_id.clone()),
        author_display_name: remote.author.as_ref().and_then(|a| a.display_name.clone()),
        time_spent_seconds: remote.time_spent_seconds.as_ref().and_then(as_seconds),
        started_at: remote.started.as_deref().and_then(parse_timestamp),
        updated_at: remote.updated.as_deref().and_then(parse_timestamp),
        visibility_type: remote.visibility.as_ref().and_then(|v| v.kind.clone()),
        visibility_value: remote.visibility.as_ref().and_then(|v| v.value.clone()),
        comment,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn as_seconds(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

/// Parse a remote timestamp to Unix milliseconds.
///
/// Accepts RFC 3339 and the remote's compact offset form
/// (`2024-03-01T09:30:00.000+0000`).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"));

    match parsed {
        Ok(dt) => Some(dt.timestamp_millis()),
        Err(e) => {
            warn!(value = raw, error = %e, "Unparseable timestamp");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue(value: Value) -> MappedIssue {
        map_issue(&serde_json::from_value(value).unwrap())
    }

    fn worklog(value: Value) -> Worklog {
        map_worklog("10", &serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_map_project_type_fallback() {
        let remote: RemoteProject = serde_json::from_value(json!({
            "id": "1", "key": "OPS", "name": "Operations",
            "projectType": "business",
            "lead": {"accountId": "acc-1", "displayName": "Lee"}
        }))
        .unwrap();
        let project = map_project(&remote, 1_700_000_000_000);

        assert_eq!(project.project_type.as_deref(), Some("business"));
        assert_eq!(project.lead_account_id.as_deref(), Some("acc-1"));
        assert_eq!(project.last_synced_at, 1_700_000_000_000);

        let remote: RemoteProject = serde_json::from_value(json!({
            "id": 2, "key": "WEB", "name": "Web",
            "projectTypeKey": "software", "projectType": "business"
        }))
        .unwrap();
        let project = map_project(&remote, 0);
        assert_eq!(project.id, "2");
        assert_eq!(project.project_type.as_deref(), Some("software"));
        assert_eq!(project.lead_account_id, None);
    }

    #[test]
    fn test_map_issue_fields() {
        let mapped = issue(json!({
            "id": "10", "key": "OPS-1",
            "fields": {
                "summary": "Rotate keys",
                "status": {"name": "In Progress"},
                "issuetype": {"name": "Task"},
                "project": {"id": "1", "key": "OPS"},
                "created": "2024-03-01T09:30:00.000+0000",
                "updated": "2024-03-02T10:00:00Z"
            }
        }));

        let i = &mapped.issue;
        assert_eq!(i.project_id.as_deref(), Some("1"));
        assert_eq!(i.status.as_deref(), Some("In Progress"));
        assert_eq!(i.issue_type.as_deref(), Some("Task"));
        assert_eq!(i.created_at, Some(1_709_285_400_000));
        assert_eq!(i.updated_at, Some(1_709_373_600_000));
        assert!(mapped.links.is_empty());
    }

    #[test]
    fn test_map_issue_missing_nested_fields() {
        let mapped = issue(json!({"id": "11", "key": "OPS-2", "fields": {"created": "yesterday"}}));
        assert_eq!(mapped.issue.project_id, None);
        assert_eq!(mapped.issue.summary, None);
        assert_eq!(mapped.issue.created_at, None);
    }

    #[test]
    fn test_map_issue_null_fields_and_links() {
        let mapped = issue(json!({"id": "12", "key": "OPS-3", "fields": null}));
        assert_eq!(mapped.issue.key, "OPS-3");
        assert_eq!(mapped.issue.status, None);
        assert!(mapped.links.is_empty());

        let mapped = issue(json!({
            "id": "13", "key": "OPS-4",
            "fields": {"summary": "x", "issuelinks": null}
        }));
        assert_eq!(mapped.issue.summary.as_deref(), Some("x"));
        assert!(derive_links(&[mapped]).is_empty());
    }

    #[test]
    fn test_inward_link_points_at_current() {
        let mapped = issue(json!({
            "id": "10", "key": "OPS-10",
            "fields": {"issuelinks": [{
                "id": "500",
                "type": {"name": "Blocks", "inward": "is blocked by", "outward": "blocks"},
                "inwardIssue": {"id": "5", "key": "OPS-5"}
            }]}
        }));
        let edges = derive_links(&[mapped]);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].link_id, "500");
        assert_eq!(edges[0].source_issue_id, "5");
        assert_eq!(edges[0].target_issue_id, "10");
        assert_eq!(edges[0].inward_description.as_deref(), Some("is blocked by"));
    }

    #[test]
    fn test_outward_link_points_away_from_current() {
        let mapped = issue(json!({
            "id": "10", "key": "OPS-10",
            "fields": {"issuelinks": [{
                "id": 501,
                "type": {"name": "Relates"},
                "outwardIssue": {"id": 7}
            }]}
        }));
        let edges = derive_links(&[mapped]);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].link_id, "501");
        assert_eq!(edges[0].source_issue_id, "10");
        assert_eq!(edges[0].target_issue_id, "7");
    }

    #[test]
    fn test_link_without_id_gets_derived_id() {
        let mapped = issue(json!({
            "id": "10", "key": "OPS-10",
            "fields": {"issuelinks": [{
                "type": {"name": "Blocks"},
                "outwardIssue": {"id": "7"}
            }]}
        }));
        let edges = derive_links(&[mapped]);
        assert_eq!(edges[0].link_id, "10-Blocks-7");
    }

    // Suspicious: the remote should never send both sides on one entry, but
    // if it does we emit two edges with the same link id and the store keeps
    // whichever is written last.
    #[test]
    fn test_link_with_both_sides_yields_two_edges() {
        let mapped = issue(json!({
            "id": "10", "key": "OPS-10",
            "fields": {"issuelinks": [{
                "id": "502",
                "type": {"name": "Blocks"},
                "inwardIssue": {"id": "5"},
                "outwardIssue": {"id": "7"}
            }]}
        }));
        let edges = derive_links(&[mapped]);

        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|e| e.link_id == "502"));
        assert_eq!((edges[0].source_issue_id.as_str(), edges[0].target_issue_id.as_str()), ("5", "10"));
        assert_eq!((edges[1].source_issue_id.as_str(), edges[1].target_issue_id.as_str()), ("10", "7"));
    }

    #[test]
    fn test_link_without_counterpart_is_skipped() {
        let mapped = issue(json!({
            "id": "10", "key": "OPS-10",
            "fields": {"issuelinks": [{"id": "503", "type": {"name": "Blocks"}}]}
        }));
        assert!(derive_links(&[mapped]).is_empty());
    }

    #[test]
    fn test_worklog_comment_shapes() {
        let plain = worklog(json!({"id": "w1", "comment": "Deployed"}));
        assert_eq!(plain.comment.as_deref(), Some("Deployed"));

        let empty = worklog(json!({"id": "w2", "comment": ""}));
        assert_eq!(empty.comment, None);

        let doc = worklog(json!({"id": "w3", "comment": {
            "type": "doc",
            "content": [{"type": "paragraph", "content": [{"type": "text", "text": "Fixed the bug"}]}]
        }}));
        assert_eq!(doc.comment.as_deref(), Some("Fixed the bug"));

        let number = worklog(json!({"id": "w4", "comment": 12}));
        assert_eq!(number.comment, None);
    }

    #[test]
    fn test_worklog_fields() {
        let w = worklog(json!({
            "id": 9001,
            "author": {"accountId": "acc-2", "displayName": "Dana"},
            "timeSpentSeconds": 5400.9,
            "started": "2024-03-01T09:30:00.000+0000",
            "visibility": {"type": "group", "value": "ops"}
        }));

        assert_eq!(w.worklog_id, "9001");
        assert_eq!(w.issue_id, "10");
        assert_eq!(w.author_display_name.as_deref(), Some("Dana"));
        assert_eq!(w.time_spent_seconds, Some(5400));
        assert_eq!(w.started_at, Some(1_709_285_400_000));
        assert_eq!(w.updated_at, None);
        assert_eq!(w.visibility_type.as_deref(), Some("group"));
        assert_eq!(w.visibility_value.as_deref(), Some("ops"));
    }

    #[test]
    fn test_worklog_non_numeric_time_spent() {
        let w = worklog(json!({"id": "w5", "timeSpentSeconds": "1h"}));
        assert_eq!(w.time_spent_seconds, None);
    }
}
