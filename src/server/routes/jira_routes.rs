// Jira issue lookup and credential check

use crate::jira::{check_auth, map_issue_fields, resolve_issue, AuthVerdict, Resolution};
use crate::models::{FallbackIssue, IssueFields};
use crate::server::error::ApiError;
use crate::server::ServerAppState;
use crate::utils::{snippet, strip_html};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

const DETAILS_MAX_CHARS: usize = 500;

#[derive(Debug, Default, Deserialize)]
pub struct StoryQuery {
    #[serde(default)]
    pub debug: Option<String>,
    #[serde(default)]
    pub clean: Option<String>,
}

fn flag_set(value: &Option<String>) -> bool {
    value.as_deref() == Some("true")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StoryPayload {
    #[serde(flatten)]
    fields: IssueFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_jira_response: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FallbackBody {
    error: &'static str,
    details: String,
    fallback_issues: Vec<FallbackIssue>,
}

#[derive(Debug, Serialize)]
struct TrackerErrorBody {
    error: &'static str,
    details: String,
}

#[derive(Debug, Serialize)]
struct AuthCheckBody {
    ok: bool,
    status: u16,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// GET /api/jira/story/:id
pub async fn story_handler(
    State(state): State<ServerAppState>,
    Path(issue_key): Path<String>,
    Query(query): Query<StoryQuery>,
) -> Response {
    let jira = match state.jira() {
        Ok(jira) => jira,
        Err(e) => return ApiError::from(e).into_response(),
    };

    log::info!("[jira] Fetching issue {}", issue_key);

    match resolve_issue(jira, &issue_key).await {
        Resolution::Found(reply) => {
            let mut fields = map_issue_fields(&reply.body);
            if flag_set(&query.clean) {
                fields.description = strip_html(&fields.description);
                fields.acceptance_criteria = strip_html(&fields.acceptance_criteria);
            }
            let payload = StoryPayload {
                fields,
                raw_jira_response: flag_set(&query.debug).then_some(reply.body),
            };
            Json(payload).into_response()
        }
        Resolution::Candidates { original, issues } => {
            log::info!(
                "[jira] {} not accessible (status {}); returning {} fallback issues",
                issue_key,
                original.status,
                issues.len()
            );
            let body = FallbackBody {
                error: "Issue not found or inaccessible",
                details: snippet(&original.body, DETAILS_MAX_CHARS),
                fallback_issues: issues,
            };
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
        Resolution::GaveUp { original } => {
            log::warn!(
                "[jira] Failed to fetch {} (status {})",
                issue_key,
                original.status
            );
            let status = StatusCode::from_u16(original.status).unwrap_or(StatusCode::BAD_GATEWAY);
            let body = TrackerErrorBody {
                error: "Failed to fetch Jira issue",
                details: snippet(&original.body, DETAILS_MAX_CHARS),
            };
            (status, Json(body)).into_response()
        }
        Resolution::Unreachable(message) => {
            log::error!("[jira] Could not reach Jira for {}: {}", issue_key, message);
            ApiError::Internal.into_response()
        }
    }
}

/// GET /api/jira/auth-check
pub async fn auth_check_handler(State(state): State<ServerAppState>) -> Response {
    let jira = match state.jira() {
        Ok(jira) => jira,
        Err(_) => {
            let body = AuthCheckBody {
                ok: false,
                status: 500,
                message: "Jira credentials not configured on server",
                details: None,
            };
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        }
    };

    match check_auth(jira).await {
        AuthVerdict::Authenticated { status } => Json(AuthCheckBody {
            ok: true,
            status,
            message: "Authenticated",
            details: None,
        })
        .into_response(),
        AuthVerdict::Unavailable => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(AuthCheckBody {
                ok: false,
                status: 503,
                message: "Jira site temporarily unavailable",
                details: None,
            }),
        )
            .into_response(),
        AuthVerdict::Rejected { status, details } => Json(AuthCheckBody {
            ok: false,
            status,
            message: "Jira /myself returned non-OK",
            details: Some(details),
        })
        .into_response(),
    }
}
