// Credential check against Jira's /myself endpoint

use super::{is_transient, JiraClient, TrackerReply};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthVerdict {
    Authenticated { status: u16 },
    /// Site outage, reported without upstream details
    Unavailable,
    /// Any other non-OK answer. Transport failures report status 0.
    Rejected { status: u16, details: String },
}

pub fn classify(reply: &TrackerReply) -> AuthVerdict {
    if reply.is_success() {
        AuthVerdict::Authenticated {
            status: reply.status,
        }
    } else if is_transient(reply) {
        AuthVerdict::Unavailable
    } else {
        AuthVerdict::Rejected {
            status: reply.status,
            details: reply.body.clone(),
        }
    }
}

async fn myself_reply(client: &JiraClient) -> Result<TrackerReply, String> {
    client.myself().await.map_err(|e| e.to_string())
}

/// Call /myself, retrying once on a transient failure
pub async fn check_auth(client: &JiraClient) -> AuthVerdict {
    let first = myself_reply(client)
        .await
        .unwrap_or_else(|message| TrackerReply::new(0, message));

    let reply = if !first.is_success() && is_transient(&first) {
        log::info!("[jira] /myself transient failure ({}), retrying once", first.status);
        match myself_reply(client).await {
            Ok(retry) => retry,
            Err(e) => {
                log::warn!("[jira] /myself retry failed: {}", e);
                first
            }
        }
    } else {
        first
    };

    let verdict = classify(&reply);
    log::info!("[jira] auth-check: {}", verdict_label(&verdict));
    verdict
}

fn verdict_label(verdict: &AuthVerdict) -> &'static str {
    match verdict {
        AuthVerdict::Authenticated { .. } => "authenticated",
        AuthVerdict::Unavailable => "unavailable",
        AuthVerdict::Rejected { .. } => "rejected",
    }
}
