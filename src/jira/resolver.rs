//! Issue lookup with retry and project-search fallback
//!
//! The policy is a small state machine. [`transition`] is pure: it consumes the
//! outcome of the last request and returns either the next request to make or
//! a terminal [`Resolution`]. [`resolve_issue`] drives it against a live
//! [`JiraClient`].
//!
//! ```text
//! FetchPrimary --2xx--------------------------> Found
//!      |  transient -> RetryOnce --2xx--------> Found
//!      |                   \--other-----------> Search
//!      |  404/403 --------------------------> Search
//!      |  other status ---------------------> GaveUp
//!      \  transport error ------------------> Unreachable
//! Search(modern) --410--> Search(legacy)
//! Search --2xx + decodable--> Candidates, otherwise GaveUp
//! ```

use super::fields::parse_search_results;
use super::{is_transient, project_key, JiraClient, SearchEndpoint, TrackerReply};
use crate::models::FallbackIssue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverState {
    FetchPrimary,
    RetryOnce {
        original: TrackerReply,
    },
    Search {
        original: TrackerReply,
        project_key: String,
        endpoint: SearchEndpoint,
    },
}

/// Outcome of the request issued for the previous action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverEvent {
    Reply(TrackerReply),
    TransportError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverAction {
    FetchIssue,
    SearchProject {
        project_key: String,
        endpoint: SearchEndpoint,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Issue body from a successful fetch
    Found(TrackerReply),
    /// Direct lookup failed but the project search returned candidates (possibly none)
    Candidates {
        original: TrackerReply,
        issues: Vec<FallbackIssue>,
    },
    /// Direct lookup failed and no fallback applied
    GaveUp { original: TrackerReply },
    /// The first request never got a response
    Unreachable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Continue {
        next: ResolverState,
        action: ResolverAction,
    },
    Complete(Resolution),
}

/// Starting state and the first request to issue
pub fn initial() -> (ResolverState, ResolverAction) {
    (ResolverState::FetchPrimary, ResolverAction::FetchIssue)
}

pub fn transition(state: ResolverState, event: ResolverEvent, issue_key: &str) -> Transition {
    match state {
        ResolverState::FetchPrimary => match event {
            ResolverEvent::Reply(reply) if reply.is_success() => {
                Transition::Complete(Resolution::Found(reply))
            }
            ResolverEvent::Reply(reply) if is_transient(&reply) => Transition::Continue {
                next: ResolverState::RetryOnce { original: reply },
                action: ResolverAction::FetchIssue,
            },
            ResolverEvent::Reply(reply) if matches!(reply.status, 403 | 404) => {
                start_search(reply, issue_key)
            }
            ResolverEvent::Reply(reply) => {
                Transition::Complete(Resolution::GaveUp { original: reply })
            }
            ResolverEvent::TransportError(message) => {
                Transition::Complete(Resolution::Unreachable(message))
            }
        },

        ResolverState::RetryOnce { original } => match event {
            ResolverEvent::Reply(reply) if reply.is_success() => {
                Transition::Complete(Resolution::Found(reply))
            }
            _ => start_search(original, issue_key),
        },

        ResolverState::Search {
            original,
            project_key,
            endpoint,
        } => match event {
            ResolverEvent::Reply(TrackerReply { status: 410, .. })
                if endpoint == SearchEndpoint::Modern =>
            {
                Transition::Continue {
                    next: ResolverState::Search {
                        original,
                        project_key: project_key.clone(),
                        endpoint: SearchEndpoint::Legacy,
                    },
                    action: ResolverAction::SearchProject {
                        project_key,
                        endpoint: SearchEndpoint::Legacy,
                    },
                }
            }
            ResolverEvent::Reply(reply) if reply.is_success() => {
                match parse_search_results(&reply.body) {
                    Some(issues) => {
                        Transition::Complete(Resolution::Candidates { original, issues })
                    }
                    None => Transition::Complete(Resolution::GaveUp { original }),
                }
            }
            _ => Transition::Complete(Resolution::GaveUp { original }),
        },
    }
}

fn start_search(original: TrackerReply, issue_key: &str) -> Transition {
    match project_key(issue_key) {
        Some(key) => Transition::Continue {
            next: ResolverState::Search {
                original,
                project_key: key.to_string(),
                endpoint: SearchEndpoint::Modern,
            },
            action: ResolverAction::SearchProject {
                project_key: key.to_string(),
                endpoint: SearchEndpoint::Modern,
            },
        },
        None => Transition::Complete(Resolution::GaveUp { original }),
    }
}

/// Run the lookup policy for one issue key
pub async fn resolve_issue(client: &JiraClient, issue_key: &str) -> Resolution {
    let (mut state, mut action) = initial();

    loop {
        let outcome = match &action {
            ResolverAction::FetchIssue => client.get_issue(issue_key).await,
            ResolverAction::SearchProject {
                project_key,
                endpoint,
            } => {
                log::info!(
                    "[jira] Searching project {} ({:?} endpoint) after failed lookup of {}",
                    project_key,
                    endpoint,
                    issue_key
                );
                client.search_project(project_key, *endpoint).await
            }
        };

        let event = match outcome {
            Ok(reply) => ResolverEvent::Reply(reply),
            Err(e) => {
                log::warn!("[jira] Request failed: {}", e);
                ResolverEvent::TransportError(e.to_string())
            }
        };

        match transition(state, event, issue_key) {
            Transition::Continue { next, action: next_action } => {
                state = next;
                action = next_action;
            }
            Transition::Complete(resolution) => return resolution,
        }
    }
}
