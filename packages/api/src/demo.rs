//! # Canned demo data
//!
//! While demo mode is active nothing reaches the backend. Reads are answered from the
//! table below, matched by substring of the request URL (first match wins); mutations
//! get [`mutation_response`]. `/api/me` is short enough to prefix unrelated routes
//! (`/api/metrics`), so it only matches as a whole path segment.
//!
//! | URL contains | Response |
//! |--------------|----------|
//! | `/api/auth/user`, `/api/me` | the demo user |
//! | `/api/logs` | LifeOps journal entries |
//! | `/api/ideas` | ThinkOps ideas |
//! | `/api/goals` | goals |
//! | `/api/checkins` | daily check-ins |
//! | `/api/teaching` | teaching-assistant requests |
//! | `/api/dashboard` | dashboard summary (object) |
//! | anything else | `[]` |

use serde_json::{json, Value};

use crate::models::demo_user;

/// Canned answer for a read of `url` in demo mode.
pub fn response_for(url: &str) -> Value {
    if url.contains("/api/auth/user") || contains_segment(url, "/api/me") {
        return serde_json::to_value(demo_user()).unwrap_or(Value::Null);
    }
    if url.contains("/api/logs") {
        return logs();
    }
    if url.contains("/api/ideas") {
        return ideas();
    }
    if url.contains("/api/goals") {
        return goals();
    }
    if url.contains("/api/checkins") {
        return checkins();
    }
    if url.contains("/api/teaching") {
        return teaching();
    }
    if url.contains("/api/dashboard") {
        return dashboard();
    }
    Value::Array(Vec::new())
}

/// Whether `path` occurs in `url` followed by the end of the path.
fn contains_segment(url: &str, path: &str) -> bool {
    url.match_indices(path).any(|(at, _)| {
        matches!(url[at + path.len()..].chars().next(), None | Some('/' | '?' | '#'))
    })
}

/// Synthesized success for a mutation in demo mode.
pub fn mutation_response() -> Value {
    json!({ "success": true, "demo": true })
}

fn logs() -> Value {
    json!([
        {
            "id": 1,
            "userId": "demo-user",
            "date": "2024-06-03",
            "energy": 7,
            "stress": 3,
            "mood": 8,
            "sleepHours": 7.5,
            "topWin": "Finished the trail map for the north ridge",
            "topFriction": "Too many open tabs",
            "tomorrowPriority": "Draft the workshop outline"
        },
        {
            "id": 2,
            "userId": "demo-user",
            "date": "2024-06-02",
            "energy": 5,
            "stress": 6,
            "mood": 6,
            "sleepHours": 6.0,
            "topWin": "Cleared the inbox",
            "topFriction": "Late start",
            "tomorrowPriority": "Morning walk before screens"
        },
        {
            "id": 3,
            "userId": "demo-user",
            "date": "2024-06-01",
            "energy": 8,
            "stress": 2,
            "mood": 9,
            "sleepHours": 8.0,
            "topWin": "Full day outdoors",
            "topFriction": "None worth noting",
            "tomorrowPriority": "Plan the week"
        }
    ])
}

fn ideas() -> Value {
    json!([
        {
            "id": 1,
            "userId": "demo-user",
            "title": "Field guide for local wildflowers",
            "pitch": "Photo-first pocket guide organised by bloom color",
            "status": "exploring",
            "excitement": 8,
            "feasibility": 6
        },
        {
            "id": 2,
            "userId": "demo-user",
            "title": "Weekly reflection prompts",
            "pitch": "Rotating prompts that feed the LifeOps journal",
            "status": "draft",
            "excitement": 6,
            "feasibility": 9
        }
    ])
}

fn goals() -> Value {
    json!([
        {
            "id": 1,
            "userId": "demo-user",
            "domain": "health",
            "title": "Walk 8k steps a day",
            "targetPerWeek": 5,
            "active": true
        },
        {
            "id": 2,
            "userId": "demo-user",
            "domain": "craft",
            "title": "Write 500 words",
            "targetPerWeek": 3,
            "active": true
        }
    ])
}

fn checkins() -> Value {
    json!([
        { "id": 1, "goalId": 1, "date": "2024-06-03", "done": true },
        { "id": 2, "goalId": 2, "date": "2024-06-03", "done": false }
    ])
}

fn teaching() -> Value {
    json!([
        {
            "id": 1,
            "userId": "demo-user",
            "grade": "7",
            "standard": "Ecosystems and energy flow",
            "topic": "Food webs",
            "timeBlock": "45 minutes"
        }
    ])
}

fn dashboard() -> Value {
    json!({
        "logsToday": 1,
        "openIdeas": 2,
        "activeGoals": 2,
        "weeklyCompletion": 0.6,
        "streakDays": 3
    })
}
