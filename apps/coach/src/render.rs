//! Plain-text rendering of the view state for the terminal.

use std::fmt::Write;

use crate::auth::AuthState;
use crate::errors::CoachError;
use crate::messages::Messages;
use crate::models::analysis::{AnalysisResult, HealthStatus, MatchLabel};
use crate::state::{Action, ViewState};

const RULE: &str = "────────────────────────────────────────";

pub fn match_label(label: MatchLabel, messages: &Messages) -> &'static str {
    match label {
        MatchLabel::Excellent => messages.label_excellent,
        MatchLabel::Good => messages.label_good,
        MatchLabel::Fair => messages.label_fair,
        MatchLabel::Weak => messages.label_weak,
    }
}

/// Banner shown when login is not configured, otherwise the sign-in status.
pub fn render_auth(state: &ViewState, messages: &Messages) -> String {
    if !state.auth_available {
        return messages.auth_unavailable.to_string();
    }
    if state.auth == AuthState::Pending {
        return messages.auth_pending.to_string();
    }
    match state.display_name() {
        Some(name) => messages.logged_in_as.replace("{name}", &name),
        None => messages.logged_out.to_string(),
    }
}

pub fn render_error(err: &CoachError, hint_url: Option<&str>, messages: &Messages) -> String {
    let mut out = format!("{}\n  {err}", messages.error_heading);
    if let Some(url) = hint_url {
        let _ = write!(out, "\n  {}", messages.backend_hint.replace("{url}", url));
    }
    out
}

pub fn render_health(health: &HealthStatus, messages: &Messages) -> String {
    let rows = [
        (messages.status, &health.status),
        (messages.service, &health.service),
        (messages.timestamp, &health.timestamp),
    ];
    let width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0) + 1;

    let mut out = format!("✅ {}", messages.backend_healthy);
    for (key, value) in rows {
        let _ = write!(out, "\n  {:<width$} {value}", format!("{key}:"));
    }
    out
}

pub fn render_analysis(result: &AnalysisResult, messages: &Messages) -> String {
    let mut out = format!(
        "{}: {}% ({})",
        messages.match_heading,
        result.match_percentage,
        match_label(result.label(), messages)
    );
    for (heading, items) in [
        (messages.strengths, &result.strengths),
        (messages.weaknesses, &result.weaknesses),
        (messages.suggestions, &result.suggestions),
        (messages.learning_suggestions, &result.learning_suggestions),
    ] {
        if items.is_empty() {
            continue;
        }
        let _ = write!(out, "\n\n{heading}");
        for item in items {
            let _ = write!(out, "\n  • {item}");
        }
    }
    out
}

/// Whole screen: auth line, error box, health card, upload line, analysis
/// card, then the API URL footer. Sections without content are skipped.
pub fn render_view(state: &ViewState, messages: &Messages, api_url: &str) -> String {
    let mut sections = vec![render_auth(state, messages)];

    if let Some(err) = &state.error {
        let hint = (state.last_action == Some(Action::Health)).then_some(api_url);
        sections.push(render_error(err, hint, messages));
    }
    if let Some(health) = &state.health {
        sections.push(render_health(health, messages));
    }
    if let Some(name) = &state.file_name {
        sections.push(messages.uploaded.replace("{name}", name));
    }
    if let Some(result) = &state.result {
        sections.push(render_analysis(result, messages));
    }
    sections.push(format!("{RULE}\n{}", messages.api_url.replace("{url}", api_url)));

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Locale;
    use crate::models::user::{User, UserMetadata};

    fn en() -> &'static Messages {
        Locale::En.messages()
    }

    fn result(pct: f64) -> AnalysisResult {
        AnalysisResult {
            match_percentage: pct,
            strengths: vec!["Rust".into(), "Tokio".into()],
            weaknesses: vec![],
            suggestions: vec!["Add metrics".into()],
            learning_suggestions: vec!["Kubernetes".into()],
        }
    }

    #[test]
    fn test_analysis_card() {
        let out = render_analysis(&result(85.0), en());
        assert!(out.starts_with("Match: 85% (Excellent match)"));
        assert!(out.contains("Strengths\n  • Rust\n  • Tokio"));
        assert!(out.contains("What to learn\n  • Kubernetes"));
        assert!(!out.contains("Weaknesses"));
    }

    #[test]
    fn test_float_percentage_renders_whole() {
        let parsed: AnalysisResult =
            serde_json::from_str(r#"{"match_percentage":85.0,"strengths":[]}"#).unwrap();
        let out = render_analysis(&parsed, en());
        assert_eq!(out, "Match: 85% (Excellent match)");

        assert!(render_analysis(&result(72.5), en()).starts_with("Match: 72.5% (Good match)"));
    }

    #[test]
    fn test_labels_follow_thresholds() {
        assert!(render_analysis(&result(79.0), en()).contains("Good match"));
        assert!(render_analysis(&result(45.0), en()).contains("Fair match"));
        assert!(render_analysis(&result(10.0), en()).contains("Weak match"));
    }

    #[test]
    fn test_polish_card() {
        let out = render_analysis(&result(90.0), Locale::Pl.messages());
        assert!(out.contains("90%"));
        assert!(out.contains("Doskonałe dopasowanie"));
    }

    #[test]
    fn test_health_card_is_verbatim() {
        let health = HealthStatus {
            status: "healthy".into(),
            service: "career-coach-api".into(),
            timestamp: "2024-05-01T12:00:00.123456".into(),
        };
        let out = render_health(&health, en());
        assert!(out.contains("Backend is healthy!"));
        assert!(out.contains("healthy"));
        assert!(out.contains("career-coach-api"));
        assert!(out.contains("2024-05-01T12:00:00.123456"));
    }

    #[test]
    fn test_health_error_carries_hint() {
        let mut state = ViewState::new(false);
        state.fail(Action::Health, CoachError::http(Some(503), "HTTP error! status: 503"));
        let out = render_view(&state, en(), "http://localhost:8000");
        assert!(out.contains("Error:\n  HTTP error! status: 503"));
        assert!(out.contains("Make sure backend is running on http://localhost:8000"));
    }

    #[test]
    fn test_analysis_error_has_no_hint() {
        let mut state = ViewState::new(false);
        state.fail(Action::Analyze, CoachError::http(Some(500), "X"));
        let out = render_view(&state, en(), "http://localhost:8000");
        assert!(out.contains("  X"));
        assert!(!out.contains("Make sure backend"));
    }

    #[test]
    fn test_auth_line() {
        let mut state = ViewState::new(true);
        assert_eq!(render_auth(&state, en()), "Not logged in");

        state.auth = AuthState::Pending;
        assert_eq!(render_auth(&state, en()), "Signing in...");

        state.auth = AuthState::Authenticated(User {
            id: uuid::Uuid::new_v4(),
            email: Some("ada@example.com".into()),
            user_metadata: UserMetadata::default(),
        });
        assert_eq!(render_auth(&state, en()), "Logged in as ada@example.com");

        assert_eq!(render_auth(&ViewState::new(false), en()), en().auth_unavailable);
    }

    #[test]
    fn test_view_footer_and_upload_line() {
        let mut state = ViewState::new(false);
        state.upload_succeeded("cv.pdf".into(), "text".into());
        let out = render_view(&state, en(), "http://api.test");
        assert!(out.contains("CV uploaded: cv.pdf"));
        assert!(out.ends_with("API URL: http://api.test"));
    }
}
