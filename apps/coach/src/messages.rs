//! User-facing text catalogues.
//!
//! Templates use `{placeholder}` markers filled with `str::replace`, the same way
//! the prompt templates are filled elsewhere.

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Pl,
}

impl Locale {
    pub fn messages(self) -> &'static Messages {
        match self {
            Locale::En => &EN,
            Locale::Pl => &PL,
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            "pl" | "pl-pl" => Ok(Locale::Pl),
            other => Err(format!("unsupported locale '{other}' (expected 'en' or 'pl')")),
        }
    }
}

#[derive(Debug)]
pub struct Messages {
    // validation
    pub unsupported_file_type: &'static str,
    pub file_too_large: &'static str,
    pub missing_cv: &'static str,
    pub missing_job_description: &'static str,
    pub missing_api_key: &'static str,
    pub request_in_flight: &'static str,

    // backend fallbacks
    pub upload_failed: &'static str,
    pub analysis_failed: &'static str,
    /// `{status}`
    pub health_http_error: &'static str,
    pub invalid_response: &'static str,
    /// `{url}`
    pub backend_hint: &'static str,

    // auth
    pub auth_error_prefix: &'static str,
    pub auth_unavailable: &'static str,
    pub auth_pending: &'static str,
    /// `{name}`
    pub logged_in_as: &'static str,
    pub logged_out: &'static str,
    pub press_enter_to_sign_out: &'static str,

    // result card
    pub error_heading: &'static str,
    pub match_heading: &'static str,
    pub strengths: &'static str,
    pub weaknesses: &'static str,
    pub suggestions: &'static str,
    pub learning_suggestions: &'static str,
    pub label_excellent: &'static str,
    pub label_good: &'static str,
    pub label_fair: &'static str,
    pub label_weak: &'static str,
    /// `{name}`
    pub uploaded: &'static str,

    // health card
    pub backend_healthy: &'static str,
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: &'static str,
    /// `{url}`
    pub api_url: &'static str,
}

static EN: Messages = Messages {
    unsupported_file_type: "Unsupported file type. Please upload a PDF or TXT file.",
    file_too_large: "File is too large. Maximum size is 10 MB.",
    missing_cv: "Please upload your CV first.",
    missing_job_description: "Please paste the job description.",
    missing_api_key: "Please enter your API key.",
    request_in_flight: "Another request is already in progress.",

    upload_failed: "Failed to upload file",
    analysis_failed: "Analysis failed",
    health_http_error: "HTTP error! status: {status}",
    invalid_response: "Unexpected response from server",
    backend_hint: "Make sure backend is running on {url}",

    auth_error_prefix: "Login error: ",
    auth_unavailable: "Login is unavailable: the auth provider is not configured.",
    auth_pending: "Signing in...",
    logged_in_as: "Logged in as {name}",
    logged_out: "Not logged in",
    press_enter_to_sign_out: "Press Enter to sign out...",

    error_heading: "Error:",
    match_heading: "Match",
    strengths: "Strengths",
    weaknesses: "Weaknesses",
    suggestions: "Suggestions",
    learning_suggestions: "What to learn",
    label_excellent: "Excellent match",
    label_good: "Good match",
    label_fair: "Fair match",
    label_weak: "Weak match",
    uploaded: "CV uploaded: {name}",

    backend_healthy: "Backend is healthy!",
    status: "Status",
    service: "Service",
    timestamp: "Timestamp",
    api_url: "API URL: {url}",
};

static PL: Messages = Messages {
    unsupported_file_type: "Nieobsługiwany typ pliku. Prześlij plik PDF lub TXT.",
    file_too_large: "Plik jest za duży. Maksymalny rozmiar to 10 MB.",
    missing_cv: "Najpierw prześlij swoje CV.",
    missing_job_description: "Wklej opis stanowiska.",
    missing_api_key: "Podaj klucz API.",
    request_in_flight: "Inne żądanie jest już w toku.",

    upload_failed: "Nie udało się przesłać pliku",
    analysis_failed: "Analiza nie powiodła się",
    health_http_error: "Błąd HTTP! status: {status}",
    invalid_response: "Nieoczekiwana odpowiedź serwera",
    backend_hint: "Upewnij się, że backend działa pod adresem {url}",

    auth_error_prefix: "Błąd logowania: ",
    auth_unavailable: "Logowanie niedostępne: dostawca uwierzytelniania nie jest skonfigurowany.",
    auth_pending: "Logowanie...",
    logged_in_as: "Zalogowano jako {name}",
    logged_out: "Nie zalogowano",
    press_enter_to_sign_out: "Naciśnij Enter, aby się wylogować...",

    error_heading: "Błąd:",
    match_heading: "Dopasowanie",
    strengths: "Mocne strony",
    weaknesses: "Słabe strony",
    suggestions: "Sugestie",
    learning_suggestions: "Czego się nauczyć",
    label_excellent: "Doskonałe dopasowanie",
    label_good: "Dobre dopasowanie",
    label_fair: "Przeciętne dopasowanie",
    label_weak: "Słabe dopasowanie",
    uploaded: "Przesłano CV: {name}",

    backend_healthy: "Backend działa poprawnie!",
    status: "Status",
    service: "Usługa",
    timestamp: "Znacznik czasu",
    api_url: "Adres API: {url}",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale() {
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!("PL".parse::<Locale>().unwrap(), Locale::Pl);
        assert_eq!(" pl-PL ".parse::<Locale>().unwrap(), Locale::Pl);
        assert!("de".parse::<Locale>().is_err());
    }

    #[test]
    fn test_templates_carry_placeholders() {
        for m in [Locale::En.messages(), Locale::Pl.messages()] {
            assert!(m.health_http_error.contains("{status}"));
            assert!(m.backend_hint.contains("{url}"));
            assert!(m.logged_in_as.contains("{name}"));
            assert!(m.uploaded.contains("{name}"));
            assert!(m.api_url.contains("{url}"));
        }
    }
}
