use crate::errors::CoachError;
use crate::messages::Messages;
use crate::upload::UploadedFile;

pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "txt"];

/// 10 MiB.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Checks a file before it is sent anywhere.
///
/// FAIL conditions, checked in order:
/// - extension missing or not in `ALLOWED_EXTENSIONS` (case-insensitive)
/// - size above `MAX_FILE_SIZE`
pub fn validate_file(file: &UploadedFile, messages: &Messages) -> Result<(), CoachError> {
    let allowed = file
        .extension()
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));
    if !allowed {
        return Err(CoachError::Validation(messages.unsupported_file_type.to_string()));
    }
    if file.size > MAX_FILE_SIZE {
        return Err(CoachError::Validation(messages.file_too_large.to_string()));
    }
    Ok(())
}

/// Reports the first empty field among résumé text, job description and API key.
pub fn validate_analysis_inputs(
    cv_text: &str,
    job_description: &str,
    api_key: &str,
    messages: &Messages,
) -> Result<(), CoachError> {
    let checks = [
        (cv_text, messages.missing_cv),
        (job_description, messages.missing_job_description),
        (api_key, messages.missing_api_key),
    ];
    match checks.iter().find(|(value, _)| value.trim().is_empty()) {
        Some((_, message)) => Err(CoachError::Validation(message.to_string())),
        None => Ok(()),
    }
}
