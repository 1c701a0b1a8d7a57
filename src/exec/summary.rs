// src/exec/summary.rs

//! Human-readable outcome of a finished run.

/// Marker that opens the recap block in `ansible-playbook` output.
pub const RECAP_MARKER: &str = "PLAY RECAP";

pub const NO_OUTPUT: &str = "Playbook produced no output.";
pub const SUCCEEDED: &str = "Playbook succeeded.";
pub const UNKNOWN_FAILURE: &str = "Playbook failed with an unknown error.";

/// Derive a summary from the accumulated log and the exit code.
///
/// - Empty log: [`NO_OUTPUT`], whatever the exit code.
/// - Otherwise the last line containing [`RECAP_MARKER`] is located; the line
///   right after it (trimmed, empty if there is none) is reported as the recap.
/// - Without a recap, success is [`SUCCEEDED`] and failure is `error` or
///   [`UNKNOWN_FAILURE`].
pub fn build_summary(logs: &[String], return_code: i32, error: Option<&str>) -> String {
    if logs.is_empty() {
        return NO_OUTPUT.to_string();
    }

    if let Some(idx) = logs.iter().rposition(|line| line.contains(RECAP_MARKER)) {
        let status_line = logs.get(idx + 1).map(|l| l.trim()).unwrap_or_default();
        return if return_code == 0 {
            format!("Playbook succeeded, recap: {status_line}")
        } else {
            format!("Playbook failed, recap: {status_line}")
        };
    }

    if return_code == 0 {
        return SUCCEEDED.to_string();
    }

    match error {
        Some(err) if !err.is_empty() => err.to_string(),
        _ => UNKNOWN_FAILURE.to_string(),
    }
}
