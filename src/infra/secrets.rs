use std::panic;

const REDACTED: &str = "[REDACTED]";

const SENSITIVE_MARKERS: [&str; 4] = ["token", "bearer", "secret", "authorization"];

/// Replaces whitespace-separated chunks that look like credentials.
pub fn redact_text(input: &str) -> String {
    let mut previous_was_marker = false;

    input
        .split_whitespace()
        .map(|chunk| {
            let lowered = chunk.to_ascii_lowercase();
            let is_marker = SENSITIVE_MARKERS
                .iter()
                .any(|marker| lowered.contains(marker));
            let redact = is_marker || previous_was_marker || looks_like_token(chunk);
            previous_was_marker = is_marker && !chunk.contains('=');

            if redact {
                REDACTED
            } else {
                chunk
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn install_panic_redaction_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic payload omitted".to_owned());

        let scrubbed = redact_text(&payload);
        tracing::error!(code = "PANIC", message = %scrubbed, "application panicked");

        match panic_info.location() {
            Some(location) => eprintln!(
                "tablechat panic: {} at {}:{}:{}",
                scrubbed,
                location.file(),
                location.line(),
                location.column()
            ),
            None => eprintln!("tablechat panic: {}", scrubbed),
        }
    }));
}

/// Long opaque runs of letters and digits, such as JWT segments or API keys.
fn looks_like_token(value: &str) -> bool {
    let cleaned = value.trim_matches(|ch: char| !ch.is_ascii_alphanumeric());
    let has_letters = cleaned.chars().any(|ch| ch.is_ascii_alphabetic());
    let has_digits = cleaned.chars().any(|ch| ch.is_ascii_digit());
    let opaque = cleaned
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'));

    cleaned.len() >= 24 && opaque && has_letters && has_digits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_token_assignments_and_bearer_values() {
        let input = "request failed: Authorization: Bearer abc.def token=xyz123";
        let output = redact_text(input);

        assert!(!output.contains("abc.def"));
        assert!(!output.contains("xyz123"));
        assert!(output.starts_with("request failed:"));
    }

    #[test]
    fn redacts_long_opaque_values() {
        let output = redact_text("key 9f8e7d6c5b4a39281706f5e4d3c2b1a0 rejected");

        assert_eq!(output, "key [REDACTED] rejected");
    }

    #[test]
    fn keeps_ordinary_text() {
        let input = "called `Option::unwrap()` on a `None` value in view 3";

        assert_eq!(redact_text(input), input);
    }
}
