//! System prompts compiled into the binary.

/// Extracts passport/destination codes from text or a passport image.
pub const COUNTRY_EXTRACTION_PROMPT: &str = include_str!("../../../prompts/country_extraction.md");

/// Greets or steers out-of-scope messages back to visa questions.
pub const GREETING_AND_SCOPE_PROMPT: &str = include_str!("../../../prompts/greeting_and_scope.md");

/// Estimates visa rules when the table has no data.
pub const VISA_ESTIMATION_PROMPT: &str = include_str!("../../../prompts/visa_estimation.md");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_are_not_empty() {
        assert!(COUNTRY_EXTRACTION_PROMPT.contains("passportCountry"));
        assert!(GREETING_AND_SCOPE_PROMPT.contains("visa"));
        assert!(VISA_ESTIMATION_PROMPT.contains("estimate"));
    }
}
