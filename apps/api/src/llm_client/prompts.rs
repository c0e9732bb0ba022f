// Shared prompt fragments used by more than one pipeline stage.
// Stage-specific templates live in optimization/prompts.rs.

/// Instruction that pins the tone of voice for every generated sentence.
pub const TONE_INSTRUCTION: &str =
    "Keep the tone of voice \"{tone_of_voice}\" consistently throughout your answer.";

/// Heading capitalization rule for the final article.
pub const HEADING_CASE_INSTRUCTION: &str = "\
    HEADINGS: capitalize only the first letter of each heading \
    (e.g. \"Contact us to discover our solutions\", NOT \"Contact Us To Discover Our Solutions\").";

/// Rendered in place of the internal-link list when the sitemap produced nothing.
pub const NO_INTERNAL_LINKS: &str = "(no internal URLs available)";
