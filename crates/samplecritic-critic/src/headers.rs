//! Structural lint over model output.
//!
//! Only checks that each section header appears somewhere in the text. It
//! does not check ordering, exclusivity or what sits between the headers.

pub const HEADER_DIAGNOSIS: &str = "Detailed Diagnosis";
pub const HEADER_FIX: &str = "[Proposed Fix]";
pub const HEADER_TESTS: &str = "<Test_Validation>";

/// The three section headers, in the order the prompt asks for them
pub const SECTION_HEADERS: [&str; 3] = [HEADER_DIAGNOSIS, HEADER_FIX, HEADER_TESTS];

/// True when every section header occurs as a substring of `text`
pub fn has_all_headers(text: &str) -> bool {
    SECTION_HEADERS.iter().all(|h| text.contains(h))
}

/// Headers absent from `text`, for logging
pub fn missing_headers(text: &str) -> Vec<&'static str> {
    SECTION_HEADERS
        .iter()
        .copied()
        .filter(|h| !text.contains(h))
        .collect()
}
