use std::borrow::Cow;

use serde::Serialize;

use crate::headers::{HEADER_DIAGNOSIS, HEADER_FIX, HEADER_TESTS};
use crate::CritiqueRequest;

/// Character budget for the problem statement
pub const PRD_CHAR_BUDGET: usize = 20_000;
/// Character budget for the buggy solution source
pub const CODE_CHAR_BUDGET: usize = 20_000;
/// Character budget for the pretty-printed failure info
pub const FAILURE_INFO_CHAR_BUDGET: usize = 12_000;
/// Hard cap on the fully assembled prompt
pub const PROMPT_CHAR_CAP: usize = 60_000;

/// Fixed system message sent alongside every rendered prompt
pub const SYSTEM_INSTRUCTION: &str = "You are a meticulous senior software engineer who reviews buggy solutions to \
coding problems. Answer only in the three-section format the user specifies, using the exact section header lines, \
and never add any other headers or commentary.";

/// Prompt templates for the critique request
pub struct CritiquePrompts;

impl CritiquePrompts {
    /// Render the prompt for a validated request.
    ///
    /// Pure: the same request always yields the same string. Each long field
    /// is cut to its own budget first, then the assembled prompt is cut to
    /// [`PROMPT_CHAR_CAP`].
    pub fn build_prompt(request: &CritiqueRequest) -> String {
        let failure_info = serialize_failure_info(request.failure_info.as_ref());

        let prompt = Self::render(
            &truncate_with_marker(&request.prd, PRD_CHAR_BUDGET),
            &truncate_with_marker(&request.buggy_solution_code, CODE_CHAR_BUDGET),
            &truncate_with_marker(&failure_info, FAILURE_INFO_CHAR_BUDGET),
            request.label.as_deref().unwrap_or("null"),
        );

        truncate_with_marker(&prompt, PROMPT_CHAR_CAP).into_owned()
    }

    fn render(prd: &str, code: &str, failure_info: &str, label: &str) -> String {
        format!(
            r#"You are reviewing a buggy solution to a coding problem. You are given the problem statement (PRD), the buggy solution (BUGGY_CODE), information about how it fails (FAILURE_INFO) and an optional failure label (LABEL). Explain the bug, propose a minimal correct fix, and design tests that would have caught it.

OUTPUT FORMAT (follow exactly):
- Your answer consists of exactly three sections, in this order.
- Each section begins with its header line, written exactly as shown and alone on its line:
{diagnosis}
{fix}
{tests}
- Do not add any other headers, titles or markdown headings.
- Do not write anything before the first header or after the last section.

SECTION REQUIREMENTS:

{diagnosis}
- Identify the root cause precisely and quote the exact lines or expressions in BUGGY_CODE that are wrong.
- Explain how the failure in FAILURE_INFO follows from that root cause.
- Name the PRD requirement that the buggy behaviour violates.

{fix}
- Give the smallest change that makes the solution correct, as a code block in the language of BUGGY_CODE.
- Keep the original function signature and input/output conventions.
- Do not rewrite unrelated logic.

{tests}
- Provide at least 3 NEW assertions that do not already appear in FAILURE_INFO.
- At least 1 assertion must be a counter-example: the buggy code fails it and the fixed code passes it.
- At least 2 assertions must cover boundary cases such as empty input, minimum or maximum sizes, or extreme values.
- Every assertion states its exact input and exact expected output, and the expected output must follow from the PRD.

INPUTS

PRD:
{prd}

BUGGY_CODE:
{code}

FAILURE_INFO:
{failure_info}

LABEL:
{label}
"#,
            diagnosis = HEADER_DIAGNOSIS,
            fix = HEADER_FIX,
            tests = HEADER_TESTS,
            prd = prd,
            code = code,
            failure_info = failure_info,
            label = label,
        )
    }
}

/// Marker appended to a cut field, stating how many chars were dropped
pub fn truncation_marker(dropped: usize) -> String {
    format!("\n…[truncated {} chars]", dropped)
}

/// Keep the first `budget` chars of `text` and append a [`truncation_marker`]
/// when anything was cut. Counts Unicode scalar values, not bytes.
pub fn truncate_with_marker(text: &str, budget: usize) -> Cow<'_, str> {
    let Some((cut, _)) = text.char_indices().nth(budget) else {
        return Cow::Borrowed(text);
    };

    let dropped = text[cut..].chars().count();
    let mut out = String::with_capacity(cut + 32);
    out.push_str(&text[..cut]);
    out.push_str(&truncation_marker(dropped));
    Cow::Owned(out)
}

/// Pretty-print failure info as JSON.
///
/// Absent values and values that fail to serialize both render as `null`.
pub fn serialize_failure_info<T: Serialize + ?Sized>(value: Option<&T>) -> String {
    value
        .and_then(|v| serde_json::to_string_pretty(v).ok())
        .unwrap_or_else(|| "null".to_string())
}
