mod config;
mod deadline;
pub mod headers;
mod invoker;
mod outcome;
mod pipeline;
pub mod prompts;
mod request;
pub mod testing;

pub use config::{
    parse_timeout_ms, CritiqueConfig, DEFAULT_MODEL, DEFAULT_TIMEOUT_MS, ENV_API_KEY,
    ENV_BASE_URL, ENV_MODEL, ENV_TIMEOUT_MS,
};
pub use deadline::DeadlineGuard;
pub use headers::has_all_headers;
pub use invoker::{CritiqueInvoker, MAX_OUTPUT_TOKENS, TEMPERATURE};
pub use outcome::{
    CritiqueError, CritiqueFailure, CritiqueResponse, CritiqueResult, CritiqueSuccess,
};
pub use pipeline::CritiquePipeline;
pub use prompts::CritiquePrompts;
pub use request::{
    is_json_content_type, parse_body, validate, CritiqueRequest, Issue, IssueCode,
    ValidationError,
};
