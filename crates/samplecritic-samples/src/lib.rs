pub mod parser;
pub mod store;
pub mod types;

pub use parser::parse_samples;
pub use store::{SampleStore, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
pub use types::{Sample, SampleFilter, SampleSummary};
