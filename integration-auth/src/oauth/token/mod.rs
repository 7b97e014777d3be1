//! OAuth token types.

mod tokens;

pub use tokens::{RefreshResult, Tokens, REFRESH_THRESHOLD_MINUTES};
