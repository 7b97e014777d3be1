//! Session principals. Login and session lookup are handled by the axum-login `Backend`.

pub use entity_api::user::{AuthSession, Backend, Credentials};
