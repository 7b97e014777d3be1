pub(crate) mod authenticated;

pub(crate) use authenticated::{Authenticated, MaybeAuthenticated};
