//! Scope matching for API keys.
//!
//! Scopes are `resource:action` strings. A granted scope matches a required one when it
//! is identical, when it is `resource:*` for the same resource, or when it is `*`.

pub const WILDCARD_SCOPE: &str = "*";

/// Returns true if any of `granted` satisfies `required`.
pub fn has_scope<S: AsRef<str>>(granted: &[S], required: &str) -> bool {
    let resource = required.split_once(':').map(|(resource, _)| resource);

    granted.iter().any(|scope| {
        let scope = scope.as_ref();
        scope == required
            || scope == WILDCARD_SCOPE
            || matches!(
                (scope.strip_suffix(":*"), resource),
                (Some(granted_resource), Some(resource)) if granted_resource == resource
            )
    })
}

/// A scope is `*`, or `resource:action` with non-empty parts where action may be `*`.
pub fn is_valid_scope(scope: &str) -> bool {
    if scope == WILDCARD_SCOPE {
        return true;
    }
    match scope.split_once(':') {
        Some((resource, action)) => {
            !resource.is_empty()
                && !action.is_empty()
                && !resource.contains('*')
                && (action == "*" || !action.contains('*'))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(has_scope(&["contacts:read"], "contacts:read"));
        assert!(!has_scope(&["contacts:read"], "contacts:write"));
    }

    #[test]
    fn test_resource_wildcard() {
        let granted = ["integrations:*"];
        assert!(has_scope(&granted, "integrations:write"));
        assert!(has_scope(&granted, "integrations:read"));
        assert!(!has_scope(&granted, "contacts:read"));
    }

    #[test]
    fn test_resource_wildcard_does_not_match_bare_resource() {
        assert!(!has_scope(&["integrations:*"], "integrations"));
    }

    #[test]
    fn test_global_wildcard() {
        assert!(has_scope(&["*"], "anything:at_all"));
        assert!(has_scope(&["*"], "bare"));
    }

    #[test]
    fn test_empty_grants_nothing() {
        let granted: [&str; 0] = [];
        assert!(!has_scope(&granted, "contacts:read"));
    }

    #[test]
    fn test_owned_strings() {
        let granted = vec!["pitches:write".to_string()];
        assert!(has_scope(&granted, "pitches:write"));
    }

    #[test]
    fn test_is_valid_scope() {
        assert!(is_valid_scope("*"));
        assert!(is_valid_scope("contacts:read"));
        assert!(is_valid_scope("contacts:*"));
        assert!(!is_valid_scope("contacts"));
        assert!(!is_valid_scope(":read"));
        assert!(!is_valid_scope("*:read"));
        assert!(!is_valid_scope("contacts:re*d"));
    }
}
