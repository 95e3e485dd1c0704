//! The submission target capability and selector predicates over it.

use std::sync::Arc;

use crate::types::{FormPayload, RelayError, RelayResult};

/// A form as seen by the interceptor.
///
/// Implementations own their content; `replace_content` takes `&self`
/// because targets are shared with in-flight submission tasks.
pub trait SubmissionTarget: Send + Sync {
    /// Classes on the form element, in attribute order.
    fn class_list(&self) -> Vec<String>;

    /// Absolute URL the form submits to.
    fn action_url(&self) -> String;

    /// Current field values, captured now.
    fn field_snapshot(&self) -> FormPayload;

    /// Replace everything inside the form element.
    fn replace_content(&self, html: &str);

    fn has_class(&self, class: &str) -> bool {
        self.class_list().iter().any(|c| c == class)
    }
}

/// Decides whether a target's submissions are relayed.
pub type TargetPredicate = Arc<dyn Fn(&dyn SubmissionTarget) -> bool + Send + Sync>;

/// Build a predicate matching a single class, written either as `name` or
/// `.name`. Anything more than one class token is rejected.
pub fn class_selector(selector: &str) -> RelayResult<TargetPredicate> {
    let class = selector.trim();
    let class = class.strip_prefix('.').unwrap_or(class);

    if class.is_empty() {
        return Err(RelayError::InvalidSelector(format!(
            "empty class selector: {selector:?}"
        )));
    }
    if class
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '.' | '#' | '[' | ']' | ',' | '>' | ':'))
    {
        return Err(RelayError::InvalidSelector(format!(
            "expected a single class, got {selector:?}"
        )));
    }

    let class = class.to_string();
    Ok(Arc::new(move |target: &dyn SubmissionTarget| {
        target.has_class(&class)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Classes(Vec<&'static str>);

    impl SubmissionTarget for Classes {
        fn class_list(&self) -> Vec<String> {
            self.0.iter().map(|c| c.to_string()).collect()
        }
        fn action_url(&self) -> String {
            "https://example.com/".to_string()
        }
        fn field_snapshot(&self) -> FormPayload {
            FormPayload::default()
        }
        fn replace_content(&self, _html: &str) {}
    }

    #[test]
    fn test_class_selector_matches() {
        let pred = class_selector("demo__form").unwrap();
        assert!(pred(&Classes(vec!["card", "demo__form"])));
        assert!(!pred(&Classes(vec!["card"])));
        assert!(!pred(&Classes(vec![])));
    }

    #[test]
    fn test_class_selector_accepts_leading_dot() {
        let pred = class_selector(".demo__form").unwrap();
        assert!(pred(&Classes(vec!["demo__form"])));
    }

    #[test]
    fn test_class_selector_is_exact_and_case_sensitive() {
        let pred = class_selector("demo__form").unwrap();
        assert!(!pred(&Classes(vec!["demo__form--wide"])));
        assert!(!pred(&Classes(vec!["Demo__Form"])));
    }

    #[test]
    fn test_class_selector_rejects_invalid() {
        assert!(class_selector("").is_err());
        assert!(class_selector(".").is_err());
        assert!(class_selector("a b").is_err());
        assert!(class_selector("form.demo").is_err());
        assert!(class_selector("#contact").is_err());
    }
}
