//! Classification of raw remote errors into domain variants.

use super::{ApiError, TeamsError};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of resource a diagnostic reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// A team
    Team,
    /// A channel within a team
    Channel,
    /// A one-on-one or group chat
    Chat,
    /// A user or channel member
    User,
    /// A single message
    Message,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Team => "team",
            ResourceKind::Channel => "channel",
            ResourceKind::Chat => "chat",
            ResourceKind::User => "user",
            ResourceKind::Message => "message",
        };
        f.write_str(name)
    }
}

/// Human readable references attached to an error, by resource kind.
///
/// Attaching the same kind again appends to the existing references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRefs(BTreeMap<ResourceKind, Vec<String>>);

impl ResourceRefs {
    /// Create an empty set of references
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach one or more references of the given kind
    pub fn with<I, S>(mut self, kind: ResourceKind, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attach(kind, refs);
        self
    }

    /// Attach references in place
    pub fn attach<I, S>(&mut self, kind: ResourceKind, refs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(kind)
            .or_default()
            .extend(refs.into_iter().map(Into::into));
    }

    /// References recorded for a kind
    pub fn get(&self, kind: ResourceKind) -> &[String] {
        self.0.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether no references were attached
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// Iterate over kinds and their references
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, &[String])> {
        self.0.iter().map(|(kind, refs)| (*kind, refs.as_slice()))
    }
}

impl fmt::Display for ResourceRefs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("resource");
        }
        let mut first = true;
        for (kind, refs) in self.iter().filter(|(_, refs)| !refs.is_empty()) {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            let quoted: Vec<String> = refs.iter().map(|r| format!("{r:?}")).collect();
            write!(f, "{} {}", kind, quoted.join("/"))?;
        }
        Ok(())
    }
}

pub(crate) fn is_not_found(error: &ApiError) -> bool {
    error.status == Some(404) || matches!(error.code.as_str(), "404" | "ResourceNotFound" | "NotFound")
}

fn is_forbidden(error: &ApiError) -> bool {
    error.status == Some(403) || matches!(error.code.as_str(), "403" | "AccessDenied")
}

/// Map a code/message pair onto a domain error
pub fn classify_api_error(error: ApiError, refs: ResourceRefs) -> TeamsError {
    if is_not_found(&error) {
        TeamsError::NotFound { refs, source: error }
    } else if is_forbidden(&error) {
        TeamsError::Forbidden { refs, source: error }
    } else {
        TeamsError::Unknown {
            code: error.code.clone(),
            message: format!("{} ({})", error.message, error.code),
            source: error,
        }
    }
}

/// Classify an error returned by the request executor.
///
/// Only unclassified remote errors are mapped; everything else, including
/// errors that were already classified, passes through unchanged.
pub fn classify(error: TeamsError, refs: ResourceRefs) -> TeamsError {
    match error {
        TeamsError::Api(api) => classify_api_error(api, refs),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(ApiError::new("ResourceNotFound", "m"), ErrorKind::NotFound ; "resource not found code")]
    #[test_case(ApiError::new("NotFound", "m"), ErrorKind::NotFound ; "not found code")]
    #[test_case(ApiError::new("404", "m"), ErrorKind::NotFound ; "numeric 404 code")]
    #[test_case(ApiError::new("itemMissing", "m").with_status(404), ErrorKind::NotFound ; "http 404")]
    #[test_case(ApiError::new("AccessDenied", "m"), ErrorKind::Forbidden ; "access denied code")]
    #[test_case(ApiError::new("403", "m"), ErrorKind::Forbidden ; "numeric 403 code")]
    #[test_case(ApiError::new("Whatever", "m").with_status(403), ErrorKind::Forbidden ; "http 403")]
    #[test_case(ApiError::new("BadRequest", "m").with_status(400), ErrorKind::Unknown ; "bad request")]
    #[test_case(ApiError::parsing("m"), ErrorKind::Unknown ; "parsing error")]
    fn test_classify_kind(error: ApiError, expected: ErrorKind) {
        assert_eq!(classify_api_error(error, ResourceRefs::new()).kind(), expected);
    }

    #[test]
    fn test_unknown_keeps_code_and_message() {
        let err = classify_api_error(
            ApiError::new("TooManyRequests", "Slow down").with_status(429),
            ResourceRefs::new(),
        );

        match &err {
            TeamsError::Unknown { code, message, .. } => {
                assert_eq!(code, "TooManyRequests");
                assert_eq!(message, "Slow down (TooManyRequests)");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
        assert_eq!(err.status_code(), 429);
    }

    #[test]
    fn test_refs_append_for_same_kind() {
        let refs = ResourceRefs::new()
            .with(ResourceKind::Team, ["Engineering"])
            .with(ResourceKind::Channel, ["General"])
            .with(ResourceKind::Team, ["t-42", "t-43"]);

        assert_eq!(refs.get(ResourceKind::Team), ["Engineering", "t-42", "t-43"]);
        assert_eq!(refs.get(ResourceKind::Channel), ["General"]);
        assert!(refs.get(ResourceKind::Chat).is_empty());
    }

    #[test]
    fn test_not_found_carries_refs() {
        let refs = ResourceRefs::new()
            .with(ResourceKind::Team, ["Engineering"])
            .with(ResourceKind::Channel, ["General"]);
        let err = classify(
            TeamsError::Api(ApiError::new("NotFound", "missing").with_status(404)),
            refs.clone(),
        );

        match &err {
            TeamsError::NotFound { refs: attached, .. } => assert_eq!(attached, &refs),
            other => panic!("unexpected variant: {other:?}"),
        }
        assert_eq!(err.to_string(), r#"Not found: team "Engineering", channel "General""#);
    }

    #[test]
    fn test_classify_passes_through_other_errors() {
        let err = classify(TeamsError::Cancelled, ResourceRefs::new());
        assert!(err.is_cancelled());
    }
}
