//! Parser for the compact per-service override grammar.
//!
//! The services specification is a comma-separated list of tokens, each
//! of the form `name[:image][:version]`:
//!
//! - `web` pins nothing; the service must merely exist in the plan
//! - `web:1.2.0` overrides the image tag only
//! - `web:myrepo/web:1.2.0` overrides the image repository and tag
//!
//! A lone second segment is always read as a version, never as an image.

use std::collections::HashMap;

use crate::error::{ConfigError, Result};

/// One parsed override directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOverride {
    /// Service definition name this override targets.
    pub name: String,
    /// Image repository override, if supplied.
    pub image: Option<String>,
    /// Image tag override, if supplied.
    pub version: Option<String>,
}

/// The full override set, keyed by unique service name.
///
/// Duplicate names keep the last occurrence, matching object-assignment
/// semantics of the specification string.
#[derive(Debug, Clone, Default)]
pub struct ServiceOverrides {
    entries: HashMap<String, ServiceOverride>,
}

impl ServiceOverrides {
    /// Parses a comma-separated services specification string.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::InvalidServiceOverride`] for empty
    /// tokens, empty segments, or tokens with more than three segments.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut entries = HashMap::new();

        for token in spec.split(',') {
            let parsed = Self::parse_token(token)?;
            entries.insert(parsed.name.clone(), parsed);
        }

        Ok(Self { entries })
    }

    /// Parses a single `name[:image][:version]` token.
    fn parse_token(token: &str) -> Result<ServiceOverride> {
        let invalid = |reason: &str| {
            ConfigError::InvalidServiceOverride {
                token: token.to_string(),
                reason: reason.to_string(),
            }
        };

        let segments: Vec<&str> = token.split(':').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid("empty segment").into());
        }

        let over = match segments.as_slice() {
            [name] => ServiceOverride {
                name: (*name).to_string(),
                image: None,
                version: None,
            },
            [name, version] => ServiceOverride {
                name: (*name).to_string(),
                image: None,
                version: Some((*version).to_string()),
            },
            [name, image, version] => ServiceOverride {
                name: (*name).to_string(),
                image: Some((*image).to_string()),
                version: Some((*version).to_string()),
            },
            _ => return Err(invalid("expected name[:image][:version]").into()),
        };

        Ok(over)
    }

    /// Looks up the override for a service name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ServiceOverride> {
        self.entries.get(name)
    }

    /// Iterates over all override names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of distinct overrides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no overrides were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_only() {
        let overrides = ServiceOverrides::parse("web").unwrap();
        let over = overrides.get("web").unwrap();
        assert_eq!(over.image, None);
        assert_eq!(over.version, None);
    }

    #[test]
    fn test_parse_name_and_version() {
        let overrides = ServiceOverrides::parse("web:1.1").unwrap();
        let over = overrides.get("web").unwrap();
        assert_eq!(over.image, None);
        assert_eq!(over.version.as_deref(), Some("1.1"));
    }

    #[test]
    fn test_parse_name_image_version() {
        let overrides = ServiceOverrides::parse("web:myrepo/web:1.1").unwrap();
        let over = overrides.get("web").unwrap();
        assert_eq!(over.image.as_deref(), Some("myrepo/web"));
        assert_eq!(over.version.as_deref(), Some("1.1"));
    }

    #[test]
    fn test_parse_multiple_tokens() {
        let overrides = ServiceOverrides::parse("web:1.1,api,worker:2.0").unwrap();
        assert_eq!(overrides.len(), 3);
        assert!(overrides.get("api").unwrap().version.is_none());
        assert_eq!(
            overrides.get("worker").unwrap().version.as_deref(),
            Some("2.0")
        );
    }

    #[test]
    fn test_duplicate_name_keeps_last() {
        let overrides = ServiceOverrides::parse("web:1.0,web:2.0").unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides.get("web").unwrap().version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_rejects_empty_token() {
        assert!(ServiceOverrides::parse("web,,api").is_err());
        assert!(ServiceOverrides::parse("").is_err());
    }

    #[test]
    fn test_rejects_empty_segment() {
        assert!(ServiceOverrides::parse("web:").is_err());
        assert!(ServiceOverrides::parse(":1.0").is_err());
    }

    #[test]
    fn test_rejects_too_many_segments() {
        assert!(ServiceOverrides::parse("web:a:b:c").is_err());
    }
}
