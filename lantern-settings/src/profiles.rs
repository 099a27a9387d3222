//! Profile resolution
//!
//! The active profile order always starts with the base profile, followed by
//! the requested profiles in the order given. Later profiles win when layers
//! are merged.

use std::fmt;

/// Name of the mandatory base profile
pub const BASE_PROFILE: &str = "default";

/// Identifier of one configuration layer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfileName(String);

impl ProfileName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The reserved base profile
    pub fn base() -> Self {
        Self(BASE_PROFILE.to_string())
    }

    pub fn is_base(&self) -> bool {
        self.0 == BASE_PROFILE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProfileName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Resolve the ordered list of active profiles.
///
/// Names are trimmed and blanks dropped. A name that appears more than once
/// only counts at its first position, and the base profile is always first.
pub fn resolve_profiles<I, S>(requested: I) -> Vec<ProfileName>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut resolved = vec![ProfileName::base()];

    for name in requested {
        let name = name.as_ref().trim();
        if name.is_empty() || resolved.iter().any(|p| p.as_str() == name) {
            continue;
        }
        resolved.push(ProfileName::new(name));
    }

    resolved
}

/// Split a comma separated profile list, e.g. the value of `LANTERN_PROFILES`
pub fn parse_profile_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve profiles from an environment variable holding a comma separated list
pub fn profiles_from_env(var: &str) -> Vec<ProfileName> {
    let raw = std::env::var(var).unwrap_or_default();
    let profiles = resolve_profiles(parse_profile_list(&raw));
    tracing::debug!(var, profiles = ?profiles.iter().map(ProfileName::as_str).collect::<Vec<_>>(), "resolved active profiles");
    profiles
}
