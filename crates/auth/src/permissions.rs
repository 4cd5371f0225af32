use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier in `resource:action` form (e.g. `"change:make"`).
///
/// The wildcard `"*"` grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn for_action(resource: &str, action: &str) -> Self {
        Self(Cow::Owned(format!("{resource}:{action}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }

    /// Whether this permission covers `action` on `resource`.
    ///
    /// `resource:*` covers every action on that resource.
    pub fn grants(&self, resource: &str, action: &str) -> bool {
        if self.is_wildcard() {
            return true;
        }
        match self.as_str().split_once(':') {
            Some((r, a)) => r == resource && (a == action || a == "*"),
            None => false,
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
