//! Caller identity as seen by the bridge.

use sha2::{Digest, Sha256};

/// Bearer token representing the authenticated caller.
///
/// The token is forwarded unmodified to the tool server. Everywhere else
/// (cache keys, logs) only its [`fingerprint`](Self::fingerprint) is used.
///
/// # Examples
///
/// ```
/// use toolbridge_core::CallerIdentity;
///
/// let identity = CallerIdentity::new("tok1");
/// assert_eq!(identity.bearer(), "tok1");
/// assert_eq!(identity.fingerprint().len(), 64);
/// assert!(!format!("{:?}", identity).contains("tok1"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CallerIdentity {
    token: String,
    fingerprint: String,
}

impl CallerIdentity {
    /// Wrap a bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        let fingerprint = format!("{:x}", Sha256::digest(token.as_bytes()));
        Self { token, fingerprint }
    }

    /// Wrap an optional token, treating blank tokens as absent.
    pub fn from_optional(token: Option<impl Into<String>>) -> Option<Self> {
        let token: String = token?.into();
        if token.trim().is_empty() {
            return None;
        }
        Some(Self::new(token))
    }

    /// The raw token, for the `Authorization` header only.
    pub fn bearer(&self) -> &str {
        &self.token
    }

    /// Hex SHA-256 of the token.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Abbreviated fingerprint for log fields.
    pub fn short(&self) -> &str {
        &self.fingerprint[..12]
    }
}

impl std::fmt::Debug for CallerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallerIdentity")
            .field("fingerprint", &self.short())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "caller:{}", self.short())
    }
}
