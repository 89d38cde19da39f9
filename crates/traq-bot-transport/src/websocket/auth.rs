//! Connection credentials.

use traq_bot_core::{TransportError, TransportResult};
use url::Url;

/// Name of the session cookie the platform authenticates with.
pub const SESSION_COOKIE_NAME: &str = "r_session";

/// The single credential sent with every handshake.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthConfig {
    /// `Authorization: Bearer <token>`.
    Bearer {
        /// The bot access token.
        token: String,
    },
    /// `Cookie: r_session=<session>`, sent only to `domain`.
    SessionCookie {
        /// The session value.
        session: String,
        /// Host the cookie is scoped to.
        domain: String,
    },
}

impl AuthConfig {
    /// Creates bearer authentication.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Creates cookie authentication scoped to the host of `base_url`.
    pub fn session_cookie(session: impl Into<String>, base_url: &Url) -> TransportResult<Self> {
        let domain = base_url.host_str().ok_or_else(|| {
            TransportError::InvalidConfig(format!("base URL has no host: {base_url}"))
        })?;
        Ok(Self::SessionCookie {
            session: session.into(),
            domain: domain.to_owned(),
        })
    }

    /// Picks a credential from optional tokens. The access token wins when
    /// both are given; empty strings count as absent.
    pub fn from_tokens(
        access_token: Option<&str>,
        session_token: Option<&str>,
        base_url: &Url,
    ) -> TransportResult<Self> {
        fn present(token: Option<&str>) -> Option<&str> {
            token.filter(|t| !t.is_empty())
        }

        match (present(access_token), present(session_token)) {
            (Some(token), _) => Ok(Self::bearer(token)),
            (None, Some(session)) => Self::session_cookie(session, base_url),
            (None, None) => Err(TransportError::InvalidConfig(
                "either an access token or a session token is required".into(),
            )),
        }
    }

    /// Returns the header to attach when connecting to `endpoint`, if any.
    pub(crate) fn header_for(&self, endpoint: &Url) -> Option<(&'static str, String)> {
        match self {
            Self::Bearer { token } => Some(("authorization", format!("Bearer {token}"))),
            Self::SessionCookie { session, domain } => endpoint
                .host_str()
                .filter(|host| host.eq_ignore_ascii_case(domain))
                .map(|_| ("cookie", format!("{SESSION_COOKIE_NAME}={session}"))),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer { .. } => f.debug_struct("Bearer").finish_non_exhaustive(),
            Self::SessionCookie { domain, .. } => f
                .debug_struct("SessionCookie")
                .field("domain", domain)
                .finish_non_exhaustive(),
        }
    }
}
