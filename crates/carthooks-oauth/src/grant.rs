//! Token endpoint requests for the supported `OAuth2` grant types.

use std::fmt;

/// Grant types accepted by the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    /// Confidential client authenticating as itself.
    ClientCredentials,
    /// Exchange of a single-use authorization code.
    AuthorizationCode,
    /// Exchange of a refresh token for a new access token.
    RefreshToken,
}

impl GrantType {
    /// Returns the wire value of the `grant_type` parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClientCredentials => "client_credentials",
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flow-specific parameters of a token request.
#[derive(Clone, PartialEq, Eq)]
pub enum Grant {
    /// `client_credentials`, optionally acting with an end user's authority.
    ClientCredentials {
        /// End-user access token forwarded as `user_access_token`.
        user_access_token: Option<String>,
    },
    /// `authorization_code`.
    AuthorizationCode {
        /// Code received on the redirect.
        code: String,
        /// Redirect URI the code was issued for.
        redirect_uri: String,
    },
    /// `refresh_token`.
    RefreshToken {
        /// Refresh token to exchange.
        refresh_token: String,
    },
}

impl Grant {
    /// Returns the grant type of these parameters.
    #[must_use]
    pub const fn grant_type(&self) -> GrantType {
        match self {
            Self::ClientCredentials { .. } => GrantType::ClientCredentials,
            Self::AuthorizationCode { .. } => GrantType::AuthorizationCode,
            Self::RefreshToken { .. } => GrantType::RefreshToken,
        }
    }
}

impl fmt::Debug for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grant")
            .field("grant_type", &self.grant_type())
            .finish_non_exhaustive()
    }
}

/// A complete token endpoint request.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenRequest {
    /// Client identifier.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
    /// Grant parameters.
    pub grant: Grant,
}

impl TokenRequest {
    /// Creates a token request.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>, grant: Grant) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            grant,
        }
    }

    /// Returns the grant type of this request.
    #[must_use]
    pub const fn grant_type(&self) -> GrantType {
        self.grant.grant_type()
    }

    /// Returns the form parameters in wire order.
    ///
    /// Empty optional values are omitted.
    #[must_use]
    pub fn form_params(&self) -> Vec<(&'static str, &str)> {
        let mut params = vec![
            ("grant_type", self.grant_type().as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        match &self.grant {
            Grant::ClientCredentials { user_access_token } => {
                if let Some(token) = user_access_token.as_deref().filter(|t| !t.is_empty()) {
                    params.push(("user_access_token", token));
                }
            }
            Grant::AuthorizationCode { code, redirect_uri } => {
                if !code.is_empty() {
                    params.push(("code", code));
                }
                if !redirect_uri.is_empty() {
                    params.push(("redirect_uri", redirect_uri));
                }
            }
            Grant::RefreshToken { refresh_token } => {
                if !refresh_token.is_empty() {
                    params.push(("refresh_token", refresh_token));
                }
            }
        }

        params
    }

    /// Encodes the request as an `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn to_form_body(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.form_params())
            .finish()
    }
}

impl fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRequest")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("grant", &self.grant)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_client_credentials_params() {
        let request = TokenRequest::new(
            "cid",
            "secret",
            Grant::ClientCredentials {
                user_access_token: None,
            },
        );
        assert_eq!(
            request.form_params(),
            vec![
                ("grant_type", "client_credentials"),
                ("client_id", "cid"),
                ("client_secret", "secret"),
            ]
        );
    }

    #[test]
    fn test_client_credentials_with_user_token() {
        let request = TokenRequest::new(
            "cid",
            "secret",
            Grant::ClientCredentials {
                user_access_token: Some("user-token-123".to_string()),
            },
        );
        assert!(request
            .form_params()
            .contains(&("user_access_token", "user-token-123")));
    }

    #[test]
    fn test_authorization_code_body() {
        let request = TokenRequest::new(
            "cid",
            "secret",
            Grant::AuthorizationCode {
                code: "auth-code".to_string(),
                redirect_uri: "http://localhost:8080/callback".to_string(),
            },
        );
        assert_eq!(request.grant_type(), GrantType::AuthorizationCode);
        assert_eq!(
            request.to_form_body(),
            "grant_type=authorization_code&client_id=cid&client_secret=secret\
             &code=auth-code&redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fcallback"
        );
    }

    #[test]
    fn test_refresh_params() {
        let request = TokenRequest::new(
            "cid",
            "secret",
            Grant::RefreshToken {
                refresh_token: "r1".to_string(),
            },
        );
        assert_eq!(request.grant_type().to_string(), "refresh_token");
        assert!(request.form_params().contains(&("refresh_token", "r1")));
    }

    #[test]
    fn test_debug_hides_secret() {
        let request = TokenRequest::new(
            "cid",
            "top-secret",
            Grant::RefreshToken {
                refresh_token: "r1".to_string(),
            },
        );
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("top-secret"));
        assert!(!rendered.contains("r1"));
    }
}
