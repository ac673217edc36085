//! Login and token exchange DTOs

use serde::{Deserialize, Serialize};

use crate::envelope::Resource;

/// URI of the login resource.
pub const LOGIN_URI: &str = "/gdc/account/login";

/// URI issuing temporary tokens.
pub const TOKEN_URI: &str = "/gdc/account/token";

/// Login request.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PostUserLogin {
    pub login: String,
    pub password: String,
    pub remember: u8,
    pub verify_level: u8,
}

impl PostUserLogin {
    /// A login that returns the super-secured token in the response body
    /// rather than in a cookie.
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            remember: 0,
            verify_level: 2,
        }
    }
}

impl std::fmt::Debug for PostUserLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostUserLogin")
            .field("login", &self.login)
            .field("verify_level", &self.verify_level)
            .finish_non_exhaustive()
    }
}

impl Resource for PostUserLogin {
    const ROOT: &'static str = "postUserLogin";
}

/// Login response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLogin {
    /// Profile URI of the logged-in account.
    pub profile: String,
    /// Super-secured token.
    #[serde(default)]
    pub token: Option<String>,
    /// URI of the login session, used for logout.
    #[serde(default)]
    pub state: Option<String>,
}

impl Resource for UserLogin {
    const ROOT: &'static str = "userLogin";
}

/// Temporary token response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserToken {
    pub token: String,
}

impl Resource for UserToken {
    const ROOT: &'static str = "userToken";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Envelope;
    use serde_json::json;

    #[test]
    fn test_login_request() {
        assert_eq!(
            serde_json::to_value(Envelope(PostUserLogin::new("jane@x.com", "secret"))).unwrap(),
            json!({
                "postUserLogin": {
                    "login": "jane@x.com",
                    "password": "secret",
                    "remember": 0,
                    "verify_level": 2
                }
            })
        );
    }

    #[test]
    fn test_login_response() {
        let login = serde_json::from_value::<Envelope<UserLogin>>(json!({
            "userLogin": {
                "profile": "/gdc/account/profile/17",
                "token": "SST",
                "state": "/gdc/account/login/17"
            }
        }))
        .unwrap()
        .into_inner();
        assert_eq!(login.token.as_deref(), Some("SST"));
    }
}
