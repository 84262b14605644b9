use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_AVATAR_URL;

/// Body returned by every credential exchange endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Cached identity fields shown by the navigation chrome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub picture: String,
}

/// Bearer token plus profile. Presence means "authenticated" for routing only;
/// the token is confirmed valid only by a successful guarded call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub profile: Profile,
}

impl Session {
    /// Build a session from a credential exchange, filling absent fields the way
    /// the login flows do: empty strings, and the default avatar for `picture`.
    pub fn from_auth(response: AuthResponse) -> Self {
        let picture = response
            .picture
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string());
        Self {
            token: response.token,
            profile: Profile {
                email: response.email.unwrap_or_default(),
                name: response.name.unwrap_or_default(),
                phone: response.phone.unwrap_or_default(),
                picture,
            },
        }
    }

    pub fn email(&self) -> &str {
        &self.profile.email
    }
}

/// Credential exchanges supported by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Password { email: String, password: String },
    /// Federated identity token from the Google sign-in popup
    Google { id_token: String },
    /// Identity token from a verified phone one-time code
    Phone { id_token: String, phone_number: String },
}

/// Body of `POST /register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}
