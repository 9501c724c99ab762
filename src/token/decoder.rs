use crate::error::DecodeError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;

/// Username/password pair carried inside an authorization token
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedCredential {
    pub username: String,
    pub password: String,
}

impl DecodedCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep the password out of `{:?}` output.
impl fmt::Debug for DecodedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Decode a base64 `user:password` token.
///
/// The decoded text must split on `:` into exactly two fields; anything else
/// is [`DecodeError::MalformedCredentialFormat`].
pub fn decode_token(raw_token: &str) -> Result<DecodedCredential, DecodeError> {
    let bytes = STANDARD
        .decode(raw_token.trim())
        .map_err(|e| DecodeError::InvalidEncoding(e.to_string()))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| DecodeError::InvalidEncoding(format!("token is not UTF-8: {}", e)))?;

    let fields: Vec<&str> = text.split(':').collect();
    match fields.as_slice() {
        [username, password] => Ok(DecodedCredential::new(*username, *password)),
        _ => Err(DecodeError::MalformedCredentialFormat(text)),
    }
}
