//! Secure token manager with memory-safe handling and masking capabilities
//!
//! The npm client never passes the registry token on a command line; npm picks it up
//! from the environment. What the publisher does need is to keep that token out of
//! everything it logs, which is what this module is for. Tokens are held as
//! `secrecy` secrets so they are not printed by accident.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::env;

/// Environment variable holding the npm token
const NPM_TOKEN_VAR: &str = "NPM_TOKEN";

/// Tokens shorter than this are masked entirely
const MIN_PARTIAL_MASK_LEN: usize = 10;

/// Secure token manager for registry authentication
///
/// # Examples
///
/// ```
/// use types_publisher::SecureTokenManager;
///
/// let manager = SecureTokenManager::new();
/// assert_eq!(manager.token_var(), "NPM_TOKEN");
/// ```
#[derive(Debug, Clone)]
pub struct SecureTokenManager {
    token_var: String,
}

impl Default for SecureTokenManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureTokenManager {
    /// Manager reading `NPM_TOKEN`
    pub fn new() -> Self {
        Self::with_env_var(NPM_TOKEN_VAR)
    }

    /// Manager reading the token from `token_var`
    pub fn with_env_var(token_var: impl Into<String>) -> Self {
        Self {
            token_var: token_var.into(),
        }
    }

    pub fn token_var(&self) -> &str {
        &self.token_var
    }

    /// Token from the environment, if set and non-empty
    pub fn get_token(&self) -> Option<SecretString> {
        let token_value = env::var(&self.token_var).ok()?;
        if token_value.is_empty() {
            return None;
        }
        Some(SecretString::new(token_value.into()))
    }

    pub fn has_token(&self) -> bool {
        self.get_token().is_some()
    }

    /// Masks a token for safe logging
    ///
    /// Shows only the first 3 and last 3 characters for identification purposes.
    ///
    /// ```
    /// use types_publisher::SecureTokenManager;
    ///
    /// let manager = SecureTokenManager::new();
    /// assert_eq!(manager.mask_token("abcdef123456"), "abc...456");
    /// assert_eq!(manager.mask_token("short"), "****");
    /// ```
    pub fn mask_token(&self, token: &str) -> String {
        if token.len() < MIN_PARTIAL_MASK_LEN || !token.is_ascii() {
            return "****".to_string();
        }

        let prefix = &token[..3];
        let suffix = &token[token.len() - 3..];
        format!("{}...{}", prefix, suffix)
    }

    /// Replace every occurrence of the configured token in `text` with its mask
    pub fn mask_tokens_in_string(&self, text: &str) -> String {
        let Some(token) = self.get_token() else {
            return text.to_string();
        };

        let token_str = token.expose_secret();
        match Regex::new(&regex::escape(token_str)) {
            Ok(regex) => {
                let masked_token = self.mask_token(token_str);
                regex.replace_all(text, masked_token.as_str()).to_string()
            }
            Err(_) => text.to_string(),
        }
    }
}
