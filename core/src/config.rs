/*
    spotify-profile-rs | Rust CLI to sign in to Spotify with PKCE and render your profile.
    Copyright (C) 2025  Israel Alberto Roldan Vega

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use rspotify::{scopes, Credentials, OAuth};
use std::collections::HashSet;
use thiserror::Error;

/// Callback registered for the app in the Spotify dashboard.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:5173/callback";
pub const ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";
pub const API_BASE_URL: &str = "https://api.spotify.com";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing RSPOTIFY_CLIENT_ID")]
    MissingClientId,
}

/// Permissions requested from the user.
/// - user-read-private, user-read-email: profile and email address.
/// - user-top-read: top tracks and artists.
/// - playlist-modify-private, playlist-modify-public: reserved for playlist export.
pub fn default_scopes() -> HashSet<String> {
    scopes!(
        "user-read-private",
        "user-read-email",
        "user-top-read",
        "playlist-modify-private",
        "playlist-modify-public"
    )
}

/// Static client configuration. None of it is secret: PKCE needs no client secret.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials: Credentials,
    pub oauth: OAuth,
    pub accounts_base: String,
    pub api_base: String,
}

impl ClientConfig {
    pub fn new(client_id: &str, redirect_uri: &str) -> Self {
        Self {
            credentials: Credentials::new_pkce(client_id),
            oauth: OAuth {
                redirect_uri: redirect_uri.to_string(),
                scopes: default_scopes(),
                ..Default::default()
            },
            accounts_base: ACCOUNTS_BASE_URL.to_string(),
            api_base: API_BASE_URL.to_string(),
        }
    }

    /// Reads `RSPOTIFY_CLIENT_ID` and, optionally, `RSPOTIFY_REDIRECT_URI`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let credentials = Credentials::from_env().ok_or(ConfigError::MissingClientId)?;
        let oauth = OAuth::from_env(default_scopes()).unwrap_or_else(|| OAuth {
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scopes: default_scopes(),
            ..Default::default()
        });

        Ok(Self {
            credentials,
            oauth,
            accounts_base: ACCOUNTS_BASE_URL.to_string(),
            api_base: API_BASE_URL.to_string(),
        })
    }

    /// Points both the accounts service and the Web API at another host.
    pub fn with_base_urls(mut self, accounts_base: &str, api_base: &str) -> Self {
        self.accounts_base = accounts_base.trim_end_matches('/').to_string();
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn client_id(&self) -> &str {
        &self.credentials.id
    }

    pub fn redirect_uri(&self) -> &str {
        &self.oauth.redirect_uri
    }

    /// Space-delimited scope list, sorted so the URL is stable.
    pub fn scope_param(&self) -> String {
        let mut scopes: Vec<&str> = self.oauth.scopes.iter().map(String::as_str).collect();
        scopes.sort_unstable();
        scopes.join(" ")
    }

    pub fn authorize_url(&self) -> String {
        format!("{}/authorize", self.accounts_base)
    }

    pub fn token_url(&self) -> String {
        format!("{}/api/token", self.accounts_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_spotify_endpoints() {
        let config = ClientConfig::new("client", DEFAULT_REDIRECT_URI);
        assert_eq!(config.client_id(), "client");
        assert!(config.credentials.secret.is_none());
        assert_eq!(config.authorize_url(), "https://accounts.spotify.com/authorize");
        assert_eq!(config.token_url(), "https://accounts.spotify.com/api/token");
    }

    #[test]
    fn test_scope_param_is_sorted_and_complete() {
        let config = ClientConfig::new("client", DEFAULT_REDIRECT_URI);
        assert_eq!(
            config.scope_param(),
            "playlist-modify-private playlist-modify-public user-read-email user-read-private user-top-read"
        );
    }

    #[test]
    fn test_with_base_urls_trims_slash() {
        let config = ClientConfig::new("client", DEFAULT_REDIRECT_URI)
            .with_base_urls("http://127.0.0.1:9000/", "http://127.0.0.1:9001/");
        assert_eq!(config.token_url(), "http://127.0.0.1:9000/api/token");
        assert_eq!(config.api_base, "http://127.0.0.1:9001");
    }
}
