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

use crate::config::ClientConfig;
use crate::http::{HttpClient, HttpError};
use crate::models::{AccessToken, TokenResponse};
use crate::pkce::PkcePair;
use crate::storage::{StorageError, VerifierStore, VERIFIER_KEY};
use log::{debug, info};
use rand::Rng;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No PKCE verifier stored; start the sign-in again")]
    MissingVerifier,
    #[error("Authorization was denied: {0}")]
    AuthorizationDenied(String),
    #[error("Token exchange rejected (HTTP {status}): {error}{}", describe(.description))]
    TokenRejected {
        status: u16,
        error: String,
        description: Option<String>,
    },
    #[error("Invalid authorization URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Verifier storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("Token request failed: {0}")]
    Http(#[from] HttpError),
}

fn describe(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(" - {}", d))
        .unwrap_or_default()
}

/// Starts an authorization attempt.
///
/// A new PKCE pair is generated, only its verifier is written to `store`,
/// and the URL the user must open is returned with these query parameters:
/// `client_id`, `response_type`, `redirect_uri`, `scope`,
/// `code_challenge_method` and `code_challenge`.
pub fn build_authorization_request<R: Rng>(
    config: &ClientConfig,
    store: &dyn VerifierStore,
    rng: &mut R,
) -> Result<Url, AuthError> {
    let pair = PkcePair::generate(rng);
    store.set(VERIFIER_KEY, &pair.verifier)?;

    let url = Url::parse_with_params(
        &config.authorize_url(),
        &[
            ("client_id", config.client_id()),
            ("response_type", "code"),
            ("redirect_uri", config.redirect_uri()),
            ("scope", config.scope_param().as_str()),
            ("code_challenge_method", "S256"),
            ("code_challenge", pair.challenge.as_str()),
        ],
    )?;

    info!("Authorization URL ready for client {}", config.client_id());
    Ok(url)
}

/// Redeems an authorization code with the stored verifier.
///
/// Fails with [`AuthError::MissingVerifier`] before touching the network when
/// no verifier is stored. The verifier is left in place afterwards.
pub async fn exchange_code_for_token(
    config: &ClientConfig,
    store: &dyn VerifierStore,
    http: &dyn HttpClient,
    code: &str,
) -> Result<AccessToken, AuthError> {
    let verifier = store
        .get(VERIFIER_KEY)?
        .ok_or(AuthError::MissingVerifier)?;

    let form = [
        ("client_id", config.client_id()),
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", config.redirect_uri()),
        ("code_verifier", verifier.as_str()),
    ];

    let response = http.post_form(&config.token_url(), &form).await?;
    let token: TokenResponse = response.json()?;

    match token.access_token {
        Some(access_token) => {
            debug!(
                "Token granted: type={:?} expires_in={:?} scope={:?}",
                token.token_type, token.expires_in, token.scope
            );
            Ok(AccessToken::new(access_token))
        }
        None => Err(AuthError::TokenRejected {
            status: response.status,
            error: token.error.unwrap_or_else(|| "missing access_token".to_string()),
            description: token.error_description,
        }),
    }
}
