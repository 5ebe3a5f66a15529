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

use crate::api::{ApiClient, ApiError};
use crate::auth::{build_authorization_request, exchange_code_for_token, AuthError};
use crate::config::ClientConfig;
use crate::http::HttpClient;
use crate::models::{AccessToken, Dashboard};
use crate::render::Renderer;
use crate::storage::VerifierStore;
use log::info;
use rand::Rng;
use url::Url;

/// What a page load turned into.
#[derive(Debug)]
pub enum FlowOutcome {
    /// No code in the page URL: the user has to be sent here.
    NeedsRedirect(Url),
    /// The code was redeemed.
    Token(AccessToken),
}

/// Value of the `code` query parameter, if any.
pub fn authorization_code(page_url: &Url) -> Option<String> {
    page_url
        .query_pairs()
        .find(|(key, value)| key == "code" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

fn authorization_error(page_url: &Url) -> Option<String> {
    page_url
        .query_pairs()
        .find(|(key, _)| key == "error")
        .map(|(_, value)| value.into_owned())
}

/// Runs one page load: either starts an authorization attempt or redeems the
/// code found in `page_url`. The two branches never both run.
pub async fn resolve<R: Rng>(
    page_url: Option<&Url>,
    config: &ClientConfig,
    store: &dyn VerifierStore,
    http: &dyn HttpClient,
    rng: &mut R,
) -> Result<FlowOutcome, AuthError> {
    if let Some(error) = page_url.and_then(authorization_error) {
        return Err(AuthError::AuthorizationDenied(error));
    }

    match page_url.and_then(authorization_code) {
        None => {
            let url = build_authorization_request(config, store, rng)?;
            Ok(FlowOutcome::NeedsRedirect(url))
        }
        Some(code) => {
            info!("Authorization code received, exchanging for a token");
            let token = exchange_code_for_token(config, store, http, &code).await?;
            Ok(FlowOutcome::Token(token))
        }
    }
}

/// Fetches profile, top tracks and top artists, one after the other.
pub async fn load_dashboard(api: &ApiClient<'_>) -> Result<Dashboard, ApiError> {
    let profile = api.profile().await?;
    let top_tracks = api.top_tracks().await?;
    let top_artists = api.top_artists().await?;

    info!(
        "Loaded profile '{}' with {} top tracks and {} top artists",
        profile.id,
        top_tracks.items.len(),
        top_artists.items.len()
    );

    Ok(Dashboard {
        profile,
        top_tracks,
        top_artists,
    })
}

pub fn render_dashboard(dashboard: &Dashboard, renderer: &mut dyn Renderer) {
    renderer.render_profile(&dashboard.profile);
    renderer.render_top_tracks(&dashboard.top_tracks);
    renderer.render_top_artists(&dashboard.top_artists);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_REDIRECT_URI;
    use crate::http::testing::{FakeHttp, Recorded};
    use crate::render::{HtmlRenderer, Target};
    use crate::storage::{MemoryStore, VERIFIER_KEY};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> ClientConfig {
        ClientConfig::new("client-id", DEFAULT_REDIRECT_URI)
    }

    #[test]
    fn test_authorization_code_extraction() {
        let url = Url::parse("http://localhost:5173/callback?code=abc123&state=x").unwrap();
        assert_eq!(authorization_code(&url).as_deref(), Some("abc123"));

        let url = Url::parse("http://localhost:5173/callback?code=").unwrap();
        assert_eq!(authorization_code(&url), None);

        let url = Url::parse("http://localhost:5173/").unwrap();
        assert_eq!(authorization_code(&url), None);
    }

    #[tokio::test]
    async fn test_no_code_redirects_without_exchange() {
        let store = MemoryStore::new();
        let http = FakeHttp::default();
        let mut rng = StdRng::seed_from_u64(5);
        let page = Url::parse("http://localhost:5173/").unwrap();

        let outcome = resolve(Some(&page), &config(), &store, &http, &mut rng)
            .await
            .unwrap();

        match outcome {
            FlowOutcome::NeedsRedirect(url) => {
                let keys: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
                assert_eq!(
                    keys,
                    vec![
                        "client_id",
                        "response_type",
                        "redirect_uri",
                        "scope",
                        "code_challenge_method",
                        "code_challenge",
                    ]
                );
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(http.recorded().is_empty());
        assert!(store.get(VERIFIER_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_missing_page_url_redirects() {
        let store = MemoryStore::new();
        let http = FakeHttp::default();
        let mut rng = StdRng::seed_from_u64(6);

        let outcome = resolve(None, &config(), &store, &http, &mut rng)
            .await
            .unwrap();
        assert!(matches!(outcome, FlowOutcome::NeedsRedirect(_)));
    }

    #[tokio::test]
    async fn test_code_is_exchanged() {
        let store = MemoryStore::new();
        store.set(VERIFIER_KEY, "v1").unwrap();
        let http = FakeHttp::with_responses(vec![(200, r#"{"access_token":"tok"}"#)]);
        let mut rng = StdRng::seed_from_u64(7);
        let page = Url::parse("http://localhost:5173/callback?code=abc123").unwrap();

        let outcome = resolve(Some(&page), &config(), &store, &http, &mut rng)
            .await
            .unwrap();

        match outcome {
            FlowOutcome::Token(token) => assert_eq!(token.secret(), "tok"),
            other => panic!("unexpected outcome {:?}", other),
        }
        // The stored verifier was not replaced by a new attempt.
        assert_eq!(store.get(VERIFIER_KEY).unwrap().as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_denied_consent_is_an_error() {
        let store = MemoryStore::new();
        let http = FakeHttp::default();
        let mut rng = StdRng::seed_from_u64(8);
        let page = Url::parse("http://localhost:5173/callback?error=access_denied").unwrap();

        let result = resolve(Some(&page), &config(), &store, &http, &mut rng).await;

        assert!(matches!(result, Err(AuthError::AuthorizationDenied(ref e)) if e == "access_denied"));
        assert!(http.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_fetches_in_order_and_renders() {
        let http = FakeHttp::with_responses(vec![
            (
                200,
                r#"{"id":"wizzler","display_name":"JM Wizzler","images":[],"uri":"spotify:user:wizzler"}"#,
            ),
            (200, r#"{"items":[{"name":"One","artists":[{"name":"U2"}]}]}"#),
            (200, r#"{"items":[{"name":"U2","genres":["rock"]}]}"#),
        ]);
        let api = ApiClient::new(&http, "https://api.spotify.com", AccessToken::new("tok"));

        let dashboard = load_dashboard(&api).await.unwrap();

        let urls: Vec<String> = http
            .recorded()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Get { url, .. } => Some(url),
                Recorded::Post { .. } => None,
            })
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://api.spotify.com/v1/me",
                "https://api.spotify.com/v1/me/top/tracks",
                "https://api.spotify.com/v1/me/top/artists",
            ]
        );

        let mut renderer = HtmlRenderer::new();
        render_dashboard(&dashboard, &mut renderer);
        assert_eq!(renderer.content(Target::DisplayName), Some("JM Wizzler"));
        assert_eq!(renderer.track_cards().len(), 1);
        assert_eq!(renderer.artist_cards().len(), 1);
    }
}
