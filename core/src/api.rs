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

use crate::http::{HttpClient, HttpError};
use crate::models::{AccessToken, Artist, Page, Profile, Track};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Spotify API request failed: {0}")]
    Http(#[from] HttpError),
    #[error("Unexpected document from {endpoint}: {source}")]
    Shape {
        endpoint: Endpoint,
        source: serde_json::Error,
    },
}

/// Web API resources read by the profile page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Profile,
    TopTracks,
    TopArtists,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Profile => "/v1/me",
            Endpoint::TopTracks => "/v1/me/top/tracks",
            Endpoint::TopArtists => "/v1/me/top/artists",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Affinity window of the top-items endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }
}

/// Optional query for the top-items endpoints. Empty means server defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopItemsQuery {
    pub time_range: Option<TimeRange>,
    pub limit: Option<u32>,
}

impl TopItemsQuery {
    fn to_query_string(self) -> String {
        let mut pairs = Vec::new();
        if let Some(range) = self.time_range {
            pairs.push(format!("time_range={}", range.as_str()));
        }
        if let Some(limit) = self.limit {
            pairs.push(format!("limit={}", limit));
        }
        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

/// Authenticated reader for the Spotify Web API.
pub struct ApiClient<'a> {
    http: &'a dyn HttpClient,
    base: String,
    token: AccessToken,
    query: TopItemsQuery,
}

impl<'a> ApiClient<'a> {
    pub fn new(http: &'a dyn HttpClient, base: &str, token: AccessToken) -> Self {
        Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            token,
            query: TopItemsQuery::default(),
        }
    }

    pub fn with_query(mut self, query: TopItemsQuery) -> Self {
        self.query = query;
        self
    }

    fn url(&self, endpoint: Endpoint) -> String {
        let query = match endpoint {
            Endpoint::Profile => String::new(),
            Endpoint::TopTracks | Endpoint::TopArtists => self.query.to_query_string(),
        };
        format!("{}{}{}", self.base, endpoint.path(), query)
    }

    /// Single authenticated GET. Error statuses are logged but their body is
    /// still parsed and handed back.
    pub async fn get_json(&self, endpoint: Endpoint) -> Result<Value, ApiError> {
        let response = self
            .http
            .get_bearer(&self.url(endpoint), self.token.secret())
            .await?;

        if !response.is_success() {
            warn!("{} answered HTTP {}", endpoint, response.status);
        }

        Ok(response.json()?)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, ApiError> {
        let value = self.get_json(endpoint).await?;
        let document = serde_json::from_value(value)
            .map_err(|source| ApiError::Shape { endpoint, source })?;
        debug!("Fetched {}", endpoint);
        Ok(document)
    }

    pub async fn profile(&self) -> Result<Profile, ApiError> {
        self.get(Endpoint::Profile).await
    }

    pub async fn top_tracks(&self) -> Result<Page<Track>, ApiError> {
        self.get(Endpoint::TopTracks).await
    }

    pub async fn top_artists(&self) -> Result<Page<Artist>, ApiError> {
        self.get(Endpoint::TopArtists).await
    }
}
