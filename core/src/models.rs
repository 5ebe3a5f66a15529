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

use rspotify::model::{Followers, Image};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// Web API documents are modelled leniently: every field defaults, so an
// error-shaped body still deserializes and simply renders empty.

/// Bearer credential returned by the token endpoint. Lives in memory only.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Body of the token endpoint, successful or not.
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub display_name: Option<String>,
    pub id: String,
    pub email: Option<String>,
    pub uri: String,
    pub href: String,
    pub images: Vec<Image>,
    pub external_urls: HashMap<String, String>,
    pub followers: Option<Followers>,
    pub country: Option<String>,
    pub product: Option<String>,
}

impl Profile {
    pub fn avatar(&self) -> Option<&Image> {
        self.images.first()
    }
}

/// One page of a paging object. Only the items are consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u32,
    pub limit: u32,
    pub offset: u32,
    pub next: Option<String>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            limit: 0,
            offset: 0,
            next: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Album {
    pub name: String,
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtistRef {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    pub album: Album,
    pub artists: Vec<ArtistRef>,
    pub popularity: u32,
    pub external_urls: HashMap<String, String>,
}

impl Track {
    pub fn cover(&self) -> Option<&Image> {
        self.album.images.first()
    }

    /// Artist names joined the way they are shown on a card.
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<&str>>()
            .join(", ")
    }

    pub fn spotify_url(&self) -> Option<&str> {
        self.external_urls.get("spotify").map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Artist {
    pub id: Option<String>,
    pub name: String,
    pub images: Vec<Image>,
    pub followers: Option<Followers>,
    pub popularity: u32,
    pub genres: Vec<String>,
    pub external_urls: HashMap<String, String>,
}

impl Artist {
    pub fn portrait(&self) -> Option<&Image> {
        self.images.first()
    }

    pub fn follower_count(&self) -> u32 {
        self.followers.as_ref().map(|f| f.total).unwrap_or(0)
    }

    pub fn spotify_url(&self) -> Option<&str> {
        self.external_urls.get("spotify").map(String::as_str)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} (Album: {})", self.name, self.artist_names(), self.album.name)
    }
}

impl fmt::Display for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | Followers: {} | Popularity: {}",
            self.name,
            self.follower_count(),
            self.popularity
        )
    }
}

/// Everything fetched for one signed-in page view.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Dashboard {
    pub profile: Profile,
    pub top_tracks: Page<Track>,
    pub top_artists: Page<Artist>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_debug_hides_secret() {
        let token = AccessToken::new("BQD-very-secret");
        assert_eq!(format!("{:?}", token), "AccessToken(***)");
        assert_eq!(token.secret(), "BQD-very-secret");
    }

    #[test]
    fn test_profile_tolerates_error_body() {
        let body = r#"{"error":{"status":401,"message":"Invalid access token"}}"#;
        let profile: Profile = serde_json::from_str(body).unwrap();
        assert!(profile.id.is_empty());
        assert!(profile.avatar().is_none());
    }

    #[test]
    fn test_track_artist_names_join() {
        let body = r#"{
            "name": "Under Pressure",
            "album": {"name": "Hot Space", "images": [{"url": "https://i.scdn.co/a.jpg", "height": 640, "width": 640}]},
            "artists": [{"name": "Queen"}, {"name": "David Bowie"}],
            "external_urls": {"spotify": "https://open.spotify.com/track/1"}
        }"#;
        let track: Track = serde_json::from_str(body).unwrap();
        assert_eq!(track.artist_names(), "Queen, David Bowie");
        assert_eq!(track.cover().unwrap().url, "https://i.scdn.co/a.jpg");
        assert_eq!(track.spotify_url(), Some("https://open.spotify.com/track/1"));
        assert_eq!(
            format!("{}", track),
            "Under Pressure - Queen, David Bowie (Album: Hot Space)"
        );
    }

    #[test]
    fn test_artist_followers_default_to_zero() {
        let artist: Artist = serde_json::from_str(r#"{"name":"Nobody","popularity":3}"#).unwrap();
        assert_eq!(artist.follower_count(), 0);
        assert_eq!(format!("{}", artist), "Nobody | Followers: 0 | Popularity: 3");
    }

    #[test]
    fn test_artist_followers_from_api_shape() {
        let artist: Artist = serde_json::from_str(
            r#"{"name":"Queen","followers":{"href":null,"total":52000000},"genres":["rock"]}"#,
        )
        .unwrap();
        assert_eq!(artist.follower_count(), 52_000_000);
        assert_eq!(artist.genres, vec!["rock".to_string()]);
    }

    #[test]
    fn test_page_defaults() {
        let page: Page<Track> = serde_json::from_str("{}").unwrap();
        assert!(page.items.is_empty());
        assert!(page.next.is_none());
    }
}
