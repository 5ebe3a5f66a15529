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

//! HTML rendering of the profile page.
//!
//! The page template exposes a fixed set of insertion targets (see [`Target`]).
//! [`HtmlRenderer`] fills them the way the browser script fills the DOM and can
//! then serialize the whole document.

use crate::models::{Artist, Page, Profile, Track};
use rspotify::model::Image;
use std::collections::HashMap;

/// Shown on cards whose item has no image.
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='300' height='300'%3E%3Crect width='100%25' height='100%25' fill='%23dee2e6'/%3E%3C/svg%3E";

const AVATAR_SIZE: u32 = 200;

/// Destination of rendered data, consumed once per page view.
pub trait Renderer {
    fn render_profile(&mut self, profile: &Profile);
    fn render_top_tracks(&mut self, tracks: &Page<Track>);
    fn render_top_artists(&mut self, artists: &Page<Artist>);
}

/// Named insertion points of the page template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    DisplayName,
    Avatar,
    ImgUrl,
    Id,
    Email,
    Uri,
    Url,
    TopTracks,
    TopArtists,
}

impl Target {
    pub fn id(&self) -> &'static str {
        match self {
            Target::DisplayName => "displayName",
            Target::Avatar => "avatar",
            Target::ImgUrl => "imgUrl",
            Target::Id => "id",
            Target::Email => "email",
            Target::Uri => "uri",
            Target::Url => "url",
            Target::TopTracks => "topTracks",
            Target::TopArtists => "topArtists",
        }
    }
}

#[derive(Debug, Default)]
pub struct HtmlRenderer {
    content: HashMap<Target, String>,
    links: HashMap<Target, String>,
    track_cards: Vec<String>,
    artist_cards: Vec<String>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inner HTML written to `target`, if anything was.
    pub fn content(&self, target: Target) -> Option<&str> {
        self.content.get(&target).map(String::as_str)
    }

    /// `href` attribute set on a link target.
    pub fn link(&self, target: Target) -> Option<&str> {
        self.links.get(&target).map(String::as_str)
    }

    pub fn track_cards(&self) -> &[String] {
        &self.track_cards
    }

    pub fn artist_cards(&self) -> &[String] {
        &self.artist_cards
    }

    fn set_text(&mut self, target: Target, text: &str) {
        self.content.insert(target, escape(text));
    }

    fn set_link(&mut self, target: Target, text: &str, href: &str) {
        self.set_text(target, text);
        self.links.insert(target, href.to_string());
    }

    /// Serializes the page template with every target filled in.
    pub fn document(&self) -> String {
        let slot = |target: Target| self.content(target).unwrap_or_default();
        let href = |target: Target| escape(self.link(target).unwrap_or("#"));

        format!(
            r#"<!doctype html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>My Spotify Profile</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css">
</head>
<body class="container py-4">
    <h1>Display your Spotify profile data</h1>
    <section id="profile">
        <h2>Logged in as <span id="{display_name_id}">{display_name}</span></h2>
        <span id="{avatar_id}">{avatar}</span>
        <ul>
            <li>User ID: <span id="{id_id}">{id}</span></li>
            <li>Email: <span id="{email_id}">{email}</span></li>
            <li>Spotify URI: <a id="{uri_id}" href="{uri_href}">{uri}</a></li>
            <li>Link: <a id="{url_id}" href="{url_href}">{url}</a></li>
            <li>Profile Image: <span id="{img_url_id}">{img_url}</span></li>
        </ul>
    </section>
    <h2>Top Tracks</h2>
    <div id="{top_tracks_id}" class="d-flex flex-wrap gap-3">
{top_tracks}
    </div>
    <h2>Top Artists</h2>
    <div id="{top_artists_id}" class="d-flex flex-wrap gap-3">
{top_artists}
    </div>
</body>
</html>
"#,
            display_name_id = Target::DisplayName.id(),
            display_name = slot(Target::DisplayName),
            avatar_id = Target::Avatar.id(),
            avatar = slot(Target::Avatar),
            id_id = Target::Id.id(),
            id = slot(Target::Id),
            email_id = Target::Email.id(),
            email = slot(Target::Email),
            uri_id = Target::Uri.id(),
            uri_href = href(Target::Uri),
            uri = slot(Target::Uri),
            url_id = Target::Url.id(),
            url_href = href(Target::Url),
            url = slot(Target::Url),
            img_url_id = Target::ImgUrl.id(),
            img_url = slot(Target::ImgUrl),
            top_tracks_id = Target::TopTracks.id(),
            top_tracks = self.track_cards.join("\n"),
            top_artists_id = Target::TopArtists.id(),
            top_artists = self.artist_cards.join("\n"),
        )
    }
}

impl Renderer for HtmlRenderer {
    fn render_profile(&mut self, profile: &Profile) {
        self.set_text(
            Target::DisplayName,
            profile.display_name.as_deref().unwrap_or_default(),
        );

        if let Some(image) = profile.avatar() {
            let avatar = format!(
                r#"<img src="{}" width="{size}" height="{size}" class="rounded-circle">"#,
                escape(&image.url),
                size = AVATAR_SIZE
            );
            self.content.insert(Target::Avatar, avatar);
            self.set_text(Target::ImgUrl, &image.url);
        }

        self.set_text(Target::Id, &profile.id);
        self.set_text(Target::Email, profile.email.as_deref().unwrap_or_default());
        self.set_link(
            Target::Uri,
            &profile.uri,
            profile
                .external_urls
                .get("spotify")
                .map(String::as_str)
                .unwrap_or_default(),
        );
        self.set_link(Target::Url, &profile.href, &profile.href);
    }

    fn render_top_tracks(&mut self, tracks: &Page<Track>) {
        for track in &tracks.items {
            let body = format!(
                r#"<h5 class="card-title">{}</h5>
<p class="card-text">{}</p>
{}"#,
                escape(&track.name),
                escape(&track.artist_names()),
                link_button(track.spotify_url(), "Go to track")
            );
            self.track_cards
                .push(card(track.cover(), &track.name, &body, ""));
        }
    }

    fn render_top_artists(&mut self, artists: &Page<Artist>) {
        for artist in &artists.items {
            let body = format!(
                r#"<h5 class="card-title">{}</h5>
<p class="card-text">Followers: {} | Popularity: {}</p>
{}"#,
                escape(&artist.name),
                artist.follower_count(),
                artist.popularity,
                link_button(artist.spotify_url(), "Go to artist")
            );

            let genres: String = artist
                .genres
                .iter()
                .map(|genre| format!(r#"<li class="list-group-item">{}</li>"#, escape(genre)))
                .collect();
            let genre_list = format!(r#"<ul class="list-group list-group-flush">{}</ul>"#, genres);

            self.artist_cards
                .push(card(artist.portrait(), &artist.name, &body, &genre_list));
        }
    }
}

fn card(image: Option<&Image>, alt: &str, body: &str, footer: &str) -> String {
    let src = image.map(|i| i.url.as_str()).unwrap_or(PLACEHOLDER_IMAGE);
    format!(
        r#"<div class="card" style="width: 18rem;">
<img class="card-img-top" src="{}" alt="{}">
<div class="card-body">
{}
</div>
{}</div>"#,
        escape(src),
        escape(alt),
        body,
        footer
    )
}

fn link_button(href: Option<&str>, label: &str) -> String {
    format!(
        r#"<a class="btn btn-primary" href="{}">{}</a>"#,
        escape(href.unwrap_or("#")),
        label
    )
}

/// Escapes text for both element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
