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

pub mod api;
pub mod auth;
pub mod config;
pub mod flow;
pub mod http;
pub mod models;
pub mod pkce;
pub mod render;
pub mod storage;

// Re-export key items for convenience
pub use api::{ApiClient, ApiError, Endpoint, TimeRange, TopItemsQuery};
pub use auth::{build_authorization_request, exchange_code_for_token, AuthError};
pub use config::{ClientConfig, ConfigError};
pub use flow::{load_dashboard, render_dashboard, resolve, FlowOutcome};
pub use http::{HttpClient, ReqwestClient};
pub use models::{AccessToken, Dashboard};
pub use render::{HtmlRenderer, Renderer};
pub use storage::{FileStore, MemoryStore, VerifierStore};
