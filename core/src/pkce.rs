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

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the verifier sent to Spotify. The server accepts 43 to 128.
pub const VERIFIER_LENGTH: usize = 128;

/// A PKCE verifier together with its S256 challenge.
///
/// Only the verifier is ever persisted; the challenge goes out with the
/// authorization request and is then forgotten.
#[derive(Debug, Clone)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    /// Creates a fresh pair. Call this once per authorization attempt.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let verifier = generate_verifier(rng, VERIFIER_LENGTH);
        let challenge = generate_challenge(&verifier);
        Self {
            verifier,
            challenge,
        }
    }
}

/// Returns `length` characters drawn uniformly from `[A-Za-z0-9]`.
pub fn generate_verifier<R: Rng>(rng: &mut R, length: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Computes `BASE64URL(SHA256(verifier))` without padding.
pub fn generate_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}
