//! Spotify Web API bindings behind the listening source traits.

pub mod client;
mod types;

pub use client::SpotifyClient;
