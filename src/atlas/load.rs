use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{info, warn};

use super::model::{GenreAtlas, GenreFeatures, GenreLink, GenreNode, Rgb};
use crate::util::parse_hex_color;

/// On-disk shape of the taxonomy file. Field names follow the exported
/// JSON, so they stay camelCase here and get renamed on the way in.
#[derive(Debug, Deserialize)]
struct RawAtlasFile {
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default)]
    links: Vec<RawLink>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    id: String,
    x: f32,
    y: f32,
    #[serde(default)]
    c: String,
    #[serde(default, rename = "topArtists")]
    top_artists: Vec<String>,
    #[serde(default)]
    features: Option<RawFeatures>,
}

#[derive(Debug, Deserialize)]
struct RawFeatures {
    #[serde(default, rename = "Danceability")]
    danceability: Option<f32>,
    #[serde(default, rename = "Energy")]
    energy: Option<f32>,
    #[serde(default, rename = "Acousticness")]
    acousticness: Option<f32>,
    #[serde(default, rename = "Instrumentalness")]
    instrumentalness: Option<f32>,
    #[serde(default, rename = "Valence")]
    valence: Option<f32>,
    #[serde(default, rename = "Tempo")]
    tempo: Option<f32>,
    #[serde(default, rename = "Loudness")]
    loudness: Option<f32>,
    #[serde(default, rename = "Speechiness")]
    speechiness: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct RawLink {
    source: String,
    target: String,
    #[serde(default = "default_link_weight")]
    value: f32,
}

fn default_link_weight() -> f32 {
    1.0
}

/// Reads and validates the genre taxonomy from disk.
pub fn load_atlas(path: &Path) -> Result<GenreAtlas> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading genre atlas from {}", path.display()))?;
    let atlas = parse_atlas(&raw).with_context(|| format!("parsing {}", path.display()))?;
    info!(
        nodes = atlas.node_count(),
        links = atlas.link_count(),
        "loaded genre atlas"
    );
    Ok(atlas)
}

pub(crate) fn parse_atlas(raw: &str) -> Result<GenreAtlas> {
    let file: RawAtlasFile = serde_json::from_str(raw).context("atlas file is not valid JSON")?;
    if file.nodes.is_empty() {
        bail!("atlas file contains no genres");
    }

    let mut nodes = Vec::with_capacity(file.nodes.len());
    let mut seen = std::collections::HashSet::with_capacity(file.nodes.len());
    for raw_node in file.nodes {
        if !seen.insert(raw_node.id.clone()) {
            bail!("duplicate genre id {:?}", raw_node.id);
        }
        let color = match parse_hex_color(&raw_node.c) {
            Some([r, g, b]) => Rgb::new(r, g, b),
            None => {
                warn!(genre = %raw_node.id, color = %raw_node.c, "unparseable genre color; using neutral");
                Rgb::NEUTRAL
            }
        };
        nodes.push(GenreNode {
            id: raw_node.id,
            anchor_x: raw_node.x,
            anchor_y: raw_node.y,
            color,
            top_artists: raw_node.top_artists,
            features: raw_node.features.map(convert_features).filter(|f| !f.is_empty()),
        });
    }

    let index_by_id: std::collections::HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id.as_str(), index))
        .collect();

    let mut links = Vec::with_capacity(file.links.len());
    let mut dropped = 0usize;
    for raw_link in &file.links {
        let (Some(&source), Some(&target)) = (
            index_by_id.get(raw_link.source.as_str()),
            index_by_id.get(raw_link.target.as_str()),
        ) else {
            dropped += 1;
            continue;
        };
        if source == target {
            dropped += 1;
            continue;
        }
        links.push(GenreLink {
            source,
            target,
            weight: raw_link.value,
        });
    }
    if dropped > 0 {
        warn!(dropped, "dropped links referencing unknown or identical genres");
    }

    Ok(GenreAtlas::new(nodes, links))
}

fn convert_features(raw: RawFeatures) -> GenreFeatures {
    GenreFeatures {
        danceability: raw.danceability,
        energy: raw.energy,
        acousticness: raw.acousticness,
        instrumentalness: raw.instrumentalness,
        valence: raw.valence,
        tempo: raw.tempo,
        loudness: raw.loudness,
        speechiness: raw.speechiness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nodes_links_and_optional_fields() {
        let raw = r##"{
            "nodes": [
                {"id": "rock", "x": 100.0, "y": 200.0, "c": "#e03131",
                 "topArtists": ["The Rolling Stones"],
                 "features": {"Energy": 0.8, "Tempo": 124.0}},
                {"id": "pop", "x": 300.0, "y": 180.0, "c": "#f783ac"}
            ],
            "links": [
                {"source": "rock", "target": "pop", "value": 2.0}
            ]
        }"##;

        let atlas = parse_atlas(raw).unwrap();
        assert_eq!(atlas.node_count(), 2);
        assert_eq!(atlas.link_count(), 1);
        assert_eq!(atlas.nodes[0].color, Rgb::new(0xe0, 0x31, 0x31));
        assert_eq!(atlas.nodes[0].top_artists, vec!["The Rolling Stones"]);
        let features = atlas.nodes[0].features.unwrap();
        assert_eq!(features.energy, Some(0.8));
        assert_eq!(features.danceability, None);
        assert!(atlas.nodes[1].features.is_none());
        assert_eq!(atlas.links[0].weight, 2.0);
    }

    #[test]
    fn duplicate_ids_are_fatal() {
        let raw = r##"{
            "nodes": [
                {"id": "rock", "x": 0, "y": 0, "c": "#ffffff"},
                {"id": "rock", "x": 1, "y": 1, "c": "#ffffff"}
            ],
            "links": []
        }"##;
        let error = parse_atlas(raw).unwrap_err();
        assert!(error.to_string().contains("duplicate genre id"));
    }

    #[test]
    fn dangling_and_self_links_are_dropped() {
        let raw = r##"{
            "nodes": [
                {"id": "rock", "x": 0, "y": 0, "c": "#ffffff"},
                {"id": "pop", "x": 1, "y": 1, "c": "#ffffff"}
            ],
            "links": [
                {"source": "rock", "target": "pop"},
                {"source": "rock", "target": "gone"},
                {"source": "pop", "target": "pop"}
            ]
        }"##;
        let atlas = parse_atlas(raw).unwrap();
        assert_eq!(atlas.link_count(), 1);
        assert_eq!(atlas.links[0].weight, 1.0);
    }

    #[test]
    fn malformed_color_falls_back_to_neutral() {
        let raw = r#"{
            "nodes": [{"id": "rock", "x": 0, "y": 0, "c": "red"}],
            "links": []
        }"#;
        let atlas = parse_atlas(raw).unwrap();
        assert_eq!(atlas.nodes[0].color, Rgb::NEUTRAL);
    }

    #[test]
    fn empty_node_list_is_fatal() {
        assert!(parse_atlas(r#"{"nodes": [], "links": []}"#).is_err());
    }
}
