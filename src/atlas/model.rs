use std::collections::HashMap;

/// Canonical color of a genre as shipped in the taxonomy file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Fallback for entries whose color field failed to parse.
    pub const NEUTRAL: Self = Self::new(0x69, 0x69, 0x69);
}

/// Average audio character of a genre. Every dimension is optional
/// because the curated file only carries them for a subset of genres.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenreFeatures {
    pub danceability: Option<f32>,
    pub energy: Option<f32>,
    pub acousticness: Option<f32>,
    pub instrumentalness: Option<f32>,
    pub valence: Option<f32>,
    pub tempo: Option<f32>,
    pub loudness: Option<f32>,
    pub speechiness: Option<f32>,
}

impl GenreFeatures {
    pub fn is_empty(&self) -> bool {
        self.danceability.is_none()
            && self.energy.is_none()
            && self.acousticness.is_none()
            && self.instrumentalness.is_none()
            && self.valence.is_none()
            && self.tempo.is_none()
            && self.loudness.is_none()
            && self.speechiness.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct GenreNode {
    /// Unique genre name, also the display label.
    pub id: String,
    /// Hand-laid-out taxonomy position the layout anchors toward.
    pub anchor_x: f32,
    pub anchor_y: f32,
    pub color: Rgb,
    /// Representative artists, present only for curated entries.
    pub top_artists: Vec<String>,
    pub features: Option<GenreFeatures>,
}

/// Undirected relatedness edge between two genres, stored by node index.
#[derive(Debug, Clone, Copy)]
pub struct GenreLink {
    pub source: usize,
    pub target: usize,
    pub weight: f32,
}

/// The full genre taxonomy: nodes in file order plus index-resolved links.
/// File order is load-bearing for hit testing, which picks the first
/// matching node under the pointer.
#[derive(Debug, Clone, Default)]
pub struct GenreAtlas {
    pub nodes: Vec<GenreNode>,
    pub links: Vec<GenreLink>,
    index_by_id: HashMap<String, usize>,
    degree: Vec<usize>,
}

impl GenreAtlas {
    pub fn new(nodes: Vec<GenreNode>, links: Vec<GenreLink>) -> Self {
        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect();
        let mut degree = vec![0usize; nodes.len()];
        for link in &links {
            degree[link.source] += 1;
            degree[link.target] += 1;
        }
        Self {
            nodes,
            links,
            index_by_id,
            degree,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    /// Number of links touching the node. Link springs use this to move
    /// hubs less than their leaf neighbors.
    pub fn degree(&self, index: usize) -> usize {
        self.degree.get(index).copied().unwrap_or(0)
    }

    /// Genre names in taxonomy order, for name matching against listener
    /// genres.
    pub fn id_list(&self) -> Vec<String> {
        self.nodes.iter().map(|node| node.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> GenreNode {
        GenreNode {
            id: id.to_owned(),
            anchor_x: 0.0,
            anchor_y: 0.0,
            color: Rgb::NEUTRAL,
            top_artists: Vec::new(),
            features: None,
        }
    }

    #[test]
    fn degree_counts_both_endpoints() {
        let atlas = GenreAtlas::new(
            vec![node("a"), node("b"), node("c")],
            vec![
                GenreLink {
                    source: 0,
                    target: 1,
                    weight: 1.0,
                },
                GenreLink {
                    source: 0,
                    target: 2,
                    weight: 1.0,
                },
            ],
        );
        assert_eq!(atlas.degree(0), 2);
        assert_eq!(atlas.degree(1), 1);
        assert_eq!(atlas.degree(2), 1);
        assert_eq!(atlas.index_of("c"), Some(2));
        assert_eq!(atlas.index_of("missing"), None);
    }
}
