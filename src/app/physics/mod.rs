mod quadtree;

use eframe::egui::{Pos2, Vec2, pos2, vec2};

use crate::atlas::GenreAtlas;
use crate::config::SimulationConfig;
use quadtree::QuadNode;

/// One spring between two genres. `bias` splits each correction between
/// the endpoints by degree, so hubs move less than their leaves.
#[derive(Debug, Clone, Copy)]
struct SimLink {
    source: usize,
    target: usize,
    bias: f32,
}

/// Annealed force layout over the atlas. Alpha starts hot, cools toward
/// `alpha_target` each tick, and the layout counts as settled once it
/// falls under the configured floor. Every tick applies link springs,
/// Barnes-Hut charge repulsion, and a per-node pull back to the
/// taxonomy anchor, then integrates with velocity decay.
pub struct Simulation {
    positions: Vec<Pos2>,
    velocities: Vec<Vec2>,
    anchors: Vec<Pos2>,
    pinned: Vec<Option<Pos2>>,
    links: Vec<SimLink>,
    alpha: f32,
    alpha_target: f32,
}

impl Simulation {
    pub fn new(atlas: &GenreAtlas) -> Self {
        let anchors: Vec<Pos2> = atlas
            .nodes
            .iter()
            .map(|node| pos2(node.anchor_x, node.anchor_y))
            .collect();
        let links = atlas
            .links
            .iter()
            .map(|link| {
                let source_degree = atlas.degree(link.source) as f32;
                let target_degree = atlas.degree(link.target) as f32;
                SimLink {
                    source: link.source,
                    target: link.target,
                    bias: source_degree / (source_degree + target_degree),
                }
            })
            .collect();

        let count = anchors.len();
        Self {
            positions: anchors.clone(),
            velocities: vec![Vec2::ZERO; count],
            anchors,
            pinned: vec![None; count],
            links,
            alpha: 1.0,
            alpha_target: 0.0,
        }
    }

    pub fn positions(&self) -> &[Pos2] {
        &self.positions
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target;
    }

    /// Warms the layout back up, e.g. after a tuning change.
    pub fn reheat(&mut self, alpha: f32) {
        self.alpha = self.alpha.max(alpha);
    }

    /// Moves the pin of a dragged node to the pointer's world position.
    pub fn pin_to(&mut self, index: usize, position: Pos2) {
        if index < self.pinned.len() {
            self.pinned[index] = Some(position);
        }
    }

    /// Releases a pinned node with no residual velocity, leaving it to
    /// drift only under the regular forces.
    pub fn unpin(&mut self, index: usize) {
        if index < self.pinned.len() {
            self.pinned[index] = None;
            self.velocities[index] = Vec2::ZERO;
        }
    }

    /// Advances one step. Returns false without touching any state when
    /// both alpha and its target sit under the floor, which is the
    /// settled condition.
    pub fn tick(&mut self, tuning: &SimulationConfig) -> bool {
        if self.alpha < tuning.alpha_min && self.alpha_target < tuning.alpha_min {
            return false;
        }
        self.alpha += (self.alpha_target - self.alpha) * tuning.alpha_decay;

        self.apply_link_springs(tuning);
        self.apply_charge(tuning);
        self.apply_anchor_pull(tuning);
        self.integrate(tuning);
        true
    }

    fn apply_link_springs(&mut self, tuning: &SimulationConfig) {
        let Self {
            links,
            positions,
            velocities,
            alpha,
            ..
        } = self;
        for link in links.iter() {
            let projected_target = positions[link.target] + velocities[link.target];
            let projected_source = positions[link.source] + velocities[link.source];
            let mut delta = projected_target - projected_source;
            if delta.length_sq() == 0.0 {
                delta = jiggle(link.source + link.target);
            }
            let length = delta.length();
            let scale = (length - tuning.link_distance) / length * *alpha * tuning.link_strength;
            let correction = delta * scale;
            velocities[link.target] -= correction * link.bias;
            velocities[link.source] += correction * (1.0 - link.bias);
        }
    }

    fn apply_charge(&mut self, tuning: &SimulationConfig) {
        let Some(root) = QuadNode::build(&self.positions) else {
            return;
        };
        let theta_sq = tuning.theta * tuning.theta;
        let min_distance_sq = tuning.charge_distance_min * tuning.charge_distance_min;
        let Self {
            positions,
            velocities,
            alpha,
            ..
        } = self;
        for (index, velocity) in velocities.iter_mut().enumerate() {
            let mut force = Vec2::ZERO;
            accumulate_charge(
                &root,
                index,
                positions,
                tuning.charge_strength,
                *alpha,
                theta_sq,
                min_distance_sq,
                &mut force,
            );
            *velocity += force;
        }
    }

    fn apply_anchor_pull(&mut self, tuning: &SimulationConfig) {
        let Self {
            positions,
            velocities,
            anchors,
            alpha,
            ..
        } = self;
        for index in 0..positions.len() {
            let delta = anchors[index] - positions[index];
            velocities[index] += delta * (tuning.anchor_strength * *alpha);
        }
    }

    fn integrate(&mut self, tuning: &SimulationConfig) {
        let retain = 1.0 - tuning.velocity_decay;
        let Self {
            positions,
            velocities,
            pinned,
            ..
        } = self;
        for index in 0..positions.len() {
            if let Some(hold) = pinned[index] {
                positions[index] = hold;
                velocities[index] = Vec2::ZERO;
            } else {
                velocities[index] *= retain;
                positions[index] += velocities[index];
            }
        }
    }
}

/// Barnes-Hut traversal for one node. Cells far enough away act through
/// their aggregated point mass; near cells recurse, and leaves apply
/// exact pairwise repulsion. Squared distances under the configured
/// minimum are softened toward it instead of clamped, following the
/// geometric-mean rule the original layout used.
#[allow(clippy::too_many_arguments)]
fn accumulate_charge(
    node: &QuadNode,
    index: usize,
    positions: &[Pos2],
    strength: f32,
    alpha: f32,
    theta_sq: f32,
    min_distance_sq: f32,
    out: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }
    let point = positions[index];

    if !node.is_leaf() {
        let mut delta = node.center_of_mass - point;
        let mut distance_sq = delta.length_sq();
        let side = node.bounds.side_length();
        if side * side < distance_sq * theta_sq && !node.bounds.contains(point) {
            if distance_sq == 0.0 {
                delta = jiggle(index);
                distance_sq = delta.length_sq();
            }
            if distance_sq < min_distance_sq {
                distance_sq = (min_distance_sq * distance_sq).sqrt();
            }
            *out += delta * (strength * node.mass * alpha / distance_sq);
            return;
        }
        for child in node.children.iter().flatten() {
            accumulate_charge(
                child,
                index,
                positions,
                strength,
                alpha,
                theta_sq,
                min_distance_sq,
                out,
            );
        }
        return;
    }

    for &other in &node.indices {
        if other == index {
            continue;
        }
        let mut delta = positions[other] - point;
        let mut distance_sq = delta.length_sq();
        if distance_sq == 0.0 {
            delta = jiggle(index + other);
            distance_sq = delta.length_sq();
        }
        if distance_sq < min_distance_sq {
            distance_sq = (min_distance_sq * distance_sq).sqrt();
        }
        *out += delta * (strength * alpha / distance_sq);
    }
}

/// Deterministic stand-in for the random nudge force layouts give
/// coincident points, derived from the golden angle so consecutive
/// indices spread in different directions.
fn jiggle(seed: usize) -> Vec2 {
    let angle = (seed as f32) * 2.399_963_2;
    vec2(angle.cos(), angle.sin()) * 1e-6
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{GenreAtlas, GenreLink, GenreNode, Rgb};

    fn atlas(anchors: &[(f32, f32)], links: &[(usize, usize)]) -> GenreAtlas {
        let nodes = anchors
            .iter()
            .enumerate()
            .map(|(index, &(x, y))| GenreNode {
                id: format!("genre-{index}"),
                anchor_x: x,
                anchor_y: y,
                color: Rgb::NEUTRAL,
                top_artists: Vec::new(),
                features: None,
            })
            .collect();
        let links = links
            .iter()
            .map(|&(source, target)| GenreLink {
                source,
                target,
                weight: 1.0,
            })
            .collect();
        GenreAtlas::new(nodes, links)
    }

    #[test]
    fn linked_nodes_approach_the_rest_distance() {
        let atlas = atlas(&[(0.0, 0.0), (300.0, 0.0)], &[(0, 1)]);
        let mut sim = Simulation::new(&atlas);
        // Isolate the spring: no charge, no anchors.
        let tuning = SimulationConfig {
            charge_strength: 0.0,
            anchor_strength: 0.0,
            ..SimulationConfig::default()
        };

        let start_gap = sim.positions()[0].distance(sim.positions()[1]);
        for _ in 0..200 {
            sim.tick(&tuning);
        }
        let end_gap = sim.positions()[0].distance(sim.positions()[1]);
        assert!(end_gap < start_gap);
        assert!((end_gap - tuning.link_distance).abs() < start_gap - tuning.link_distance);
    }

    #[test]
    fn isolated_node_returns_to_its_anchor() {
        let atlas = atlas(&[(100.0, 100.0)], &[]);
        let mut sim = Simulation::new(&atlas);
        let tuning = SimulationConfig::default();

        sim.positions[0] = pos2(400.0, -50.0);
        for _ in 0..300 {
            sim.tick(&tuning);
        }
        let distance = sim.positions()[0].distance(pos2(100.0, 100.0));
        assert!(distance < 10.0, "still {distance} away from anchor");
    }

    #[test]
    fn near_nodes_repel_each_other() {
        let atlas = atlas(&[(0.0, 0.0), (2.0, 0.0)], &[]);
        let mut sim = Simulation::new(&atlas);
        let tuning = SimulationConfig {
            anchor_strength: 0.0,
            ..SimulationConfig::default()
        };

        for _ in 0..30 {
            sim.tick(&tuning);
        }
        let gap = sim.positions()[0].distance(sim.positions()[1]);
        assert!(gap > 2.0, "gap only {gap}");
    }

    #[test]
    fn simulation_settles_and_reports_no_motion() {
        let atlas = atlas(&[(0.0, 0.0), (100.0, 0.0)], &[(0, 1)]);
        let mut sim = Simulation::new(&atlas);
        let tuning = SimulationConfig::default();

        let mut ticks = 0;
        while sim.tick(&tuning) {
            ticks += 1;
            assert!(ticks < 1000, "never settled");
        }
        assert!(sim.alpha < tuning.alpha_min);
        // Once settled it stays settled.
        assert!(!sim.tick(&tuning));
    }

    #[test]
    fn raising_the_alpha_target_wakes_a_settled_layout() {
        let atlas = atlas(&[(0.0, 0.0), (100.0, 0.0)], &[(0, 1)]);
        let mut sim = Simulation::new(&atlas);
        let tuning = SimulationConfig::default();
        while sim.tick(&tuning) {}

        sim.set_alpha_target(tuning.drag_alpha_target);
        assert!(sim.tick(&tuning));
        assert!(sim.alpha > 0.0);

        // Dropping the target lets it cool back down.
        sim.set_alpha_target(0.0);
        while sim.tick(&tuning) {}
        assert!(sim.alpha < tuning.alpha_min);
    }

    #[test]
    fn pinned_node_holds_position_but_still_repels() {
        let atlas = atlas(&[(0.0, 0.0), (30.0, 0.0)], &[]);
        let mut sim = Simulation::new(&atlas);
        let tuning = SimulationConfig {
            anchor_strength: 0.0,
            ..SimulationConfig::default()
        };

        sim.pin_to(0, pos2(0.0, 0.0));
        sim.set_alpha_target(tuning.drag_alpha_target);
        for _ in 0..50 {
            sim.tick(&tuning);
        }
        assert_eq!(sim.positions()[0], pos2(0.0, 0.0));
        // The free neighbor was pushed away by the pinned one.
        assert!(sim.positions()[1].x > 30.0);
    }

    #[test]
    fn unpin_releases_without_residual_velocity() {
        let atlas = atlas(&[(0.0, 0.0), (100.0, 0.0)], &[(0, 1)]);
        let mut sim = Simulation::new(&atlas);
        let tuning = SimulationConfig::default();

        sim.pin_to(0, pos2(-500.0, 40.0));
        for _ in 0..20 {
            sim.tick(&tuning);
        }
        sim.unpin(0);
        assert_eq!(sim.velocities[0], Vec2::ZERO);
        assert_eq!(sim.pinned[0], None);
    }

    #[test]
    fn dragged_pin_follows_the_given_positions() {
        let atlas = atlas(&[(0.0, 0.0)], &[]);
        let mut sim = Simulation::new(&atlas);
        let tuning = SimulationConfig::default();
        sim.set_alpha_target(tuning.drag_alpha_target);

        for step in 1..=5 {
            let target = pos2(step as f32 * 10.0, 0.0);
            sim.pin_to(0, target);
            sim.tick(&tuning);
            assert_eq!(sim.positions()[0], target);
        }
    }
}
