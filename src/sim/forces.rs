use eframe::egui::{Vec2, vec2};

use crate::data::NodeKind;

use super::params;
use super::quadtree::QuadNode;
use super::{SimLink, SimNode};

pub(super) struct ForceContext<'a> {
    pub(super) nodes: &'a mut [SimNode],
    pub(super) links: &'a [SimLink],
    pub(super) kinds: &'a [NodeKind],
    pub(super) degree: &'a [f32],
    pub(super) alpha: f32,
}

pub enum Force {
    Link(LinkForce),
    Charge(ChargeForce),
    Center(CenterForce),
    Collision(CollisionForce),
}

impl Force {
    pub(super) fn apply(&mut self, ctx: &mut ForceContext<'_>) {
        match self {
            Self::Link(force) => force.apply(ctx),
            Self::Charge(force) => force.apply(ctx),
            Self::Center(force) => force.apply(ctx),
            Self::Collision(force) => force.apply(ctx),
        }
    }
}

// Deterministic unit vector for coincident points.
fn separation_direction(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

pub struct LinkForce {
    pub distance: f32,
    pub iterations: usize,
}

impl Default for LinkForce {
    fn default() -> Self {
        Self {
            distance: 100.0,
            iterations: 1,
        }
    }
}

impl LinkForce {
    fn apply(&self, ctx: &mut ForceContext<'_>) {
        for _ in 0..self.iterations.max(1) {
            for link in ctx.links {
                let (source, target) = (link.source, link.target);
                if source == target {
                    continue;
                }

                let mut delta = (ctx.nodes[target].pos + ctx.nodes[target].vel)
                    - (ctx.nodes[source].pos + ctx.nodes[source].vel);
                if delta.length_sq() < 1e-8 {
                    delta = separation_direction(source, target);
                }
                let length = delta.length();

                let source_degree = ctx.degree[source].max(1.0);
                let target_degree = ctx.degree[target].max(1.0);
                // Hubs move less per spring than leaves.
                let strength = 1.0 / source_degree.min(target_degree);
                let scale = (length - self.distance) / length * ctx.alpha * strength;
                let correction = delta * scale;

                let bias = source_degree / (source_degree + target_degree);
                ctx.nodes[target].vel -= correction * bias;
                ctx.nodes[source].vel += correction * (1.0 - bias);
            }
        }
    }
}

pub struct ChargeForce {
    pub theta: f32,
    pub distance_min_sq: f32,
}

impl Default for ChargeForce {
    fn default() -> Self {
        Self {
            theta: 0.72,
            distance_min_sq: 1.0,
        }
    }
}

impl ChargeForce {
    fn apply(&self, ctx: &mut ForceContext<'_>) {
        let node_count = ctx.nodes.len();
        if node_count < 2 {
            return;
        }

        // Resolved per pass, never cached at node construction.
        let charges = ctx
            .kinds
            .iter()
            .map(|kind| params::charge_strength(*kind))
            .collect::<Vec<_>>();
        let positions = ctx.nodes.iter().map(|node| node.pos).collect::<Vec<_>>();

        let Some(tree) = QuadNode::build(&positions, &charges) else {
            return;
        };

        for index in 0..node_count {
            let mut push = Vec2::ZERO;
            self.accumulate(&tree, index, &positions, &charges, ctx.alpha, &mut push);
            ctx.nodes[index].vel += push;
        }
    }

    fn accumulate(
        &self,
        node: &QuadNode,
        index: usize,
        positions: &[Vec2],
        charges: &[f32],
        alpha: f32,
        push: &mut Vec2,
    ) {
        if node.is_leaf() {
            for &other in &node.indices {
                if other == index {
                    continue;
                }

                let mut delta = positions[other] - positions[index];
                let mut distance_sq = delta.length_sq();
                if distance_sq < 1e-8 {
                    delta = separation_direction(index, other);
                    distance_sq = 1.0;
                }

                let softened = self.soften(distance_sq);
                *push += delta * (charges[other] * alpha / softened);
            }
            return;
        }

        let delta = node.center_of_charge - positions[index];
        let distance_sq = delta.length_sq().max(0.0001);
        let distance = distance_sq.sqrt();
        let can_approximate = !node.bounds.contains(positions[index])
            && ((node.bounds.side_length() / distance) < self.theta);

        if can_approximate {
            let softened = self.soften(distance_sq);
            *push += delta * (node.charge * alpha / softened);
            return;
        }

        for child in node.children.iter().flatten() {
            self.accumulate(child, index, positions, charges, alpha, push);
        }
    }

    fn soften(&self, distance_sq: f32) -> f32 {
        if distance_sq < self.distance_min_sq {
            (self.distance_min_sq * distance_sq).sqrt()
        } else {
            distance_sq
        }
    }
}

pub struct CenterForce {
    pub target: Vec2,
    pub strength: f32,
}

impl Default for CenterForce {
    fn default() -> Self {
        Self {
            target: Vec2::ZERO,
            strength: 0.05,
        }
    }
}

impl CenterForce {
    fn apply(&self, ctx: &mut ForceContext<'_>) {
        if ctx.nodes.is_empty() {
            return;
        }

        let mut centroid = Vec2::ZERO;
        for node in ctx.nodes.iter() {
            centroid += node.pos;
        }
        centroid /= ctx.nodes.len() as f32;

        // Equal nudge on every node: relative geometry is untouched.
        let nudge = (self.target - centroid) * self.strength;
        for node in ctx.nodes.iter_mut() {
            node.vel += nudge;
        }
    }
}

#[derive(Clone, Copy)]
struct CollisionParams {
    strength: f32,
    max_pair_distance_sq: f32,
}

pub struct CollisionForce {
    pub strength: f32,
    pub iterations: usize,
}

impl Default for CollisionForce {
    fn default() -> Self {
        Self {
            strength: 1.0,
            iterations: 3,
        }
    }
}

impl CollisionForce {
    fn apply(&self, ctx: &mut ForceContext<'_>) {
        let node_count = ctx.nodes.len();
        if node_count < 2 {
            return;
        }

        let radii = ctx
            .kinds
            .iter()
            .map(|kind| params::collision_radius(*kind))
            .collect::<Vec<_>>();
        let mut max_radius = 0.0_f32;
        for &radius in &radii {
            max_radius = max_radius.max(radius);
        }

        let max_pair_distance = max_radius * 2.0;
        let collision = CollisionParams {
            strength: self.strength,
            max_pair_distance_sq: max_pair_distance * max_pair_distance,
        };

        for _ in 0..self.iterations.max(1) {
            let projected = ctx
                .nodes
                .iter()
                .map(|node| node.pos + node.vel)
                .collect::<Vec<_>>();
            let Some(tree) = QuadNode::build(&projected, &radii) else {
                break;
            };

            resolve_collision_pairs(&tree, &tree, true, &projected, &radii, collision, ctx.nodes);
        }
    }
}

fn resolve_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    projected: &[Vec2],
    radii: &[f32],
    collision: CollisionParams,
    nodes: &mut [SimNode],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > collision.max_pair_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for i in 0..node_a.indices.len() {
                let from = node_a.indices[i];
                for j in (i + 1)..node_a.indices.len() {
                    resolve_pair(from, node_a.indices[j], projected, radii, collision, nodes);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    resolve_pair(from, to, projected, radii, collision, nodes);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_ref() else {
                continue;
            };

            resolve_collision_pairs(child_a, child_a, true, projected, radii, collision, nodes);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_ref() else {
                    continue;
                };
                resolve_collision_pairs(
                    child_a, child_b, false, projected, radii, collision, nodes,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            resolve_collision_pairs(child, node_b, false, projected, radii, collision, nodes);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            resolve_collision_pairs(node_a, child, false, projected, radii, collision, nodes);
        }
    }
}

fn resolve_pair(
    from: usize,
    to: usize,
    projected: &[Vec2],
    radii: &[f32],
    collision: CollisionParams,
    nodes: &mut [SimNode],
) {
    let delta = projected[from] - projected[to];
    let distance_sq = delta.length_sq();
    let min_distance = radii[from] + radii[to];
    if distance_sq >= min_distance * min_distance {
        return;
    }

    let distance = distance_sq.sqrt();
    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        separation_direction(from, to)
    };

    let push = (min_distance - distance) * collision.strength;
    let from_mass = radii[from] * radii[from];
    let to_mass = radii[to] * radii[to];
    // Big circles absorb less of the correction than small ones.
    let share = to_mass / (from_mass + to_mass);

    nodes[from].vel += direction * push * share;
    nodes[to].vel -= direction * push * (1.0 - share);
}
