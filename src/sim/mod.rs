use eframe::egui::{Vec2, vec2};

use crate::data::{EntityGraph, NodeKind};
use crate::util::stable_pair;

mod forces;
mod params;
mod quadtree;

pub use forces::{CenterForce, ChargeForce, CollisionForce, Force, LinkForce};
pub use params::{charge_strength, collision_radius, glyph_radius, label_offset};

use forces::ForceContext;

const ALPHA_MIN: f32 = 0.001;
const SETTLE_TICKS: f32 = 300.0;
const VELOCITY_DECAY: f32 = 0.6;
const INITIAL_RADIUS_STEP: f32 = 24.0;

pub struct SimNode {
    pub pos: Vec2,
    pub vel: Vec2,
    pub pin: Option<Vec2>,
}

pub struct SimLink {
    pub source: usize,
    pub target: usize,
}

struct ForceSlot {
    name: &'static str,
    enabled: bool,
    force: Force,
}

pub struct Simulation {
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    kinds: Vec<NodeKind>,
    degree: Vec<f32>,
    forces: Vec<ForceSlot>,
    alpha: f32,
    alpha_min: f32,
    alpha_decay: f32,
    alpha_target: f32,
    velocity_decay: f32,
    ticks: u64,
    on_tick: Option<Box<dyn FnMut()>>,
}

impl Simulation {
    pub fn new(graph: &EntityGraph) -> Self {
        let kinds = graph.nodes.iter().map(|node| node.kind).collect::<Vec<_>>();
        let links = graph
            .links
            .iter()
            .map(|link| {
                debug_assert!(link.source < graph.nodes.len());
                debug_assert!(link.target < graph.nodes.len());
                SimLink {
                    source: link.source,
                    target: link.target,
                }
            })
            .collect::<Vec<_>>();

        let mut degree = vec![0.0_f32; graph.nodes.len()];
        for link in &links {
            if link.source == link.target {
                continue;
            }
            degree[link.source] += 1.0;
            degree[link.target] += 1.0;
        }

        let nodes = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(index, record)| SimNode {
                pos: initial_position(&record.id, index),
                vel: Vec2::ZERO,
                pin: None,
            })
            .collect();

        Self {
            nodes,
            links,
            kinds,
            degree,
            forces: vec![
                ForceSlot {
                    name: "link",
                    enabled: true,
                    force: Force::Link(LinkForce::default()),
                },
                ForceSlot {
                    name: "charge",
                    enabled: true,
                    force: Force::Charge(ChargeForce::default()),
                },
                ForceSlot {
                    name: "center",
                    enabled: true,
                    force: Force::Center(CenterForce::default()),
                },
                ForceSlot {
                    name: "collision",
                    enabled: true,
                    force: Force::Collision(CollisionForce::default()),
                },
            ],
            alpha: 1.0,
            alpha_min: ALPHA_MIN,
            // Chosen so a fresh layout rests after roughly SETTLE_TICKS ticks.
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / SETTLE_TICKS),
            alpha_target: 0.0,
            velocity_decay: VELOCITY_DECAY,
            ticks: 0,
            on_tick: None,
        }
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn active(&self) -> bool {
        self.alpha >= self.alpha_min || self.alpha_target >= self.alpha_min
    }

    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

        let mut ctx = ForceContext {
            nodes: &mut self.nodes,
            links: &self.links,
            kinds: &self.kinds,
            degree: &self.degree,
            alpha: self.alpha,
        };
        for slot in &mut self.forces {
            if slot.enabled {
                slot.force.apply(&mut ctx);
            }
        }

        for node in &mut self.nodes {
            if let Some(pin) = node.pin {
                node.pos = pin;
                node.vel = Vec2::ZERO;
            } else {
                node.vel *= self.velocity_decay;
                node.pos += node.vel;
            }
        }

        self.ticks += 1;
        if let Some(observer) = &mut self.on_tick {
            observer();
        }
    }

    pub fn step(&mut self) -> bool {
        if !self.active() {
            return false;
        }
        self.tick();
        true
    }

    pub fn restart(&mut self) {
        self.alpha = if self.alpha_target > 0.0 {
            self.alpha.max(self.alpha_target)
        } else {
            1.0
        };
    }

    pub fn reheat(&mut self, alpha: f32) {
        self.alpha = self.alpha.max(alpha.clamp(0.0, 1.0));
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    pub fn pin(&mut self, index: usize, pos: Vec2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pin = Some(pos);
        }
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pin = None;
        }
    }

    pub fn set_position(&mut self, index: usize, pos: Vec2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pos = pos;
            node.vel = Vec2::ZERO;
        }
    }

    pub fn set_center(&mut self, target: Vec2) {
        if let Some(Force::Center(center)) = self.force_mut("center") {
            center.target = target;
        }
    }

    pub fn force_mut(&mut self, name: &str) -> Option<&mut Force> {
        self.forces
            .iter_mut()
            .find(|slot| slot.name == name)
            .map(|slot| &mut slot.force)
    }

    pub fn set_force_enabled(&mut self, name: &str, enabled: bool) {
        if let Some(slot) = self.forces.iter_mut().find(|slot| slot.name == name) {
            slot.enabled = enabled;
        }
    }

    pub fn force_slots(&self) -> Vec<(&'static str, bool)> {
        self.forces
            .iter()
            .map(|slot| (slot.name, slot.enabled))
            .collect()
    }

    pub fn set_tick_observer(&mut self, observer: impl FnMut() + 'static) {
        self.on_tick = Some(Box::new(observer));
    }
}

fn initial_position(id: &str, index: usize) -> Vec2 {
    let (jx, jy) = stable_pair(id);
    let mut direction = vec2(jx, jy);
    if direction.length_sq() <= 0.0001 {
        let angle = ((index as f32) * 0.618_034 + 0.11) * std::f32::consts::TAU;
        direction = vec2(angle.cos(), angle.sin());
    } else {
        direction = direction.normalized();
    }

    direction * (INITIAL_RADIUS_STEP * (0.5 + index as f32).sqrt())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::data::{LinkRecord, NodeRecord, fallback_graph};

    fn two_node_graph() -> EntityGraph {
        let nodes = vec![
            NodeRecord {
                id: "a".to_owned(),
                name: "A".to_owned(),
                kind: NodeKind::Person,
                description: String::new(),
            },
            NodeRecord {
                id: "b".to_owned(),
                name: "B".to_owned(),
                kind: NodeKind::Person,
                description: String::new(),
            },
        ];
        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect();

        EntityGraph {
            nodes,
            links: vec![LinkRecord {
                source: 0,
                target: 1,
                relationship: "knows".to_owned(),
            }],
            index_by_id,
        }
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let graph = fallback_graph();
        let mut first = Simulation::new(&graph);
        let mut second = Simulation::new(&graph);

        for _ in 0..50 {
            first.tick();
            second.tick();
        }

        for (a, b) in first.nodes().iter().zip(second.nodes().iter()) {
            assert_eq!(a.pos, b.pos);
            assert_eq!(a.vel, b.vel);
        }
    }

    #[test]
    fn alpha_decays_monotonically_until_rest() {
        let graph = fallback_graph();
        let mut sim = Simulation::new(&graph);

        let mut previous = sim.alpha();
        while sim.step() {
            assert!(sim.alpha() < previous);
            previous = sim.alpha();
            assert!(sim.ticks() < 1_000, "simulation never rested");
        }

        assert!(sim.alpha() < 0.001);
        assert!(!sim.step());
        assert!((250..=350).contains(&sim.ticks()), "ticks: {}", sim.ticks());
    }

    #[test]
    fn resting_simulation_can_be_rearmed() {
        let graph = fallback_graph();
        let mut sim = Simulation::new(&graph);
        while sim.step() {}

        sim.set_alpha_target(0.3);
        assert!(sim.active());
        let before = sim.alpha();
        assert!(sim.step());
        assert!(sim.alpha() > before);

        sim.set_alpha_target(0.0);
        sim.restart();
        assert!((sim.alpha() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn pinned_node_holds_its_exact_position() {
        let graph = fallback_graph();
        let mut sim = Simulation::new(&graph);
        let pinned = vec2(123.5, -40.25);

        sim.pin(0, pinned);
        for _ in 0..10 {
            sim.tick();
            assert_eq!(sim.nodes()[0].pos, pinned);
            assert_eq!(sim.nodes()[0].vel, Vec2::ZERO);
        }

        sim.unpin(0);
        sim.tick();
        assert!(sim.nodes()[0].pin.is_none());
    }

    #[test]
    fn linked_pair_converges_to_the_link_distance() {
        let graph = two_node_graph();
        let mut sim = Simulation::new(&graph);
        sim.set_force_enabled("charge", false);
        sim.set_position(0, vec2(0.0, 0.0));
        sim.set_position(1, vec2(500.0, 0.0));

        for _ in 0..300 {
            sim.tick();
        }

        let gap = (sim.nodes()[1].pos - sim.nodes()[0].pos).length();
        assert!((gap - 100.0).abs() < 5.0, "gap: {gap}");
    }

    #[test]
    fn collision_passes_leave_no_overlap() {
        let graph = fallback_graph();
        let mut sim = Simulation::new(&graph);
        // Drop everything into a tight clump, then let the forces untangle it.
        for index in 0..graph.node_count() {
            sim.set_position(index, vec2((index as f32) * 2.0, 0.0));
        }

        for _ in 0..200 {
            sim.tick();
        }

        let nodes = sim.nodes();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let min_distance =
                    collision_radius(graph.nodes[i].kind) + collision_radius(graph.nodes[j].kind);
                let distance = (nodes[j].pos - nodes[i].pos).length();
                assert!(
                    distance >= min_distance - 1.0,
                    "nodes {i} and {j} overlap: {distance} < {min_distance}"
                );
            }
        }
    }

    #[test]
    fn tick_observer_fires_once_per_tick() {
        let graph = two_node_graph();
        let mut sim = Simulation::new(&graph);

        let fired = Rc::new(Cell::new(0_u64));
        let counter = Rc::clone(&fired);
        sim.set_tick_observer(move || counter.set(counter.get() + 1));

        for _ in 0..7 {
            sim.tick();
        }
        assert_eq!(fired.get(), 7);
        assert_eq!(sim.ticks(), 7);
    }

    #[test]
    fn forces_apply_in_registration_order_and_toggle_by_name() {
        let graph = two_node_graph();
        let mut sim = Simulation::new(&graph);

        let names = sim
            .force_slots()
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>();
        assert_eq!(names, ["link", "charge", "center", "collision"]);

        sim.set_force_enabled("charge", false);
        sim.set_force_enabled("no-such-force", false);
        assert_eq!(
            sim.force_slots(),
            [
                ("link", true),
                ("charge", false),
                ("center", true),
                ("collision", true),
            ]
        );
    }

    #[test]
    fn initial_placement_is_deterministic_and_spread_out() {
        let graph = fallback_graph();
        let first = Simulation::new(&graph);
        let second = Simulation::new(&graph);

        for (a, b) in first.nodes().iter().zip(second.nodes().iter()) {
            assert_eq!(a.pos, b.pos);
        }

        for i in 0..first.nodes().len() {
            for j in (i + 1)..first.nodes().len() {
                assert!(first.nodes()[i].pos != first.nodes()[j].pos);
            }
        }
    }
}
