use crate::data::NodeKind;

pub fn charge_strength(kind: NodeKind) -> f32 {
    match kind {
        NodeKind::Portal => -50.0,
        NodeKind::Huge => -600.0,
        NodeKind::Large => -450.0,
        NodeKind::Small => -150.0,
        NodeKind::Person
        | NodeKind::Organization
        | NodeKind::Project
        | NodeKind::Technology
        | NodeKind::Medium
        | NodeKind::Other => -300.0,
    }
}

pub fn collision_radius(kind: NodeKind) -> f32 {
    match kind {
        NodeKind::Portal => 12.0,
        NodeKind::Huge => 35.0,
        NodeKind::Large => 30.0,
        NodeKind::Small => 20.0,
        NodeKind::Person
        | NodeKind::Organization
        | NodeKind::Project
        | NodeKind::Technology
        | NodeKind::Medium
        | NodeKind::Other => 25.0,
    }
}

pub fn glyph_radius(kind: NodeKind) -> f32 {
    match kind {
        NodeKind::Portal => 8.0,
        NodeKind::Huge => 30.0,
        NodeKind::Large => 25.0,
        NodeKind::Small => 15.0,
        NodeKind::Person
        | NodeKind::Organization
        | NodeKind::Project
        | NodeKind::Technology
        | NodeKind::Medium
        | NodeKind::Other => 20.0,
    }
}

pub fn label_offset(kind: NodeKind) -> f32 {
    match kind {
        NodeKind::Portal => 20.0,
        NodeKind::Huge => 42.0,
        NodeKind::Large => 37.0,
        NodeKind::Small => 27.0,
        NodeKind::Person
        | NodeKind::Organization
        | NodeKind::Project
        | NodeKind::Technology
        | NodeKind::Medium
        | NodeKind::Other => 32.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [NodeKind; 10] = [
        NodeKind::Person,
        NodeKind::Organization,
        NodeKind::Project,
        NodeKind::Technology,
        NodeKind::Portal,
        NodeKind::Huge,
        NodeKind::Large,
        NodeKind::Medium,
        NodeKind::Small,
        NodeKind::Other,
    ];

    #[test]
    fn charge_strength_matches_policy_table() {
        assert_eq!(charge_strength(NodeKind::Portal), -50.0);
        assert_eq!(charge_strength(NodeKind::Huge), -600.0);
        assert_eq!(charge_strength(NodeKind::Large), -450.0);
        assert_eq!(charge_strength(NodeKind::Medium), -300.0);
        assert_eq!(charge_strength(NodeKind::Small), -150.0);
    }

    #[test]
    fn entity_kinds_and_unknowns_use_the_medium_defaults() {
        for kind in [
            NodeKind::Person,
            NodeKind::Organization,
            NodeKind::Project,
            NodeKind::Technology,
            NodeKind::Other,
        ] {
            assert_eq!(charge_strength(kind), -300.0);
            assert_eq!(collision_radius(kind), 25.0);
            assert_eq!(glyph_radius(kind), 20.0);
            assert_eq!(label_offset(kind), 32.0);
        }
    }

    #[test]
    fn heavier_kinds_repel_harder_and_reserve_more_space() {
        assert!(charge_strength(NodeKind::Huge) < charge_strength(NodeKind::Large));
        assert!(charge_strength(NodeKind::Large) < charge_strength(NodeKind::Medium));
        assert!(charge_strength(NodeKind::Medium) < charge_strength(NodeKind::Small));

        assert!(collision_radius(NodeKind::Huge) > collision_radius(NodeKind::Large));
        assert!(collision_radius(NodeKind::Large) > collision_radius(NodeKind::Medium));
        assert!(collision_radius(NodeKind::Medium) > collision_radius(NodeKind::Small));
    }

    #[test]
    fn label_sits_outside_the_glyph_for_every_kind() {
        for kind in ALL_KINDS {
            assert!(label_offset(kind) > glyph_radius(kind));
            assert!(collision_radius(kind) >= glyph_radius(kind));
        }
    }
}
