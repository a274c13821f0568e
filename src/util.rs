use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::stable_pair;

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let first = stable_pair("alice");
        let second = stable_pair("alice");
        assert_eq!(first, second);

        for id in ["alice", "bob", "techcorp", "project_alpha", "react"] {
            let (x, y) = stable_pair(id);
            assert!((-1.0..=1.0).contains(&x));
            assert!((-1.0..=1.0).contains(&y));
        }
    }

    #[test]
    fn stable_pair_varies_across_ids() {
        assert_ne!(stable_pair("alice"), stable_pair("bob"));
    }
}
