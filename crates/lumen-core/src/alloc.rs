//! Hash collections used across Lumen.
//!
//! Everything keyed by resource path goes through these aliases so the hasher
//! can be swapped in one place.

pub use ahash::AHashMap as HashMap;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_keyed_map() {
        let mut map: HashMap<String, u32> = HashMap::new();
        map.insert("textures/a.png".to_string(), 1);
        assert_eq!(map.get("textures/a.png"), Some(&1));
        assert!(map.get("textures/b.png").is_none());
    }
}
