use rand::Rng;

/// URL-safe alphabet for block ids
const ALPHABET: &[u8; 64] = b"ModuleSymbhasOwnPr-0123456789ABCDEFGHNRVfgctiUvz_KqYTJkLxpZXIjQW";

/// Length of random ids (~126 bits of entropy)
pub const ID_LENGTH: usize = 21;

/// Generate a random, collision-resistant block id
pub fn random_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Source of fresh block ids
#[derive(Debug)]
pub enum IdGenerator {
    /// Random ids, used by the editor
    Random,
    /// `prefix-1`, `prefix-2`, ... for reproducible fixtures
    Sequential { prefix: String, count: u64 },
}

impl IdGenerator {
    pub fn random() -> Self {
        IdGenerator::Random
    }

    pub fn sequential(prefix: impl Into<String>) -> Self {
        IdGenerator::Sequential {
            prefix: prefix.into(),
            count: 0,
        }
    }

    /// Generate next id
    pub fn new_id(&mut self) -> String {
        match self {
            IdGenerator::Random => random_id(),
            IdGenerator::Sequential { prefix, count } => {
                *count += 1;
                format!("{}-{}", prefix, count)
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_ids_are_url_safe_and_distinct() {
        let ids: HashSet<_> = (0..1000).map(|_| random_id()).collect();
        assert_eq!(ids.len(), 1000);
        for id in &ids {
            assert_eq!(id.len(), ID_LENGTH);
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::sequential("blk");
        assert_eq!(gen.new_id(), "blk-1");
        assert_eq!(gen.new_id(), "blk-2");
    }
}
