//! Identifier generation abstraction.
//!
//! In production, history item ids are short random base-36 strings. In tests
//! a sequential implementation is injected so assertions can name items.

use rand::Rng;

/// Length of generated history item identifiers.
pub const ID_LENGTH: usize = 9;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Source of opaque unique identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier.
    fn next_id(&self) -> String;
}

/// Production generator producing [`ID_LENGTH`] random base-36 characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> String {
        let mut rng = rand::rng();
        (0..ID_LENGTH)
            .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_are_lowercase_base36_of_fixed_length() {
        let id = RandomIds.next_id();

        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_random_ids_differ_between_calls() {
        let ids: std::collections::HashSet<String> = (0..64).map(|_| RandomIds.next_id()).collect();

        assert_eq!(ids.len(), 64);
    }
}
