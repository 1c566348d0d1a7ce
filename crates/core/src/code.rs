//! Access code generation.
//!
//! A code is the sole identifier and sole credential for one message
//! lifecycle, so it must be unguessable even to an observer who has seen
//! arbitrarily many other codes.

use rand::Rng;

/// Alphabet for access codes. Visually confusable characters (`0`/`O`,
/// `1`/`l`/`I`) are excluded so codes survive being read aloud or
/// transcribed by hand.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

/// Default code length. 57^8 is roughly 10^14 codes, which keeps blind
/// guessing and reservation collisions both negligible.
pub const DEFAULT_CODE_LENGTH: usize = 8;

/// Generate a random access code of `length` characters.
///
/// Each character is drawn independently and uniformly from
/// [`CODE_ALPHABET`] using the thread-local CSPRNG. `random_range`
/// samples without modulo bias.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generates_requested_length() {
        assert_eq!(generate_code(0).len(), 0);
        assert_eq!(generate_code(8).len(), 8);
        assert_eq!(generate_code(32).len(), 32);
    }

    #[test]
    fn alphabet_excludes_confusable_characters() {
        for c in ['0', 'O', '1', 'l', 'I'] {
            assert!(
                !CODE_ALPHABET.contains(&(c as u8)),
                "alphabet must not contain {c}"
            );
        }
    }

    #[test]
    fn codes_only_use_the_alphabet() {
        for _ in 0..100 {
            let code = generate_code(DEFAULT_CODE_LENGTH);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)), "{code}");
        }
    }

    #[test]
    fn codes_do_not_repeat_in_practice() {
        // 57^8 possible codes; 1000 draws colliding would indicate a
        // broken sampler, not bad luck.
        let codes: HashSet<String> = (0..1000).map(|_| generate_code(DEFAULT_CODE_LENGTH)).collect();
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn all_alphabet_characters_are_reachable() {
        let mut seen = HashSet::new();
        for _ in 0..5000 {
            seen.extend(generate_code(DEFAULT_CODE_LENGTH).into_bytes());
        }
        assert_eq!(seen.len(), CODE_ALPHABET.len());
    }
}
