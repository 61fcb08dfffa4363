use std::fmt::{self, Debug, Display};

use rand::prelude::Distribution;
use rand::Rng;

/// Number of characters in a generated identifier. 24 characters of a
/// 32-character alphabet carry 120 bits of entropy, so collisions are not a
/// practical concern and publishing never checks for an existing key.
const LENGTH: usize = 24;

/// Word-safe alphabet, a Base32 extension of the Open Location Code Base20
/// alphabet.
const ALPHABET: &[u8; 32] = b"23456789CFGHJMPQRVWXcfghjmpqrvwx";

/// Opaque identifier of a stored paste. It doubles as the public access
/// credential, so values carry no structure and cannot be guessed.
pub struct PasteId([IdChar; LENGTH]);

impl PasteId {
    pub fn as_bytes(&self) -> [u8; LENGTH] {
        self.0.map(|c| c.0 as u8)
    }
}

impl Display for PasteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_iter(self.0.map(|c| c.0)))
    }
}

impl Debug for PasteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PasteId").field(&self.to_string()).finish()
    }
}

#[derive(Clone, Copy)]
struct IdChar(char);

pub struct Generator;

impl Distribution<IdChar> for Generator {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> IdChar {
        let value = rng.gen_range(0..ALPHABET.len());
        IdChar(ALPHABET[value] as char)
    }
}

impl Distribution<PasteId> for Generator {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PasteId {
        let mut arr = [IdChar('\0'); LENGTH];

        for c in arr.iter_mut() {
            *c = self.sample(rng);
        }

        PasteId(arr)
    }
}
