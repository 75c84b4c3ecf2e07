//! Passenger Name Record codes.

use rand::Rng;

pub const PNR_LENGTH: usize = 8;

/// Number of fresh codes a reservation draws before giving up on a collision streak.
pub const MAX_PNR_ATTEMPTS: usize = 5;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws a random 8-character code from `[A-Z0-9]`.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..PNR_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

pub fn is_well_formed(code: &str) -> bool {
    code.len() == PNR_LENGTH
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Uppercases user input so lookups accept `ab12cd34`.
pub fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
