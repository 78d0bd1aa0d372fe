use chrono::Utc;
use rand::Rng;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Anonymous identifier: `user_<unix millis>_<9 base36 chars>`.
pub fn new_user_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("user_{}_{}", Utc::now().timestamp_millis(), suffix)
}

pub fn is_valid_user_id(user_id: &str) -> bool {
    !user_id.is_empty() && user_id.len() <= 128 && !user_id.chars().any(char::is_whitespace)
}
