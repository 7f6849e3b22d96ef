use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a purchase secret.
pub const SECRET_LEN: usize = 8;

/// Random purchase secret of [`SECRET_LEN`] characters from `A-Z0-9`.
pub fn generate_secret() -> String {
    let mut rng = rand::thread_rng();
    (0..SECRET_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn secret_has_fixed_length_and_alphabet(_seed in any::<u8>()) {
            let secret = generate_secret();
            prop_assert_eq!(secret.len(), SECRET_LEN);
            prop_assert!(secret.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }
}
