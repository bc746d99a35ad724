use chrono::Utc;
use rand::Rng;

/// Verification codes are meant to be read aloud or typed by third parties.
/// The 36-character uppercase alphanumeric set keeps them short and easy to
/// transcribe while staying above 60 bits of entropy at 12 characters.
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const CERTIFICATE_ID_SUFFIX_LEN: usize = 6;
const VERIFICATION_CODE_LEN: usize = 12;

fn random_upper_alnum(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

/// Generate a human-traceable certificate identifier.
///
/// The UTC timestamp component gives rough chronological ordering; the random
/// suffix prevents collisions between certificates issued in the same second.
/// Uniqueness is ultimately enforced by the repository's unique index.
pub fn certificate_id() -> String {
    let stamp = Utc::now().format("%Y%m%d%H%M%S");
    format!(
        "CERT-{stamp}-{}",
        random_upper_alnum(CERTIFICATE_ID_SUFFIX_LEN)
    )
}

/// Generate a public verification code (12 uppercase alphanumerics, ~62 bits).
pub fn verification_code() -> String {
    random_upper_alnum(VERIFICATION_CODE_LEN)
}
