//! Password hashes in the format the web application reads and writes:
//! `method$salt$hexdigest`, the layout of werkzeug's `generate_password_hash`.
//!
//! New hashes use `pbkdf2:sha256:<iterations>`. Stored `pbkdf2:sha512` and
//! `scrypt:<n>:<r>:<p>` hashes are verified as well.

use pbkdf2::pbkdf2_hmac;
use rand::{Rng, distributions::Alphanumeric, rngs::OsRng};
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;

/// werkzeug 3.1 default.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 1_000_000;

const SALT_LEN: usize = 16;
const SCRYPT_KEY_LEN: usize = 64;
const SCRYPT_MAX_LOG_N: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    Matches,
    Mismatch,
    /// Unknown method or malformed hash string.
    UnsupportedHash,
}

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl PasswordHasher {
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn hash(&self, password: &str) -> String {
        let salt: String = OsRng
            .sample_iter(&Alphanumeric)
            .take(SALT_LEN)
            .map(char::from)
            .collect();
        let mut digest = [0u8; 32];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), self.iterations, &mut digest);
        format!("pbkdf2:sha256:{}${salt}${}", self.iterations, hex::encode(digest))
    }

    /// Check `candidate` against a stored hash. The work factor comes from
    /// the stored string, not from `self`.
    pub fn verify(&self, stored: &str, candidate: &str) -> PasswordCheck {
        let mut fields = stored.splitn(3, '$');
        let (Some(method), Some(salt), Some(expected)) = (fields.next(), fields.next(), fields.next())
        else {
            return PasswordCheck::UnsupportedHash;
        };
        let Ok(expected) = hex::decode(expected) else {
            return PasswordCheck::UnsupportedHash;
        };
        let Some(actual) = derive(method, candidate.as_bytes(), salt.as_bytes()) else {
            return PasswordCheck::UnsupportedHash;
        };
        if bool::from(actual.as_slice().ct_eq(expected.as_slice())) {
            PasswordCheck::Matches
        } else {
            PasswordCheck::Mismatch
        }
    }
}

/// Missing parameters take werkzeug's defaults.
fn derive(method: &str, password: &[u8], salt: &[u8]) -> Option<Vec<u8>> {
    let mut params = method.split(':');
    match params.next()? {
        "pbkdf2" => {
            let digest = params.next().unwrap_or("sha256");
            let iterations = match params.next() {
                Some(n) => n.parse::<u32>().ok().filter(|n| *n > 0)?,
                None => DEFAULT_PBKDF2_ITERATIONS,
            };
            match digest {
                "sha256" => {
                    let mut out = vec![0u8; 32];
                    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out);
                    Some(out)
                }
                "sha512" => {
                    let mut out = vec![0u8; 64];
                    pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut out);
                    Some(out)
                }
                _ => None,
            }
        }
        "scrypt" => {
            let n = params.next().map_or(Some(1 << 15), |v| v.parse::<u64>().ok())?;
            let r = params.next().map_or(Some(8), |v| v.parse::<u32>().ok())?;
            let p = params.next().map_or(Some(1), |v| v.parse::<u32>().ok())?;
            if !n.is_power_of_two() || n.trailing_zeros() > SCRYPT_MAX_LOG_N {
                return None;
            }
            let params = scrypt::Params::new(n.trailing_zeros() as u8, r, p, SCRYPT_KEY_LEN).ok()?;
            let mut out = vec![0u8; SCRYPT_KEY_LEN];
            scrypt::scrypt(password, salt, &params, &mut out).ok()?;
            Some(out)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Generated with werkzeug 3.1 `generate_password_hash("admin124", method=...)`.
    const WERKZEUG_PBKDF2_SHA256: &str = "pbkdf2:sha256:1000$pSODvn6f8KQHgZK4$1e2f3d6b9bbbb5ba3e991cf45df28e3281b385c68538279c4d8b86ae0306ee22";
    const WERKZEUG_PBKDF2_SHA512: &str = "pbkdf2:sha512:1000$ZdDgOT8PrmI6MF1d$10756823a3a2ae22a7bd4a2418343d626f2671d00e745f5e028a80d0f8b999a171a85241b219ef3fe2faccf609708bb9e125fa33864e90145d460168b8f25f69";
    const WERKZEUG_SCRYPT: &str = "scrypt:1024:8:1$zG3uKdU8jZTwPZsb$3ce133b95fc06ad66fce7a4c08e59a1fb495dc3b1e87744253a05a9048d8b1c471a15312cc696363b08fec2d6651f771813d699ff295dcb7fa83d3f6d2b50002";

    #[test]
    fn hashes_written_by_the_application_verify() {
        let hasher = PasswordHasher::default();
        for stored in [WERKZEUG_PBKDF2_SHA256, WERKZEUG_PBKDF2_SHA512, WERKZEUG_SCRYPT] {
            assert_eq!(hasher.verify(stored, "admin124"), PasswordCheck::Matches, "{stored}");
            assert_eq!(hasher.verify(stored, "admin123"), PasswordCheck::Mismatch, "{stored}");
        }
    }

    #[test]
    fn new_hash_uses_the_application_format() {
        let hasher = PasswordHasher::with_iterations(1000);
        let a = hasher.hash("s3cret");
        let b = hasher.hash("s3cret");
        assert_ne!(a, b);

        let fields: Vec<&str> = a.split('$').collect();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], "pbkdf2:sha256:1000");
        assert_eq!(fields[1].len(), SALT_LEN);
        assert!(fields[1].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(fields[2].len(), 64);

        assert_eq!(hasher.verify(&a, "s3cret"), PasswordCheck::Matches);
        assert_eq!(hasher.verify(&a, "wrong"), PasswordCheck::Mismatch);
    }

    #[test]
    fn default_iterations_match_werkzeug() {
        assert_eq!(PasswordHasher::default().iterations, 1_000_000);
        assert_eq!(PasswordHasher::with_iterations(0).iterations, 1);
    }

    #[test]
    fn unknown_or_malformed_hashes_are_unsupported() {
        let hasher = PasswordHasher::default();
        for stored in [
            "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA",
            "plain:secret",
            "md5$salt$00ff",
            "pbkdf2:sha256:1000$salt$not-hex",
            "pbkdf2:sha256:0$salt$00",
            "scrypt:1000:8:1$salt$00",
        ] {
            assert_eq!(hasher.verify(stored, "x"), PasswordCheck::UnsupportedHash, "{stored}");
        }
    }
}
