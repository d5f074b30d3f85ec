use subtle::ConstantTimeEq;

use super::codec;
use super::codec::HashingParameters;
use super::errors::HashError;
use crate::ports::CredentialVerifier;

/// Password hashing implementation.
///
/// Hashes new passwords with the configured [`HashingParameters`] and verifies
/// candidates against any previously encoded hash, using the parameters that
/// hash carries rather than the current configuration.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    params: HashingParameters,
}

impl PasswordHasher {
    /// Create a new password hasher instance.
    ///
    /// # Arguments
    /// * `params` - Work factor applied to newly created hashes
    pub fn new(params: HashingParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &HashingParameters {
        &self.params
    }

    /// Hash a plaintext password for storage.
    ///
    /// # Errors
    /// * `RandomSource` - Salt generation failed
    /// * `InvalidParameters` - Configured work factor is rejected by argon2
    pub fn hash(&self, password: &str) -> Result<String, HashError> {
        codec::encode(password.as_bytes(), &self.params)
    }
}

impl CredentialVerifier for PasswordHasher {
    fn verify(&self, password: &[u8], encoded: &str) -> Result<bool, HashError> {
        let decoded = codec::decode(encoded)?;
        let candidate = codec::derive_key(password, &decoded.salt, &decoded.params)?;

        Ok(keys_match(&candidate, &decoded.key))
    }
}

/// Constant-time key comparison. Differing lengths compare unequal.
pub fn keys_match(candidate: &[u8], stored: &[u8]) -> bool {
    candidate.ct_eq(stored).into()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use std::time::Instant;

    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(HashingParameters {
            memory_cost_kib: 1024,
            iterations: 1,
            parallelism: 1,
            salt_length: 16,
            key_length: 32,
        })
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");

        assert!(hasher
            .verify(password.as_bytes(), &hash)
            .expect("Failed to verify password"));
        assert!(!hasher
            .verify(b"wrong_password", &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_verify_uses_params_from_hash() {
        let old = PasswordHasher::new(HashingParameters {
            memory_cost_kib: 2048,
            iterations: 2,
            ..*hasher().params()
        });
        let hash = old.hash("hunter2").expect("Failed to hash password");

        assert!(hasher().verify(b"hunter2", &hash).unwrap());
    }

    #[test]
    fn test_verify_tampered_key() {
        let hasher = hasher();
        let hash = hasher.hash("hunter2").unwrap();
        let decoded = codec::decode(&hash).unwrap();
        let prefix = hash.rsplit_once('$').unwrap().0.to_string();

        for index in 0..decoded.key.len() {
            let mut key = decoded.key.clone();
            key[index] ^= 0x01;
            let tampered = format!(
                "{}${}",
                prefix,
                base64::Engine::encode(&base64::engine::general_purpose::STANDARD_NO_PAD, &key)
            );

            assert!(!hasher.verify(b"hunter2", &tampered).unwrap(), "byte {index}");
        }
    }

    #[test]
    fn test_verify_invalid_hash() {
        let result = hasher().verify(b"password", "invalid_hash");
        assert_eq!(result, Err(HashError::InvalidHashFormat));
    }

    #[test]
    fn test_verify_incompatible_version() {
        let hash = hasher().hash("hunter2").unwrap().replacen("v=19", "v=18", 1);
        let result = hasher().verify(b"hunter2", &hash);
        assert!(matches!(result, Err(HashError::IncompatibleVersion { .. })));
    }

    #[test]
    fn test_keys_match_length_mismatch() {
        assert!(keys_match(b"abcd", b"abcd"));
        assert!(!keys_match(b"abcd", b"abc"));
        assert!(!keys_match(b"", b"a"));
    }

    /// Ratio of the slowest to the fastest comparison across mismatch offsets.
    /// Each offset keeps its best of several runs to shed scheduler noise.
    fn mismatch_offset_spread(rounds: u32, runs: usize) -> (f64, Vec<Duration>) {
        let stored = [0x5au8; 64];

        let measure = |offset: usize| -> Duration {
            let mut candidate = stored;
            candidate[offset] ^= 0xff;
            (0..runs)
                .map(|_| {
                    let start = Instant::now();
                    for _ in 0..rounds {
                        std::hint::black_box(keys_match(
                            std::hint::black_box(&candidate),
                            std::hint::black_box(&stored),
                        ));
                    }
                    start.elapsed()
                })
                .min()
                .unwrap()
        };

        // warm up
        measure(0);

        let timings: Vec<Duration> = [0, 16, 32, 48, 63].into_iter().map(measure).collect();
        let fastest = timings.iter().min().unwrap().as_nanos().max(1) as f64;
        let slowest = timings.iter().max().unwrap().as_nanos() as f64;

        (slowest / fastest, timings)
    }

    #[test]
    fn test_keys_match_timing_roughly_independent_of_mismatch_offset() {
        let (spread, timings) = mismatch_offset_spread(20_000, 5);

        assert!(spread < 3.0, "timings: {timings:?}");
    }

    #[test]
    #[ignore = "timing-sensitive, run with --ignored on a quiet machine"]
    fn test_keys_match_timing_independent_of_mismatch_offset() {
        let (spread, timings) = mismatch_offset_spread(200_000, 3);

        assert!(spread < 1.5, "timings: {timings:?}");
    }
}
