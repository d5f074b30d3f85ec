use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use serde::Serialize;

use super::errors::HashError;

/// Algorithm tag written as the first field of every encoded hash.
pub const ALGORITHM_TAG: &str = "argon2id";

/// The only argon2 version this codec produces and accepts (0x13).
pub const SUPPORTED_VERSION: u32 = 0x13;

const DELIMITER: char = '$';
const FIELD_COUNT: usize = 6;

/// Tunable work factor of the key-derivation function.
///
/// Every encoded hash carries its own copy of these values, so hashes created
/// under older defaults keep verifying after the defaults change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingParameters {
    pub memory_cost_kib: u32,
    pub iterations: u32,
    pub parallelism: u8,
    pub salt_length: u32,
    pub key_length: u32,
}

impl Default for HashingParameters {
    fn default() -> Self {
        Self {
            memory_cost_kib: 64 * 1024,
            iterations: 3,
            parallelism: 2,
            salt_length: 16,
            key_length: 32,
        }
    }
}

impl HashingParameters {
    fn argon2(&self) -> Result<Argon2<'static>, HashError> {
        let params = Params::new(
            self.memory_cost_kib,
            self.iterations,
            u32::from(self.parallelism),
            Some(self.key_length as usize),
        )
        .map_err(|e| HashError::InvalidParameters(e.to_string()))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Parts recovered from an encoded hash.
///
/// `params.salt_length` and `params.key_length` always equal `salt.len()` and
/// `key.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHash {
    pub params: HashingParameters,
    pub salt: Vec<u8>,
    pub key: Vec<u8>,
}

/// Hash a password into the self-describing `$argon2id$v=19$m=..,t=..,p=..$salt$key` form.
///
/// # Arguments
/// * `password` - Plaintext password bytes
/// * `params` - Work factor to hash with (recorded in the output)
///
/// # Errors
/// * `RandomSource` - The operating system entropy source failed
/// * `InvalidParameters` - The work factor is rejected by argon2
pub fn encode(password: &[u8], params: &HashingParameters) -> Result<String, HashError> {
    encode_with_rng(password, params, &mut OsRng)
}

/// Same as [`encode`], drawing the salt from `rng`.
pub fn encode_with_rng<R: RngCore>(
    password: &[u8],
    params: &HashingParameters,
    rng: &mut R,
) -> Result<String, HashError> {
    let mut salt = vec![0u8; params.salt_length as usize];
    rng.try_fill_bytes(&mut salt)
        .map_err(|e| HashError::RandomSource(e.to_string()))?;

    let key = derive_key(password, &salt, params)?;

    Ok(format!(
        "{d}{tag}{d}v={version}{d}m={m},t={t},p={p}{d}{salt}{d}{key}",
        d = DELIMITER,
        tag = ALGORITHM_TAG,
        version = SUPPORTED_VERSION,
        m = params.memory_cost_kib,
        t = params.iterations,
        p = params.parallelism,
        salt = STANDARD_NO_PAD.encode(&salt),
        key = STANDARD_NO_PAD.encode(&key),
    ))
}

/// Parse an encoded hash back into its parameters, salt and derived key.
///
/// # Errors
/// * `InvalidHashFormat` - Wrong field count, unknown tag, malformed cost or base64 field
/// * `IncompatibleVersion` - The version field is not [`SUPPORTED_VERSION`]
pub fn decode(encoded: &str) -> Result<DecodedHash, HashError> {
    let fields: Vec<&str> = encoded.split(DELIMITER).collect();
    if fields.len() != FIELD_COUNT {
        return Err(HashError::InvalidHashFormat);
    }

    if !fields[0].is_empty() || fields[1] != ALGORITHM_TAG {
        return Err(HashError::InvalidHashFormat);
    }

    let version = fields[2]
        .strip_prefix("v=")
        .and_then(|v| v.parse::<u32>().ok())
        .ok_or(HashError::InvalidHashFormat)?;
    if version != SUPPORTED_VERSION {
        return Err(HashError::IncompatibleVersion {
            expected: SUPPORTED_VERSION,
            found: version,
        });
    }

    let (memory_cost_kib, iterations, parallelism) =
        parse_cost(fields[3]).ok_or(HashError::InvalidHashFormat)?;

    let salt = decode_field(fields[4])?;
    let key = decode_field(fields[5])?;

    Ok(DecodedHash {
        params: HashingParameters {
            memory_cost_kib,
            iterations,
            parallelism,
            salt_length: salt.len() as u32,
            key_length: key.len() as u32,
        },
        salt,
        key,
    })
}

/// Run argon2id over `password` and `salt`, producing `params.key_length` bytes.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    params: &HashingParameters,
) -> Result<Vec<u8>, HashError> {
    let mut key = vec![0u8; params.key_length as usize];
    params
        .argon2()?
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| HashError::InvalidParameters(e.to_string()))?;
    Ok(key)
}

fn parse_cost(field: &str) -> Option<(u32, u32, u8)> {
    let mut parts = field.split(',');
    let memory = parts.next()?.strip_prefix("m=")?.parse().ok()?;
    let iterations = parts.next()?.strip_prefix("t=")?.parse().ok()?;
    let parallelism = parts.next()?.strip_prefix("p=")?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((memory, iterations, parallelism))
}

fn decode_field(field: &str) -> Result<Vec<u8>, HashError> {
    let bytes = STANDARD_NO_PAD
        .decode(field)
        .map_err(|_| HashError::InvalidHashFormat)?;
    if bytes.is_empty() {
        return Err(HashError::InvalidHashFormat);
    }
    Ok(bytes)
}
