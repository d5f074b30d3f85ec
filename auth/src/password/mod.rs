pub mod argon2;
pub mod codec;
pub mod errors;

pub use argon2::PasswordHasher;
pub use codec::DecodedHash;
pub use codec::HashingParameters;
pub use errors::HashError;
