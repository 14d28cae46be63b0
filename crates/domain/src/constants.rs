//! Configuration defaults
//!
//! Centralized defaults shared by the configuration model, the environment
//! loader and the encryptor factory.

// Encryptor defaults
pub const DEFAULT_ALGORITHM: &str = "PBEWITHHMACSHA512ANDAES_256";
pub const DEFAULT_KEY_OBTENTION_ITERATIONS: u32 = 1000;
pub const DEFAULT_POOL_SIZE: usize = 1;
pub const DEFAULT_SALT_GENERATOR: &str = "random";
pub const DEFAULT_IV_GENERATOR: &str = "random";
pub const DEFAULT_STRING_OUTPUT_TYPE: &str = "base64";
pub const DEFAULT_KEY_FORMAT: &str = "der";
pub const BUILT_IN_PROVIDER: &str = "built-in";

// AES-GCM defaults
pub const DEFAULT_GCM_ALGORITHM: &str = "AES/GCM/NoPadding";
pub const DEFAULT_GCM_SECRET_KEY_ALGORITHM: &str = "PBKDF2WithHmacSHA256";
pub const DEFAULT_GCM_SECRET_KEY_ITERATIONS: u32 = 1000;
pub const DEFAULT_GCM_SECRET_KEY_SALT: &str = "zero";

// Detection envelope
pub const DEFAULT_PREFIX: &str = "ENC(";
pub const DEFAULT_SUFFIX: &str = ")";

// Environment variable prefix for the configuration loader
pub const ENV_PREFIX: &str = "PROPCRYPT_";
