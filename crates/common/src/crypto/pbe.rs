//! Password-based encryption.
//!
//! Each call derives a fresh AES key from the password and a newly generated
//! salt with PBKDF2, then encrypts with AES-CBC and PKCS#7 padding.
//!
//! ## Frame
//!
//! ```text
//! [param_len: u8][params: param_len bytes][ciphertext]
//!
//! params = [salt_len: u8][salt][iterations: u32 BE][iv_len: u8][iv]
//! ```
//!
//! The header carries everything decryption needs besides the password, so
//! values encrypted with one salt/IV generator decrypt under any other.

use std::fmt;

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use tracing::debug;

use super::error::{CryptoError, CryptoResult};
use super::generators::{IvGenerator, SaltGenerator};
use super::kdf::{derive_key, KdfDigest};
use super::CipherBackend;
use crate::error::CommonError;
use crate::security::SecureString;

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 1000;

/// Salt length produced by random and zero generators.
pub const SALT_LEN: usize = 16;

/// AES block size, also the CBC IV length.
pub const IV_LEN: usize = 16;

/// Longest salt that still fits the one-byte parameter length.
pub const MAX_SALT_LEN: usize = 64;

/// Upper bound on the iteration count accepted from a ciphertext header.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// Supported password-based algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PbeAlgorithm {
    #[default]
    HmacSha512Aes256,
    HmacSha256Aes256,
    HmacSha256Aes128,
}

impl PbeAlgorithm {
    pub fn from_name(name: &str) -> CryptoResult<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "PBEWITHHMACSHA512ANDAES_256" => Ok(Self::HmacSha512Aes256),
            "PBEWITHHMACSHA256ANDAES_256" => Ok(Self::HmacSha256Aes256),
            "PBEWITHHMACSHA256ANDAES_128" => Ok(Self::HmacSha256Aes128),
            _ => Err(CryptoError::UnsupportedAlgorithm(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::HmacSha512Aes256 => "PBEWITHHMACSHA512ANDAES_256",
            Self::HmacSha256Aes256 => "PBEWITHHMACSHA256ANDAES_256",
            Self::HmacSha256Aes128 => "PBEWITHHMACSHA256ANDAES_128",
        }
    }

    fn digest(&self) -> KdfDigest {
        match self {
            Self::HmacSha512Aes256 => KdfDigest::Sha512,
            Self::HmacSha256Aes256 | Self::HmacSha256Aes128 => KdfDigest::Sha256,
        }
    }

    fn key_len(&self) -> usize {
        match self {
            Self::HmacSha512Aes256 | Self::HmacSha256Aes256 => 32,
            Self::HmacSha256Aes128 => 16,
        }
    }
}

impl fmt::Display for PbeAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Password-based cipher backend.
pub struct PbeCipher {
    password: SecureString,
    algorithm: PbeAlgorithm,
    iterations: u32,
    salt_generator: SaltGenerator,
    iv_generator: IvGenerator,
}

impl fmt::Debug for PbeCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PbeCipher")
            .field("password", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("iterations", &self.iterations)
            .field("salt_generator", &self.salt_generator)
            .field("iv_generator", &self.iv_generator)
            .finish()
    }
}

impl PbeCipher {
    /// Create a cipher.
    ///
    /// # Errors
    /// Fails when the password is empty, the iteration count is zero or too
    /// large, or a fixed salt is empty or longer than [`MAX_SALT_LEN`].
    pub fn new(
        password: SecureString,
        algorithm: PbeAlgorithm,
        iterations: u32,
        salt_generator: SaltGenerator,
        iv_generator: IvGenerator,
    ) -> CryptoResult<Self> {
        if password.is_empty() {
            return Err(CryptoError::KeyLoad("password must not be empty".to_string()));
        }
        if iterations == 0 || iterations > MAX_ITERATIONS {
            return Err(CommonError::invalid_value(
                "key_obtention_iterations",
                iterations.to_string(),
                format!("must be between 1 and {}", MAX_ITERATIONS),
            )
            .into());
        }
        if let SaltGenerator::Fixed(salt) = &salt_generator {
            if salt.is_empty() || salt.len() > MAX_SALT_LEN {
                return Err(CommonError::validation(
                    "salt_generator",
                    format!("fixed salt must be 1 to {} bytes", MAX_SALT_LEN),
                )
                .into());
            }
        }

        Ok(Self { password, algorithm, iterations, salt_generator, iv_generator })
    }

    /// Default algorithm, 1000 iterations, random salt and IV.
    pub fn with_defaults(password: SecureString) -> CryptoResult<Self> {
        Self::new(
            password,
            PbeAlgorithm::default(),
            DEFAULT_ITERATIONS,
            SaltGenerator::Random,
            IvGenerator::Random,
        )
    }

    pub fn pbe_algorithm(&self) -> PbeAlgorithm {
        self.algorithm
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    fn derive(&self, salt: &[u8], iterations: u32) -> CryptoResult<zeroize::Zeroizing<Vec<u8>>> {
        derive_key(
            self.algorithm.digest(),
            self.password.expose_bytes(),
            salt,
            iterations,
            self.algorithm.key_len(),
        )
    }
}

impl CipherBackend for PbeCipher {
    fn encrypt(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let salt = self.salt_generator.generate(SALT_LEN);
        let iv = self.iv_generator.generate(IV_LEN);
        let key = self.derive(&salt, self.iterations)?;

        let ciphertext = cbc_encrypt(&key, &iv, plaintext)?;
        let params = PbeParams { salt, iterations: self.iterations, iv }.encode();

        let mut frame = Vec::with_capacity(1 + params.len() + ciphertext.len());
        frame.push(params.len() as u8);
        frame.extend_from_slice(&params);
        frame.extend_from_slice(&ciphertext);
        Ok(frame)
    }

    fn decrypt(&self, frame: &[u8]) -> CryptoResult<Vec<u8>> {
        let (&param_len, rest) = frame
            .split_first()
            .ok_or_else(|| CryptoError::MalformedCiphertext("empty input".to_string()))?;
        let param_len = param_len as usize;
        if rest.len() < param_len {
            return Err(CryptoError::MalformedCiphertext(format!(
                "parameter block declares {} bytes but only {} remain",
                param_len,
                rest.len()
            )));
        }

        let (param_bytes, ciphertext) = rest.split_at(param_len);
        if ciphertext.is_empty() || ciphertext.len() % IV_LEN != 0 {
            return Err(CryptoError::MalformedCiphertext(format!(
                "ciphertext length {} is not a positive multiple of the block size",
                ciphertext.len()
            )));
        }

        let params = PbeParams::decode(param_bytes)?;
        debug!(
            algorithm = self.algorithm.name(),
            iterations = params.iterations,
            "Decrypting password-based frame"
        );
        let key = self.derive(&params.salt, params.iterations)?;
        cbc_decrypt(&key, &params.iv, ciphertext)
    }

    fn algorithm(&self) -> &str {
        self.algorithm.name()
    }
}

/// Parameters written in front of each ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PbeParams {
    salt: Vec<u8>,
    iterations: u32,
    iv: Vec<u8>,
}

impl PbeParams {
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + self.salt.len() + 4 + self.iv.len());
        out.push(self.salt.len() as u8);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.iterations.to_be_bytes());
        out.push(self.iv.len() as u8);
        out.extend_from_slice(&self.iv);
        out
    }

    fn decode(bytes: &[u8]) -> CryptoResult<Self> {
        let malformed =
            |what: &str| CryptoError::MalformedCiphertext(format!("parameters: {}", what));

        let (&salt_len, rest) =
            bytes.split_first().ok_or_else(|| malformed("missing salt length"))?;
        let salt_len = salt_len as usize;
        if salt_len == 0 || rest.len() < salt_len + 4 + 1 {
            return Err(malformed("truncated salt"));
        }
        let (salt, rest) = rest.split_at(salt_len);
        let (iter_bytes, rest) = rest.split_at(4);
        let iterations =
            u32::from_be_bytes([iter_bytes[0], iter_bytes[1], iter_bytes[2], iter_bytes[3]]);
        if iterations == 0 || iterations > MAX_ITERATIONS {
            return Err(malformed("iteration count out of range"));
        }

        let (&iv_len, iv) = rest.split_first().ok_or_else(|| malformed("missing IV length"))?;
        if iv_len as usize != IV_LEN || iv.len() != IV_LEN {
            return Err(malformed("IV must be 16 bytes"));
        }

        Ok(Self { salt: salt.to_vec(), iterations, iv: iv.to_vec() })
    }
}

fn cbc_encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let invalid = |e| CryptoError::Encryption(format!("cipher init: {}", e));
    match key.len() {
        16 => Ok(cbc::Encryptor::<aes::Aes128>::new_from_slices(key, iv)
            .map_err(invalid)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
        32 => Ok(cbc::Encryptor::<aes::Aes256>::new_from_slices(key, iv)
            .map_err(invalid)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
        n => Err(CryptoError::InvalidKey(format!("unsupported AES key length {}", n))),
    }
}

fn cbc_decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
    let invalid = |e| CryptoError::Decryption(format!("cipher init: {}", e));
    let unpad = |_| CryptoError::Decryption("invalid padding (wrong password?)".to_string());
    match key.len() {
        16 => cbc::Decryptor::<aes::Aes128>::new_from_slices(key, iv)
            .map_err(invalid)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(unpad),
        32 => cbc::Decryptor::<aes::Aes256>::new_from_slices(key, iv)
            .map_err(invalid)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(unpad),
        n => Err(CryptoError::InvalidKey(format!("unsupported AES key length {}", n))),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for crypto::pbe.
    use super::*;

    fn cipher(password: &str) -> PbeCipher {
        PbeCipher::with_defaults(SecureString::new(password)).unwrap()
    }

    /// Validates `PbeCipher` round trips for every catalogue algorithm.
    ///
    /// Assertions:
    /// - Confirms `decrypt(encrypt(p)) == p`.
    #[test]
    fn test_round_trip_all_algorithms() {
        for algorithm in [
            PbeAlgorithm::HmacSha512Aes256,
            PbeAlgorithm::HmacSha256Aes256,
            PbeAlgorithm::HmacSha256Aes128,
        ] {
            let cipher = PbeCipher::new(
                SecureString::new("masterkey"),
                algorithm,
                DEFAULT_ITERATIONS,
                SaltGenerator::Random,
                IvGenerator::Random,
            )
            .unwrap();
            let frame = cipher.encrypt(b"hunter2").unwrap();
            assert_eq!(cipher.decrypt(&frame).unwrap(), b"hunter2");
        }
    }

    /// Validates the frame layout.
    ///
    /// Assertions:
    /// - Confirms the leading byte is the parameter block length.
    /// - Confirms the iteration count is written big-endian after the salt.
    #[test]
    fn test_frame_layout() {
        let frame = cipher("masterkey").encrypt(b"hunter2").unwrap();
        let param_len = frame[0] as usize;
        assert_eq!(param_len, 1 + SALT_LEN + 4 + 1 + IV_LEN);
        assert_eq!(frame[1] as usize, SALT_LEN);
        let iter_offset = 2 + SALT_LEN;
        assert_eq!(&frame[iter_offset..iter_offset + 4], &DEFAULT_ITERATIONS.to_be_bytes());
        assert_eq!(frame.len() - 1 - param_len, 16);
    }

    /// Validates that random salts make equal plaintexts encrypt differently.
    ///
    /// Assertions:
    /// - Ensures two frames of the same plaintext differ.
    #[test]
    fn test_random_salt_varies_output() {
        let cipher = cipher("masterkey");
        assert_ne!(cipher.encrypt(b"same").unwrap(), cipher.encrypt(b"same").unwrap());
    }

    /// Validates that zero salt and IV generators still decrypt under the
    /// default cipher.
    ///
    /// Assertions:
    /// - Confirms the output is deterministic.
    /// - Confirms a random-generator cipher decrypts it.
    #[test]
    fn test_zero_generators_interoperate() {
        let fixed = PbeCipher::new(
            SecureString::new("masterkey"),
            PbeAlgorithm::default(),
            DEFAULT_ITERATIONS,
            SaltGenerator::Zero,
            IvGenerator::None,
        )
        .unwrap();
        let a = fixed.encrypt(b"hunter2").unwrap();
        assert_eq!(a, fixed.encrypt(b"hunter2").unwrap());
        assert_eq!(cipher("masterkey").decrypt(&a).unwrap(), b"hunter2");
    }

    /// Validates malformed frame rejection.
    ///
    /// Assertions:
    /// - Ensures empty input, an overlong parameter length, a missing
    ///   ciphertext and a truncated ciphertext are all `MalformedCiphertext`.
    #[test]
    fn test_malformed_frames() {
        let cipher = cipher("masterkey");
        let frame = cipher.encrypt(b"hunter2").unwrap();
        let param_len = frame[0] as usize;

        assert!(matches!(cipher.decrypt(&[]), Err(CryptoError::MalformedCiphertext(_))));
        assert!(matches!(cipher.decrypt(&[200, 1, 2]), Err(CryptoError::MalformedCiphertext(_))));
        assert!(matches!(
            cipher.decrypt(&frame[..1 + param_len]),
            Err(CryptoError::MalformedCiphertext(_))
        ));
        assert!(matches!(
            cipher.decrypt(&frame[..frame.len() - 3]),
            Err(CryptoError::MalformedCiphertext(_))
        ));
    }

    /// Validates constructor input checks.
    ///
    /// Assertions:
    /// - Ensures an empty password is a `KeyLoad` error.
    /// - Ensures zero iterations is rejected.
    /// - Ensures unknown algorithm names are `UnsupportedAlgorithm`.
    #[test]
    fn test_constructor_validation() {
        assert!(matches!(
            PbeCipher::with_defaults(SecureString::new("")),
            Err(CryptoError::KeyLoad(_))
        ));
        assert!(PbeCipher::new(
            SecureString::new("pw"),
            PbeAlgorithm::default(),
            0,
            SaltGenerator::Random,
            IvGenerator::Random,
        )
        .is_err());
        assert!(matches!(
            PbeAlgorithm::from_name("PBEWITHMD5ANDDES"),
            Err(CryptoError::UnsupportedAlgorithm(_))
        ));
        assert_eq!(
            PbeAlgorithm::from_name("pbewithhmacsha512andaes_256").unwrap(),
            PbeAlgorithm::HmacSha512Aes256
        );
    }
}
