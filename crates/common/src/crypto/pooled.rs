//! Round-robin pool of string encryptors.
//!
//! Each slot owns an independently constructed encryptor behind its own
//! lock. Calls pick the next slot in turn, so at most `size` operations run
//! concurrently and none share cipher state. Results are identical to using
//! a single encryptor.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::info;

use super::error::CryptoResult;
use super::string_encryptor::StringEncryptor;
use crate::error::CommonError;

/// Pool of `size` encryptors selected round-robin.
pub struct PooledStringEncryptor {
    slots: Vec<Mutex<Box<dyn StringEncryptor>>>,
    next: AtomicUsize,
}

impl fmt::Debug for PooledStringEncryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledStringEncryptor").field("size", &self.slots.len()).finish()
    }
}

impl PooledStringEncryptor {
    /// Build a pool by calling `factory` once per slot.
    ///
    /// # Errors
    /// Fails on `size == 0` or when any slot fails to build.
    pub fn new<F>(size: usize, factory: F) -> CryptoResult<Self>
    where
        F: Fn() -> CryptoResult<Box<dyn StringEncryptor>>,
    {
        if size == 0 {
            return Err(CommonError::validation("pool_size", "must be at least 1").into());
        }

        let slots =
            (0..size).map(|_| factory().map(Mutex::new)).collect::<CryptoResult<Vec<_>>>()?;
        info!(size, "Encryptor pool created");
        Ok(Self { slots, next: AtomicUsize::new(0) })
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self) -> &Mutex<Box<dyn StringEncryptor>> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        &self.slots[index]
    }
}

impl StringEncryptor for PooledStringEncryptor {
    fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        self.slot().lock().encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &str) -> CryptoResult<String> {
        self.slot().lock().decrypt(ciphertext)
    }
}
