//! Secret handling primitives
//!
//! - [`SecureString`]: zeroizing, redacted container for passwords and inline
//!   key strings
//! - [`key_material`]: ordered key acquisition (explicit, inline, resource)

#[cfg(feature = "runtime")]
pub mod key_material;
pub mod secure_string;

#[cfg(feature = "runtime")]
pub use key_material::{InlineEncoding, KeyMaterial, KeyMaterialProvider, KeySourceKind};
pub use secure_string::SecureString;
