//! Request identity hashing.
//!
//! A build request is identified by the MD5 digest of its source path. The
//! digest only names directories and containers, so collision resistance
//! beyond "distinct paths get distinct names" is not required.

use std::path::Path;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// Lowercase hex MD5 digest identifying a build request.
///
/// # Format
///
/// 32 hexadecimal characters, e.g. `"d41d8cd98f00b204e9800998ecf8427e"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestHash(pub String);

impl RequestHash {
  /// Hash the source path as given, without canonicalizing it.
  pub fn from_path(path: &Path) -> Self {
    Self::from_seed(&path.to_string_lossy())
  }

  pub fn from_seed(seed: &str) -> Self {
    let mut hasher = Md5::new();
    hasher.update(seed.as_bytes());
    RequestHash(hex::encode(hasher.finalize()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for RequestHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}
