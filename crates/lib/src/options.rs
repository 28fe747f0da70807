//! Build options and their validation at the host boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::DEFAULT_IMAGE_TAG;
use crate::error::{BuildError, Result};
use crate::toolchain::Toolchain;

/// Fully resolved options of one build request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
  /// Remove the cache directory before and after the build.
  pub clear_cache: bool,
  /// Build with the TinyGo toolchain instead of Go.
  pub tinygo: bool,
  /// Build inside a container instead of with a local toolchain.
  pub docker: bool,
  /// Image overriding the toolchain's default image.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
  pub image_tag: String,
  /// Log commands and their output at `info` level.
  pub debug: bool,
}

impl Default for BuildOptions {
  fn default() -> Self {
    Self {
      clear_cache: false,
      tinygo: false,
      docker: false,
      image: None,
      image_tag: DEFAULT_IMAGE_TAG.to_string(),
      debug: false,
    }
  }
}

impl BuildOptions {
  pub fn toolchain(&self) -> Toolchain {
    if self.tinygo { Toolchain::TinyGo } else { Toolchain::Go }
  }

  /// Validate a JSON options object and merge it over `defaults`.
  ///
  /// Non-objects, unknown keys and mistyped values are rejected with
  /// [`BuildError::InvalidOptions`].
  pub fn from_json(value: &Value, defaults: &BuildOptions) -> Result<Self> {
    if !value.is_object() {
      return Err(BuildError::InvalidOptions("options is not an object".to_string()));
    }
    let overrides: OptionOverrides =
      serde_json::from_value(value.clone()).map_err(|e| BuildError::InvalidOptions(e.to_string()))?;
    Ok(overrides.apply(defaults))
  }
}

/// Options as supplied by a request, every key optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OptionOverrides {
  pub clear_cache: Option<bool>,
  pub tinygo: Option<bool>,
  pub docker: Option<bool>,
  pub image: Option<String>,
  pub image_tag: Option<String>,
  pub debug: Option<bool>,
}

impl OptionOverrides {
  /// Merge over `defaults`; values set here win.
  pub fn apply(self, defaults: &BuildOptions) -> BuildOptions {
    BuildOptions {
      clear_cache: self.clear_cache.unwrap_or(defaults.clear_cache),
      tinygo: self.tinygo.unwrap_or(defaults.tinygo),
      docker: self.docker.unwrap_or(defaults.docker),
      image: self.image.or_else(|| defaults.image.clone()),
      image_tag: self.image_tag.unwrap_or_else(|| defaults.image_tag.clone()),
      debug: self.debug.unwrap_or(defaults.debug),
    }
  }
}
