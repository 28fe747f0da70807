//! Fixed names shared across the crate.

pub const APP_NAME: &str = "gowasm";

/// Prefix of per-request cache directories under the cache root.
pub const CACHE_DIR_PREFIX: &str = "gowasm";

/// File the toolchain writes inside the cache directory.
pub const OUTPUT_FILE_NAME: &str = "module.wasm";

pub const DEFAULT_IMAGE_GO: &str = "golang";
pub const DEFAULT_IMAGE_TINYGO: &str = "tinygo/tinygo";
pub const DEFAULT_IMAGE_TAG: &str = "latest";
pub const DEFAULT_CONTAINER_RUNTIME: &str = "docker";
pub const CONTAINER_NAME_PREFIX: &str = "gowasm-";

/// Working directory inside the container; the source directory is mounted here.
pub const CONTAINER_WORKDIR: &str = "/workdir";

/// Cache directory inside the container.
pub const CONTAINER_CACHE_DIR: &str = "/cache";

/// Parent of the per-entry module path mounts inside the container.
pub const CONTAINER_GOPATH_ROOT: &str = "/gopaths";

#[cfg(unix)]
pub const PATH_LIST_SEPARATOR: char = ':';

#[cfg(not(unix))]
pub const PATH_LIST_SEPARATOR: char = ';';
