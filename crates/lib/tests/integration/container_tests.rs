//! Container builds through `Compiler` with a fake runtime.

use std::path::Path;

use gowasm_lib::{BuildError, BuildOptions, Config, HostEnv};

use super::common::{TestEnv, write_script};

/// Fake runtime: logs every call, answers `image inspect` with
/// `inspect_exit`, and on `run` writes an artifact into `cache_dir` the way
/// the bind mount would.
fn fake_runtime(env: &TestEnv, cache_dir: &Path, inspect_exit: i32, pull_exit: i32) -> String {
  let body = format!(
    r#"echo "$*" >> "{log}"
case "$1" in
  image) exit {inspect_exit} ;;
  pull) exit {pull_exit} ;;
  run) printf 'container-wasm' > "{cache}/module.wasm"; echo "building" 1>&2; exit 0 ;;
esac
exit 2"#,
    log = env.log_path().display(),
    cache = cache_dir.display(),
    inspect_exit = inspect_exit,
    pull_exit = pull_exit,
  );
  write_script(&env.temp.path().join("bin"), "docker", &body)
    .to_string_lossy()
    .into_owned()
}

fn container_options() -> BuildOptions {
  BuildOptions {
    docker: true,
    image: Some("myorg/go".to_string()),
    image_tag: "1.22".to_string(),
    ..BuildOptions::default()
  }
}

#[tokio::test]
async fn absent_image_is_pulled_before_run() {
  let env = TestEnv::new();
  let source = env.source();
  let probe = env.compiler(env.config(), HostEnv::default());
  let cache_dir = probe.cache_dir_for(&source);

  let config = Config {
    runtime: fake_runtime(&env, &cache_dir, 1, 0),
    ..env.config()
  };
  let compiler = env.compiler(config, HostEnv::default().with("GOPATH", "/home/me/go:/opt/go"));

  let bytes = compiler.compile(&source, &container_options()).await.unwrap();
  assert_eq!(bytes, b"container-wasm");

  let log = env.log();
  assert_eq!(log.len(), 3, "{:?}", log);
  assert_eq!(log[0], "image inspect myorg/go:1.22 -f {{.RepoTags}}");
  assert_eq!(log[1], "pull myorg/go:1.22");

  let run = &log[2];
  let hash = cache_dir.file_name().unwrap().to_string_lossy().trim_start_matches("gowasm-").to_string();
  assert!(run.starts_with(&format!("run --name gowasm-{} --rm -w /workdir ", hash)), "{}", run);
  assert!(run.contains("-e GOPATH=/gopaths/gopath_000:/gopaths/gopath_001"), "{}", run);
  assert!(run.contains("-v /home/me/go:/gopaths/gopath_000 -v /opt/go:/gopaths/gopath_001"), "{}", run);
  assert!(run.contains(&format!("-v {}:/cache", cache_dir.display())), "{}", run);
  assert!(run.ends_with(" myorg/go:1.22 go build -o /cache/module.wasm main.go"), "{}", run);
}

#[tokio::test]
async fn present_image_is_not_pulled() {
  let env = TestEnv::new();
  let source = env.source();
  let cache_dir = env.compiler(env.config(), HostEnv::default()).cache_dir_for(&source);

  let config = Config {
    runtime: fake_runtime(&env, &cache_dir, 0, 1),
    ..env.config()
  };
  let compiler = env.compiler(config, HostEnv::default());

  let bytes = compiler.compile(&source, &container_options()).await.unwrap();
  assert_eq!(bytes, b"container-wasm");

  let log = env.log();
  assert_eq!(log.len(), 2, "{:?}", log);
  assert_eq!(log[0], "image inspect myorg/go:1.22 -f {{.RepoTags}}");
  assert!(log[1].starts_with("run "), "{}", log[1]);
}

#[tokio::test]
async fn failed_pull_stops_the_build() {
  let env = TestEnv::new();
  let source = env.source();
  let cache_dir = env.compiler(env.config(), HostEnv::default()).cache_dir_for(&source);

  let config = Config {
    runtime: fake_runtime(&env, &cache_dir, 1, 1),
    ..env.config()
  };
  let compiler = env.compiler(config, HostEnv::default());

  let err = compiler.compile(&source, &container_options()).await.unwrap_err();

  assert!(matches!(err, BuildError::ImagePullFailed { ref image, .. } if image == "myorg/go:1.22"));
  assert!(!env.log().iter().any(|line| line.starts_with("run ")));
}

#[tokio::test]
async fn missing_runtime_is_pull_failure() {
  let env = TestEnv::new();
  let config = Config {
    runtime: env.temp.path().join("no-such-runtime").to_string_lossy().into_owned(),
    ..env.config()
  };
  let compiler = env.compiler(config, HostEnv::default());

  let err = compiler.compile(&env.source(), &container_options()).await.unwrap_err();

  assert!(matches!(err, BuildError::ImagePullFailed { .. }));
}
