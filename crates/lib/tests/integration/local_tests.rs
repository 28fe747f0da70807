//! Local toolchain builds through `Compiler`.

use std::time::Duration;

use gowasm_lib::{BuildError, BuildOptions, HostEnv};

use super::common::TestEnv;

#[tokio::test]
async fn default_options_build_locally_and_keep_cache() {
  let env = TestEnv::new();
  let root = env.go_root(r#"printf 'wasm-bytes' > "$out""#);
  let compiler = env.compiler(env.config(), HostEnv::default().with("GOROOT", root.to_string_lossy()));
  let source = env.source();

  let bytes = compiler.compile(&source, &BuildOptions::default()).await.unwrap();

  assert_eq!(bytes, b"wasm-bytes");
  let cache_dir = compiler.cache_dir_for(&source);
  assert!(cache_dir.starts_with(env.cache_root()));
  assert!(cache_dir.join("module.wasm").exists());
}

#[tokio::test]
async fn clear_cache_builds_from_scratch_and_removes_dir() {
  let env = TestEnv::new();
  let root = env.go_root(
    r#"if [ -e "$GOCACHE/stale" ]; then state=stale; else state=fresh; fi
if [ -d "$GOCACHE" ]; then dir=present; else dir=missing; fi
printf '%s,%s' "$state" "$dir" > "$out""#,
  );
  let compiler = env.compiler(env.config(), HostEnv::default().with("GOROOT", root.to_string_lossy()));
  let source = env.source();

  let cache_dir = compiler.cache_dir_for(&source);
  std::fs::create_dir_all(&cache_dir).unwrap();
  std::fs::write(cache_dir.join("stale"), "old").unwrap();

  let options = BuildOptions {
    clear_cache: true,
    ..BuildOptions::default()
  };
  let bytes = compiler.compile(&source, &options).await.unwrap();

  assert_eq!(bytes, b"fresh,present");
  assert!(!cache_dir.exists());
}

#[tokio::test]
async fn repeated_builds_reuse_cache_dir() {
  let env = TestEnv::new();
  let root = env.go_root(r#"echo run >> "$GOCACHE/runs"; printf 'ok' > "$out""#);
  let compiler = env.compiler(env.config(), HostEnv::default().with("GOROOT", root.to_string_lossy()));
  let source = env.source();

  compiler.compile(&source, &BuildOptions::default()).await.unwrap();
  compiler.compile(&source, &BuildOptions::default()).await.unwrap();

  let runs = std::fs::read_to_string(compiler.cache_dir_for(&source).join("runs")).unwrap();
  assert_eq!(runs.lines().count(), 2);
}

#[tokio::test]
async fn concurrent_builds_of_same_file_do_not_overlap() {
  let env = TestEnv::new();
  let log = env.log_path();
  let root = env.go_root(&format!(
    r#"echo start >> "{log}"
/bin/sleep 0.2
echo end >> "{log}"
printf 'ok' > "$out""#,
    log = log.display()
  ));
  let compiler = env.compiler(env.config(), HostEnv::default().with("GOROOT", root.to_string_lossy()));
  let source = env.source();
  let options = BuildOptions {
    clear_cache: true,
    ..BuildOptions::default()
  };

  let (a, b) = tokio::join!(compiler.compile(&source, &options), compiler.compile(&source, &options));

  assert_eq!(a.unwrap(), b"ok");
  assert_eq!(b.unwrap(), b"ok");
  assert_eq!(env.log(), vec!["start", "end", "start", "end"]);
}

#[tokio::test]
async fn abandoned_clear_cache_build_removes_dir() {
  let env = TestEnv::new();
  let root = env.go_root(r#"/bin/sleep 1; printf 'late' > "$out""#);
  let compiler = env.compiler(env.config(), HostEnv::default().with("GOROOT", root.to_string_lossy()));
  let source = env.source();
  let options = BuildOptions {
    clear_cache: true,
    ..BuildOptions::default()
  };

  let outcome = tokio::time::timeout(Duration::from_millis(200), compiler.compile(&source, &options)).await;
  assert!(outcome.is_err(), "build should still be running");

  // Give the orphaned toolchain time to try writing its output.
  tokio::time::sleep(Duration::from_millis(1500)).await;
  assert!(!compiler.cache_dir_for(&source).exists());
}

#[tokio::test]
async fn missing_toolchain_is_reported_before_any_build() {
  let env = TestEnv::new();
  let host = HostEnv::default().with("PATH", env.temp.path().join("empty").to_string_lossy());
  let compiler = env.compiler(env.config(), host);

  let err = compiler
    .compile(&env.source(), &BuildOptions::default())
    .await
    .unwrap_err();

  assert!(matches!(err, BuildError::ToolchainNotFound { ref var, .. } if var == "GOROOT"));
}
