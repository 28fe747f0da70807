//! End-to-end compile tests against fake toolchains and a fake container
//! runtime. The fakes are shell scripts, so these run on unix only.

#![cfg(unix)]

mod common;
mod container_tests;
mod local_tests;
