//! adb integration for adbscope
//!
//! This crate provides the process capability the ingestion pipeline runs
//! against: spawning `adb logcat`, exposing its output channels as line
//! streams, and terminating it.

mod args;
mod resolve;
mod source;

pub use args::{DEFAULT_TAG, LogcatArgs};
pub use resolve::resolve_adb;
pub use source::{AdbSource, LineStream, LogSource, ProcessHandle, SpawnedSource, line_stream};
