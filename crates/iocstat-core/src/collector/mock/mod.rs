//! In-memory filesystem and prebuilt `/proc` fixtures.
//!
//! Lets the engines be exercised on any host, including ones without NFS
//! mounts or without `/proc` at all.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
