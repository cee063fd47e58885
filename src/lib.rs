pub mod app;
pub mod core;
pub mod plugin;
pub mod server;
pub mod update;

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Build timestamp captured by the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}
