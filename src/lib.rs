// thumbview - lib.rs
//
// Library entry point, exposing the pipeline and its collaborators for
// embedding in a viewer and for integration testing.
//
// The command-line driver lives in `main.rs` and is not part of the
// library surface.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
