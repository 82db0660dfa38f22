// thumbview - platform/mod.rs
//
// Platform layer: config directories and files, filesystem export.
// Dependencies: util, core, directories crate.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
