// thumbview - core/mod.rs
//
// Core layer: data model, work queue, viewport scanning, list model,
// image discovery.
// Must NOT depend on: app or platform. No threads are spawned here.

pub mod discovery;
pub mod list;
pub mod model;
pub mod queue;
pub mod scanner;
pub mod viewport;
