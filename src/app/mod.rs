// thumbview - app/mod.rs
//
// Application layer: worker threads, result dispatch, the concrete
// renderer, and the pipeline facade.
// Dependencies: core, util.

pub mod dispatch;
pub mod pipeline;
pub mod pool;
pub mod renderer;
