//! Back end of a JavaScript bundler: the binding model that backs
//! `import * as ns` objects and the finalisers that wrap a rendered chunk
//! in CommonJS, AMD, UMD, IIFE, SystemJS or ES module wiring.

pub mod binding_graph;
pub mod config;
pub mod export_mode;
pub mod finalisers;
pub mod plan;
pub mod render_options;
pub mod reserved_words;
pub mod types;
pub mod variables;

pub use binding_graph::BindingGraph;
pub use config::OutputOptions;
pub use finalisers::{Format, finalise};
pub use plan::RenderPlan;
