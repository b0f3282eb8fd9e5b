//! Rendering layer: C headers for the broadcast simulator and runtime.

pub mod c_header;

pub use c_header::{MODEL_DEFS_FILE, MODEL_FILE, render_model, render_model_defs};
