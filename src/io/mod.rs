//! Model I/O - Loading and saving trained parameters
//!
//! A saved model records its architecture (`ModelSpec`) next to every named
//! parameter, so loading rebuilds the model and restores its weights.

mod format;
mod load;
mod model;
mod save;

pub use format::ModelFormat;
pub use load::load_model;
pub use model::{ModelState, ParameterInfo};
pub use save::save_model;
