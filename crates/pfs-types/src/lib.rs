pub mod errors;
pub mod estimator;
pub mod features;
pub mod hyperparams;
pub mod settings;

pub use errors::*;
pub use estimator::*;
pub use features::*;
pub use hyperparams::*;
pub use settings::*;
