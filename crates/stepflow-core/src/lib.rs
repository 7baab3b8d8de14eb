pub mod config;
pub mod error;
pub mod logging;
pub mod step;

pub use config::{DispatchConfig, ForwardConfig, LoggingConfig, StepflowConfig};
pub use error::{CoreError, CoreResult};
pub use logging::init_logging;
pub use step::{ComponentRef, StepDescriptor, StepName, UnknownStep};
