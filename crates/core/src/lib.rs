pub mod allocation;
pub mod allocation_formatter;
pub mod config;
pub mod config_loader;
pub mod error;

pub use allocation::{
    allocate, capped_weights, validate, AllocationRequest, AllocationResult, AssetInput,
    CappedWeights,
};
pub use allocation_formatter::AllocationFormatter;
pub use config::{AllocationConfig, AppConfig, ServerConfig};
pub use config_loader::ConfigLoader;
pub use error::{AllocationError, ErrorKind};
