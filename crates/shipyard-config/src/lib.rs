pub mod env_check;
pub mod error;
pub mod flag;
pub mod params;

pub use env_check::check_environment_variables;
pub use error::*;
pub use flag::{Environment, parse_bool_flag};
pub use params::{
    DEFAULT_ENVIRONMENT, DEFAULT_PLATFORM, DEFAULT_REGION, ENVIRONMENT_VAR, RawParameters,
    RunParameters,
};
