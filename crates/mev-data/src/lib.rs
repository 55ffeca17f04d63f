//! mev-data crate
//!
//! Typed access to an observatory deployment: raw MEV datapoints, the
//! validator directory, and the schema validation between the two.

pub mod config;
pub mod error;
pub mod observatory;
pub mod types;

pub use config::ObservatoryConfig;
pub use error::{ObservatoryError, SchemaError};
pub use observatory::{MevSampleSource, ObservatoryClient, ValidatorSource};
pub use types::{HeightRange, MevSample, ValidatorInfo};
