pub mod config;
pub mod deserializers;
pub mod error;
pub mod http;
pub mod intent;
pub mod kpi;
pub mod rca;

pub use error::{KpiRcaError, Result};
