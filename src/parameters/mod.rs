pub mod parameters;

pub use parameters::{Error, FromParameter, ParameterSet, ParameterValue, Section};
