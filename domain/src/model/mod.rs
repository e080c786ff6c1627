//! Model descriptors and the model catalog.

pub mod catalog;
pub mod descriptor;

pub use catalog::ModelCatalog;
pub use descriptor::{CostClass, ModelDescriptor, ProviderId, TemperatureConstraint};
