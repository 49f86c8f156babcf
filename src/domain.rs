pub mod audit;
pub mod donation;
pub mod error;
pub mod field;
pub mod id;
pub mod image;
pub mod intake;
pub mod money;
pub mod policy;
pub mod ports;
pub mod provider;
pub mod submission;
