//! Custom resource declarations. Each CRD version lives in a module named after its api group,
//! and is read through `CrdDataSource`.
pub mod common;
pub mod monitoring_coreos_com;
