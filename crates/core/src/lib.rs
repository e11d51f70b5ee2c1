//! Domain vocabulary for the UniShowTime ticketing service.
//!
//! Everything here is free of I/O so both the repository layer and the HTTP
//! layer can share the same rules.

pub mod backup;
pub mod error;
pub mod roles;
pub mod system_log;
pub mod ticketing;
pub mod types;
pub mod validation;
