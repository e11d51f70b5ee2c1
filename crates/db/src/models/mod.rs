//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod backup;
pub mod department;
pub mod event;
pub mod session;
pub mod system_log;
pub mod ticket;
pub mod user;
