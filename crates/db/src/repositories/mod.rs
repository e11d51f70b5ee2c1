//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods that must run inside
//! a caller-owned transaction take `&mut Transaction` instead.

pub mod backup_repo;
pub mod department_repo;
pub mod event_repo;
pub mod session_repo;
pub mod system_log_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use backup_repo::BackupRepo;
pub use department_repo::DepartmentRepo;
pub use event_repo::EventRepo;
pub use session_repo::SessionRepo;
pub use system_log_repo::SystemLogRepo;
pub use ticket_repo::TicketRepo;
pub use user_repo::UserRepo;

/// Build an `ILIKE … ESCAPE '!'` pattern matching `term` as a literal substring.
#[must_use]
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '!' | '%' | '_') {
            out.push('!');
        }
        out.push(c);
    }
    out.push('%');
    out
}
