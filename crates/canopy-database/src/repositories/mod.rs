//! PostgreSQL implementations of the store contracts.

pub mod application;
pub mod cluster;
pub mod folder;
pub mod member;

pub use application::ApplicationRepository;
pub use cluster::ClusterRepository;
pub use folder::{FolderRepository, PgFolderTransaction};
pub use member::MemberRepository;

/// Build an `ILIKE ... ESCAPE '\'` pattern matching `filter` as a literal
/// substring.
pub(crate) fn like_pattern(filter: &str) -> String {
    let mut pattern = String::with_capacity(filter.len() + 2);
    pattern.push('%');
    for c in filter.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
