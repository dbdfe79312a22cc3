//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod comment_repo;
pub mod review_repo;
pub mod title_repo;
pub mod user_repo;
pub mod vocabulary_repo;

pub use comment_repo::CommentRepo;
pub use review_repo::ReviewRepo;
pub use title_repo::TitleRepo;
pub use user_repo::UserRepo;
pub use vocabulary_repo::VocabularyRepo;

/// Build an `ILIKE` pattern matching `needle` anywhere, with LIKE
/// metacharacters in the input escaped.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}
