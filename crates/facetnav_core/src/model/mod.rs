//! Domain model for the category/entity/tag graph.
//!
//! # Responsibility
//! - Define the value types exchanged between repositories and the
//!   navigation engine.
//! - Keep name comparison rules in one place.
//!
//! # Invariants
//! - Every persisted object carries a stable `Uuid` identity.
//! - Instances are detached copies: mutating one has no effect until it is
//!   re-submitted through a repository `upsert`.

pub mod category;
pub mod entity;
pub mod relationship;
pub mod tag;
pub mod value;

/// Case-insensitive name equality used for every namespace lookup.
///
/// Matches the `COLLATE NOCASE` rule of the SQLite store, which folds ASCII
/// letters only.
pub fn names_equal(left: &str, right: &str) -> bool {
    left.eq_ignore_ascii_case(right)
}

#[cfg(test)]
mod tests {
    use super::names_equal;

    #[test]
    fn names_equal_ignores_ascii_case_only() {
        assert!(names_equal("Entities", "entities"));
        assert!(names_equal("T1.Text", "t1.text"));
        assert!(!names_equal("e1", "e2"));
        assert!(!names_equal("Ä", "ä"));
    }
}
