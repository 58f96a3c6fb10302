/// Canonical slug for a title or a caller-supplied slug.
///
/// Lowercases, turns spaces into underscores and drops apostrophes. Nothing
/// else is touched; uniqueness is the database's job.
pub fn normalize_slug(candidate: &str) -> String {
    candidate
        .to_lowercase()
        .replace(' ', "_")
        .replace('\'', "")
}
