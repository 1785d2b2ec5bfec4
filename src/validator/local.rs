use std::sync::LazyLock;

use regex::Regex;

static LOCAL_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._%+\-]+$").expect("local-part pattern compiles"));

/// Local part charset: letters, digits and `._%+-`, at least one char.
pub(crate) fn is_local_permissive(s: &str) -> bool {
    LOCAL_PART.is_match(s)
}
