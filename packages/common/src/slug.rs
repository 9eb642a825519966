/// Derive a URL-safe slug from arbitrary text.
///
/// Lowercases the input, collapses every run of characters that are not
/// ASCII letters or digits into a single `-`, and trims hyphens from both
/// ends. Applying it to its own output returns the same string.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
