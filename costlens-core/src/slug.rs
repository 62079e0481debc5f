//! Filesystem and URL safe identifiers.

/// Normalizes a display name into a slug.
///
/// The result contains only lowercase ASCII letters, digits and single
/// hyphens, never starts or ends with a hyphen, and is the same for the same
/// input on every call. Non-ASCII characters are dropped; every other run of
/// non-alphanumeric characters becomes one hyphen.
///
/// ```
/// use costlens_core::slugify;
///
/// assert_eq!(slugify("Simple Storage Service"), "simple-storage-service");
/// assert_eq!(slugify("EC2 - Other"), "ec2-other");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_ascii() {
            pending_hyphen = true;
        }
    }

    slug
}
