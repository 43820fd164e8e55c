//! Container image reference helpers.

/// Extract the tag segment of an image reference.
///
/// The tag is whatever follows the last `:`. References without a colon, or
/// ending in one, have an empty tag.
///
/// ```
/// use overseer::domain::image_tag;
///
/// assert_eq!(image_tag("registry.example/svc:2.3.1"), "2.3.1");
/// assert_eq!(image_tag("registry.example/svc"), "");
/// ```
#[must_use]
pub fn image_tag(image: &str) -> &str {
    match image.rfind(':') {
        Some(idx) if idx + 1 < image.len() => &image[idx + 1..],
        _ => "",
    }
}
