use crate::errors::ConfigurationError;

/// Longest tag Mandrill accepts, in characters.
pub const MAX_TAG_LENGTH: usize = 50;

/// Keep the tags Mandrill will accept, in their original order.
///
/// A tag starting with `_` is reserved by Mandrill and fails the whole list.
/// A tag longer than [`MAX_TAG_LENGTH`] is dropped without an error.
pub fn normalize_tags<I, S>(tags: I) -> Result<Vec<String>, ConfigurationError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut accepted = Vec::new();
    for tag in tags {
        let tag = tag.into();
        if tag.starts_with('_') {
            return Err(ConfigurationError::ReservedTag(tag));
        }
        if tag.chars().count() <= MAX_TAG_LENGTH {
            accepted.push(tag);
        } else {
            tracing::debug!(%tag, "Dropping a tag longer than {} characters", MAX_TAG_LENGTH);
        }
    }
    Ok(accepted)
}
