//! The restoration prompt sent alongside the uploaded photo.
//!
//! Centralised here so changing the default behaviour requires editing
//! exactly one place, and so unit tests can inspect the prompt without a
//! live API call. Callers override it via
//! [`crate::config::RestoreConfig::prompt`]; the constant is used only when
//! no override is provided.

/// Default instructions for restoring an old photograph.
///
/// The final line matters most: without it, image models frequently answer
/// with a paragraph describing what they *would* do instead of doing it,
/// which surfaces as [`crate::error::RestoreError::NoImageInResponse`].
pub const DEFAULT_RESTORE_PROMPT: &str = "\
Restore this old photograph to the best possible quality.

- Repair physical damage: scratches, tears, creases, stains, and missing corners.
- Remove dust, noise, and film grain without smearing fine detail.
- Correct fading and colour casts; recover natural contrast and tonality.
- If the photo is black-and-white, colourise it with realistic, period-appropriate colours.
- Sharpen softly-focused areas, but keep faces natural. Do not alter identity,
  expression, pose, clothing, or the composition of the scene.
- Do not add, remove, or invent objects or people.

Return only the restored image, with no accompanying text.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_nonempty_and_asks_for_an_image() {
        assert!(!DEFAULT_RESTORE_PROMPT.trim().is_empty());
        assert!(DEFAULT_RESTORE_PROMPT.contains("Return only the restored image"));
    }

    #[test]
    fn prompt_forbids_content_changes() {
        assert!(DEFAULT_RESTORE_PROMPT.contains("Do not add, remove, or invent"));
    }
}
