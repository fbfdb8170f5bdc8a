//! Seam for an external profanity filter.

/// Text filter applied to outgoing message bodies and channel names.
pub trait ProfanityFilter: Send + Sync {
    /// Return `text` with offending words masked.
    fn clean(&self, text: &str) -> String;
    /// Whether `text` contains anything `clean` would mask.
    fn check(&self, text: &str) -> bool;
}

/// Filter that leaves every message untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl ProfanityFilter for PassThrough {
    fn clean(&self, text: &str) -> String {
        text.to_string()
    }

    fn check(&self, _text: &str) -> bool {
        false
    }
}
