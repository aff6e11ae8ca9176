//! Shortcode generation and validation

use rand::Rng;
use rand::distr::Alphanumeric;

/// Maximum length of a custom shortcode, in characters
pub const MAX_LENGTH: usize = 64;

/// Path segments already taken by the API, a shortcode with this name could never redirect
const RESERVED: [&str; 2] = ["shorturls", "health"];

/// Source of new shortcodes
pub trait Generator: Send + Sync + 'static {
    /// Generate a shortcode candidate, uniqueness is not guaranteed
    fn generate(&self) -> String;
}

/// Random alphanumeric shortcodes: `A-Z`, `a-z` and `0-9`
#[derive(Clone, Copy, Debug)]
pub struct RandomGenerator {
    /// Number of characters per shortcode
    length: usize,
}

impl RandomGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Generator for RandomGenerator {
    fn generate(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}

/// Check a custom shortcode
///
/// The shortcode is used verbatim, it is only rejected when it could not be served from the root
pub fn check_custom(shortcode: &str) -> Result<(), String> {
    if shortcode.chars().count() > MAX_LENGTH {
        return Err(format!(
            "Shortcode can not be longer than {MAX_LENGTH} characters"
        ));
    }

    for ch in shortcode.chars() {
        if ch == '/' {
            return Err(r#"Shortcode can not contain "/""#.to_string());
        }

        if ch == '?' {
            return Err(r#"Shortcode can not contain "?""#.to_string());
        }

        if ch == '#' {
            return Err(r##"Shortcode can not contain "#""##.to_string());
        }

        if ch.is_whitespace() {
            return Err("Shortcode can not contain whitespace".to_string());
        }
    }

    if RESERVED.contains(&shortcode) {
        return Err(format!(r#"Shortcode "{shortcode}" is reserved"#));
    }

    Ok(())
}
