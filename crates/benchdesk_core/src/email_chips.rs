use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub fn is_valid_email(candidate: &str) -> bool {
    EMAIL.is_match(candidate)
}

/// Ordered list of validated email addresses entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmailChips {
    chips: Vec<String>,
}

impl EmailChips {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles the text of the input box when a separator key was pressed.
    /// Returns `true` if a chip was added (the caller then clears the input).
    pub fn key_entered(&mut self, raw: &str) -> bool {
        let candidate = raw.trim();
        let candidate = candidate.strip_suffix(',').unwrap_or(candidate);
        if candidate.is_empty() || !is_valid_email(candidate) {
            return false;
        }
        self.chips.push(candidate.to_string());
        true
    }

    /// Splits pasted text on whitespace and commas, keeping valid addresses.
    pub fn paste(&mut self, raw: &str) -> usize {
        let before = self.chips.len();
        self.chips.extend(
            raw.split(|c: char| c.is_whitespace() || c == ',')
                .map(str::trim)
                .filter(|candidate| !candidate.is_empty() && is_valid_email(candidate))
                .map(ToOwned::to_owned),
        );
        self.chips.len() - before
    }

    /// Seeds chips from the JSON array the server renders into the page.
    pub fn seed_from_json(&mut self, raw: &str) -> Result<usize, serde_json::Error> {
        let emails: Vec<String> = serde_json::from_str(raw)?;
        let count = emails.len();
        self.chips.extend(emails);
        Ok(count)
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.chips.len()).then(|| self.chips.remove(index))
    }

    pub fn emails(&self) -> &[String] {
        &self.chips
    }

    /// Space-separated form value.
    pub fn joined(&self) -> String {
        self.chips.join(" ")
    }

    pub fn clear(&mut self) {
        self.chips.clear();
    }
}
