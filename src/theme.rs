//! Quote themes

use std::str::FromStr;

/// The quote tone, which also drives the background photo search.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Theme {
    /// General encouragement.
    Inspirational,
    /// Romance.
    Love,
    /// Work and ambition.
    Business,
    /// Something to laugh at.
    Humour,
    /// Get-up-and-go.
    Motivational,
}

impl Theme {
    /// Every selectable theme, in picker order.
    pub const ALL: [Theme; 5] = [
        Theme::Inspirational,
        Theme::Love,
        Theme::Business,
        Theme::Humour,
        Theme::Motivational,
    ];

    /// Capitalized label, as shown in the theme picker and sent to the image
    /// proxy.
    pub fn label(self) -> &'static str {
        match self {
            Theme::Inspirational => "Inspirational",
            Theme::Love => "Love",
            Theme::Business => "Business",
            Theme::Humour => "Humour",
            Theme::Motivational => "Motivational",
        }
    }

    /// Lowercase form used inside the generated prompt.
    pub fn query(self) -> String {
        self.label().to_ascii_lowercase()
    }

    /// The prompt sent to the quote proxy for this theme.
    pub fn prompt(self) -> String {
        format!("Generate a {} quote.", self.query())
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.to_ascii_lowercase();
        Theme::ALL
            .iter()
            .copied()
            .find(|theme| theme.query() == lower)
            .ok_or_else(|| format!("unknown theme: {value}"))
    }
}
