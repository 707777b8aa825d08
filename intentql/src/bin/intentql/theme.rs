use colored::Color;
use comfy_table::Color as TableColor;

use intentql::Category;
use intentql::filters::FilterOutcome;

/// Kind of status line printed by the output manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
    Warning,
    Info,
    Detail,
}

impl Tone {
    pub fn color(self) -> Color {
        match self {
            Tone::Success => Color::Green,
            Tone::Error => Color::Red,
            Tone::Warning => Color::Yellow,
            Tone::Info => Color::Blue,
            Tone::Detail => Color::BrightBlack,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Tone::Success => "✓",
            Tone::Error => "✗",
            Tone::Warning => "⚠",
            Tone::Info => "ℹ",
            Tone::Detail => "→",
        }
    }
}

pub const KEY_COLOR: Color = Color::BrightCyan;
pub const VALUE_COLOR: Color = Color::White;

/// Row color for a wire parameter, so categories stand apart in long tables.
pub fn category_color(category: Category) -> TableColor {
    match category {
        Category::Filters => TableColor::Cyan,
        Category::Populate => TableColor::Magenta,
        Category::Sort => TableColor::Yellow,
        Category::Pagination => TableColor::Green,
        Category::Fields => TableColor::Blue,
        Category::Locale | Category::PublicationState | Category::Search => TableColor::White,
    }
}

pub fn outcome_tone(outcome: FilterOutcome) -> Tone {
    match outcome {
        FilterOutcome::Unchanged => Tone::Detail,
        FilterOutcome::Normalized => Tone::Success,
        FilterOutcome::MatchesNothing => Tone::Warning,
    }
}

pub fn outcome_label(outcome: FilterOutcome) -> &'static str {
    match outcome {
        FilterOutcome::Unchanged => "unchanged",
        FilterOutcome::Normalized => "normalized",
        FilterOutcome::MatchesNothing => "matches nothing",
    }
}
