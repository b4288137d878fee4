//! Colour palette for the leaderboard screens.
//!
//! Muted base colours with accents reserved for the podium, accuracy bands
//! and status banners.

use ratatui::style::{Color, Modifier, Style};

use crate::leaderboard::Tier;

pub mod colors {
    use ratatui::style::Color;

    // ═══════════════════════════════════════════════════════════════════════════
    // BASE COLORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Deep background - primary canvas color
    pub const BG_DEEP: Color = Color::Rgb(26, 27, 38); // #1a1b26

    /// Elevated surface - cards, popups
    pub const BG_SURFACE: Color = Color::Rgb(36, 40, 59); // #24283b

    /// Selected row
    pub const BG_HIGHLIGHT: Color = Color::Rgb(41, 46, 66); // #292e42

    pub const BORDER: Color = Color::Rgb(59, 66, 97); // #3b4261
    pub const BORDER_FOCUS: Color = Color::Rgb(125, 145, 200); // #7d91c8

    // ═══════════════════════════════════════════════════════════════════════════
    // TEXT COLORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub const TEXT_PRIMARY: Color = Color::Rgb(192, 202, 245); // #c0caf5
    pub const TEXT_SECONDARY: Color = Color::Rgb(169, 177, 214); // #a9b1d6
    /// Hints, placeholders, timestamps
    pub const TEXT_MUTED: Color = Color::Rgb(105, 114, 158); // #696e9e

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCENTS
    // ═══════════════════════════════════════════════════════════════════════════

    pub const ACCENT_PRIMARY: Color = Color::Rgb(122, 162, 247); // #7aa2f7
    pub const ACCENT_SECONDARY: Color = Color::Rgb(187, 154, 247); // #bb9af7

    // ═══════════════════════════════════════════════════════════════════════════
    // PODIUM
    // ═══════════════════════════════════════════════════════════════════════════

    pub const TIER_GOLD: Color = Color::Rgb(234, 179, 8); // #eab308
    pub const TIER_SILVER: Color = Color::Rgb(156, 163, 175); // #9ca3af
    pub const TIER_BRONZE: Color = Color::Rgb(217, 119, 6); // #d97706

    // ═══════════════════════════════════════════════════════════════════════════
    // STATUS COLORS - also used for accuracy bands
    // ═══════════════════════════════════════════════════════════════════════════

    pub const STATUS_SUCCESS: Color = Color::Rgb(115, 218, 202); // #73daca
    pub const STATUS_WARNING: Color = Color::Rgb(224, 175, 104); // #e0af68
    pub const STATUS_ERROR: Color = Color::Rgb(247, 118, 142); // #f7768e
    pub const STATUS_INFO: Color = Color::Rgb(125, 207, 255); // #7dcfff
}

/// Accuracy bucket used for colouring values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccuracyBand {
    Good,
    Fair,
    Poor,
}

impl AccuracyBand {
    /// `> 0.8` good, `> 0.5` fair, anything else poor.
    pub fn of(accuracy: f64) -> Self {
        if accuracy > 0.8 {
            Self::Good
        } else if accuracy > 0.5 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

#[derive(Clone, Copy)]
pub struct ThemePalette {
    pub accent: Color,
    pub accent_alt: Color,
    pub bg: Color,
    pub fg: Color,
    pub surface: Color,
    pub hint: Color,
    pub border: Color,
    pub good: Color,
    pub fair: Color,
    pub poor: Color,
    pub stripe_even: Color,
    pub stripe_odd: Color,
}

impl ThemePalette {
    pub fn light() -> Self {
        Self {
            accent: Color::Rgb(47, 107, 231),
            accent_alt: Color::Rgb(124, 93, 198),
            bg: Color::Rgb(250, 250, 252),
            fg: Color::Rgb(36, 41, 46),
            surface: Color::Rgb(240, 241, 245),
            hint: Color::Rgb(125, 134, 144),
            border: Color::Rgb(216, 222, 228),
            good: Color::Rgb(45, 138, 72),
            fair: Color::Rgb(177, 133, 41),
            poor: Color::Rgb(207, 62, 74),
            stripe_even: Color::Rgb(250, 250, 252),
            stripe_odd: Color::Rgb(240, 241, 245),
        }
    }

    pub fn dark() -> Self {
        Self {
            accent: colors::ACCENT_PRIMARY,
            accent_alt: colors::ACCENT_SECONDARY,
            bg: colors::BG_DEEP,
            fg: colors::TEXT_PRIMARY,
            surface: colors::BG_SURFACE,
            hint: colors::TEXT_MUTED,
            border: colors::BORDER,
            good: colors::STATUS_SUCCESS,
            fair: colors::STATUS_WARNING,
            poor: colors::STATUS_ERROR,
            stripe_even: colors::BG_DEEP,
            stripe_odd: Color::Rgb(30, 32, 48),
        }
    }

    pub fn title(self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn hint_style(self) -> Style {
        Style::default().fg(self.hint)
    }

    pub fn border_style(self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_focus_style(self) -> Style {
        Style::default().fg(colors::BORDER_FOCUS)
    }

    pub fn selected_style(self) -> Style {
        Style::default()
            .bg(colors::BG_HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn stripe(self, idx: usize) -> Style {
        let bg = if idx % 2 == 0 {
            self.stripe_even
        } else {
            self.stripe_odd
        };
        Style::default().bg(bg).fg(self.fg)
    }

    pub fn band_color(self, band: AccuracyBand) -> Color {
        match band {
            AccuracyBand::Good => self.good,
            AccuracyBand::Fair => self.fair,
            AccuracyBand::Poor => self.poor,
        }
    }

    /// Foreground style for an accuracy value in `[0, 1]`.
    pub fn accuracy_style(self, accuracy: f64) -> Style {
        Style::default().fg(self.band_color(AccuracyBand::of(accuracy)))
    }

    /// Rank cell colour; unranked podium slots use the body colour.
    pub fn tier_style(self, tier: Option<Tier>) -> Style {
        match tier {
            Some(Tier::Gold) => Style::default()
                .fg(colors::TIER_GOLD)
                .add_modifier(Modifier::BOLD),
            Some(Tier::Silver) => Style::default()
                .fg(colors::TIER_SILVER)
                .add_modifier(Modifier::BOLD),
            Some(Tier::Bronze) => Style::default()
                .fg(colors::TIER_BRONZE)
                .add_modifier(Modifier::BOLD),
            None => Style::default().fg(self.fg),
        }
    }

    pub fn error_banner(self) -> Style {
        Style::default()
            .fg(colors::STATUS_ERROR)
            .add_modifier(Modifier::BOLD)
    }

    pub fn info_style(self) -> Style {
        Style::default().fg(colors::STATUS_INFO)
    }
}
