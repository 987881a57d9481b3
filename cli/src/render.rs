//! Plain-text rendering of boards, notices, and saved-board listings.

use std::fmt::Write as _;

use moodboards::{Color, Moodboard, SavedMoodboard};

use crate::state::view::{Notice, NoticeLevel};

/// Sample line shown for every font in the typography section.
pub const TYPE_SAMPLE: &str = "The quick brown fox jumps over the lazy dog";

const SWATCH_WIDTH: usize = 8;

/// Render a board: title, palette grid, typography, images.
///
/// With `ansi` set each swatch is painted in its own color using 24-bit
/// escape codes; otherwise swatches are drawn as plain blocks.
#[must_use]
pub fn moodboard(board: &Moodboard, ansi: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", board.title);
    let _ = writeln!(out, "{}", "=".repeat(board.title.chars().count()));
    if !board.keywords.is_empty() {
        let _ = writeln!(out, "keywords: {}", board.keywords.join(", "));
    }
    if let Some(id) = board.id {
        let _ = writeln!(out, "id: {id}");
    }

    let _ = writeln!(out, "\nColor Palette");
    let row: Vec<String> = board.colors.iter().map(|c| swatch(c, ansi)).collect();
    let _ = writeln!(out, "{}", row.join(" "));
    let hexes: Vec<String> = board.colors.iter().map(|c| format!("{:<SWATCH_WIDTH$}", c.hex)).collect();
    let _ = writeln!(out, "{}", hexes.join(" ").trim_end());
    let names: Vec<String> = board
        .colors
        .iter()
        .map(|c| format!("{:<SWATCH_WIDTH$}", clip(&c.name, SWATCH_WIDTH)))
        .collect();
    let _ = writeln!(out, "{}", names.join(" ").trim_end());

    let _ = writeln!(out, "\nTypography");
    for font in &board.fonts {
        let _ = writeln!(out, "  {} ({}, weight {})", font.name, font.family, font.weight);
        let _ = writeln!(out, "    {TYPE_SAMPLE}");
    }

    let _ = writeln!(out, "\nImages");
    for (i, image) in board.images.iter().enumerate() {
        let _ = writeln!(out, "  {}. {} <{}>", i + 1, image.alt, image.url);
    }
    out
}

fn swatch(color: &Color, ansi: bool) -> String {
    let block = "█".repeat(SWATCH_WIDTH);
    match (ansi, rgb(&color.hex)) {
        (true, Some((r, g, b))) => format!("\x1b[38;2;{r};{g};{b}m{block}\x1b[0m"),
        _ => block,
    }
}

fn rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn clip(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

#[must_use]
pub fn notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {}: {}", notice.title, notice.description)
}

/// One line per saved board.
#[must_use]
pub fn saved_list(boards: &[SavedMoodboard]) -> String {
    if boards.is_empty() {
        return "no saved moodboards\n".to_owned();
    }
    let mut out = String::new();
    for saved in boards {
        let visibility = if saved.is_public { "public" } else { "private" };
        let _ = writeln!(out, "{}  {}  {:<7}  {}", saved.id, saved.created_at, visibility, saved.moodboard.title);
    }
    out
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
