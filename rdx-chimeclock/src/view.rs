//! Composes the clock screen as a terminal frame.
//!
//! The screen has the logo at the top and the time below it. Layout values
//! arrive in dp/sp from `DisplayConfig` and are mapped onto character cells.

use crate::layout::DisplayConfig;
use crate::time::ClockSample;
use colored::Colorize;
use std::io::Write;
use std::ops::Range;

/// The `include_str!` macro embeds the logo in the binary at compile time.
pub const LOGO: &str = include_str!("../logo.txt");

/// How many dp one terminal row stands for.
pub const DP_PER_ROW: f32 = 16.0;
/// How many dp one terminal column stands for.
pub const DP_PER_COLUMN: f32 = 8.0;
/// Font sizes from here up are drawn with block glyphs.
pub const LARGE_GLYPH_MIN_FONT: f32 = 100.0;

const GLYPH_ROWS: usize = 5;

/// One rendered screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    lines: Vec<String>,
    logo: Range<usize>,
    clock: Range<usize>,
}

impl Frame {
    /// Lays out `sample` according to `display`.
    pub fn compose(display: &DisplayConfig, sample: &ClockSample) -> Self {
        let indent = " ".repeat(dp_to_columns(display.image_padding.start));
        let mut lines = vec![String::new(); dp_to_rows(display.image_padding.top)];

        // Centre the logo in the image area, cropping it if the area is short.
        let logo_lines: Vec<&str> = LOGO.lines().collect();
        let image_rows = dp_to_rows(display.image_height);
        let shown = logo_lines.len().min(image_rows);
        let above = (image_rows - shown) / 2;
        lines.extend(std::iter::repeat(String::new()).take(above));
        let logo_start = lines.len();
        lines.extend(
            logo_lines[..shown]
                .iter()
                .map(|line| format!("{}{}", indent, line)),
        );
        let logo = logo_start..lines.len();
        lines.extend(std::iter::repeat(String::new()).take(image_rows - shown - above));

        lines.push(String::new());
        let clock_start = lines.len();
        if display.font_size >= LARGE_GLYPH_MIN_FONT {
            lines.extend(
                large_text(&sample.formatted)
                    .into_iter()
                    .map(|row| format!("{}{}", indent, row)),
            );
        } else {
            lines.push(format!("{}{}", indent, sample.formatted));
        }
        let clock = clock_start..lines.len();

        Self { lines, logo, clock }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn logo_lines(&self) -> &[String] {
        &self.lines[self.logo.clone()]
    }

    pub fn clock_lines(&self) -> &[String] {
        &self.lines[self.clock.clone()]
    }

    /// Clears the terminal and draws the frame from the top-left corner.
    pub fn paint(&self, out: &mut impl Write) -> std::io::Result<()> {
        write!(out, "\x1b[H\x1b[2J")?;
        for (row, line) in self.lines.iter().enumerate() {
            if self.logo.contains(&row) {
                writeln!(out, "{}", line.cyan())?;
            } else if self.clock.contains(&row) {
                writeln!(out, "{}", line.bold())?;
            } else {
                writeln!(out, "{}", line)?;
            }
        }
        out.flush()
    }
}

fn dp_to_rows(dp: f32) -> usize {
    (dp / DP_PER_ROW).round().max(0.0) as usize
}

fn dp_to_columns(dp: f32) -> usize {
    (dp / DP_PER_COLUMN).round().max(0.0) as usize
}

/// Renders `text` in block glyphs, one string per glyph row.
/// Characters without a glyph are skipped.
fn large_text(text: &str) -> Vec<String> {
    let glyphs: Vec<[&str; GLYPH_ROWS]> = text.chars().filter_map(glyph).collect();
    (0..GLYPH_ROWS)
        .map(|row| {
            glyphs
                .iter()
                .map(|g| g[row])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn glyph(c: char) -> Option<[&'static str; GLYPH_ROWS]> {
    Some(match c {
        '0' => ["███", "█ █", "█ █", "█ █", "███"],
        '1' => [" █ ", "██ ", " █ ", " █ ", "███"],
        '2' => ["███", "  █", "███", "█  ", "███"],
        '3' => ["███", "  █", "███", "  █", "███"],
        '4' => ["█ █", "█ █", "███", "  █", "  █"],
        '5' => ["███", "█  ", "███", "  █", "███"],
        '6' => ["███", "█  ", "███", "█ █", "███"],
        '7' => ["███", "  █", "  █", "  █", "  █"],
        '8' => ["███", "█ █", "███", "█ █", "███"],
        '9' => ["███", "█ █", "███", "  █", "███"],
        ':' => [" ", "█", " ", "█", " "],
        '.' => [" ", " ", " ", " ", "█"],
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Orientation;
    use crate::config::LayoutConfig;
    use chrono::NaiveDate;

    fn sample() -> ClockSample {
        let at = NaiveDate::from_ymd_opt(2025, 5, 17)
            .unwrap()
            .and_hms_milli_opt(10, 20, 30, 456)
            .unwrap();
        ClockSample::from_datetime(at)
    }

    fn frame(orientation: Orientation) -> Frame {
        let display = DisplayConfig::for_orientation(orientation, &LayoutConfig::default());
        Frame::compose(&display, &sample())
    }

    fn leading_blank_rows(frame: &Frame) -> usize {
        frame.lines().iter().take_while(|l| l.is_empty()).count()
    }

    #[test]
    fn portrait_draws_one_plain_line() {
        let frame = frame(Orientation::Portrait);
        assert_eq!(frame.clock_lines(), ["  10:20:30.456".to_string()]);
        assert_eq!(frame.logo_lines().len(), LOGO.lines().count());
    }

    #[test]
    fn landscape_draws_block_glyphs() {
        let frame = frame(Orientation::Landscape);
        let clock = frame.clock_lines();
        assert_eq!(clock.len(), GLYPH_ROWS);
        let width = clock[0].chars().count();
        assert!(clock.iter().all(|row| row.chars().count() == width));
        // Nine digits, two colons and a dot, spaced by one column.
        assert_eq!(width, 2 + 9 * 3 + 3 + 11);
    }

    #[test]
    fn portrait_sits_lower_than_landscape() {
        assert!(
            leading_blank_rows(&frame(Orientation::Portrait))
                > leading_blank_rows(&frame(Orientation::Landscape))
        );
    }

    #[test]
    fn short_image_area_crops_the_logo() {
        let mut display = DisplayConfig::for_orientation(Orientation::Landscape, &LayoutConfig::default());
        display.image_height = 3.0 * DP_PER_ROW;
        let frame = Frame::compose(&display, &sample());
        assert_eq!(frame.logo_lines().len(), 3);
    }

    #[test]
    fn paint_clears_then_writes_every_line() {
        colored::control::set_override(false);
        let frame = frame(Orientation::Portrait);
        let mut out = Vec::new();
        frame.paint(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\x1b[H\x1b[2J"));
        assert_eq!(text.lines().count(), frame.lines().len());
        assert!(text.contains("10:20:30.456"));
    }

    #[test]
    fn unknown_characters_have_no_glyph() {
        assert!(glyph('x').is_none());
        assert_eq!(large_text("1x1")[0], " █   █ ");
    }
}
