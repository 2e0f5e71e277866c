//! Turning the raw multi-line roster into wheel segments.

use crate::config::Color;

/// One pie slice of the wheel, derived from a non-blank input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub id: String,
    pub text: String,
    pub color: Color,
}

/// Split `raw` into trimmed, non-blank lines and color them by position.
///
/// Colors cycle through `palette`; an empty palette falls back to white.
pub fn derive_segments(raw: &str, palette: &[Color]) -> Vec<Segment> {
    raw.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, text)| Segment {
            id: format!("{text}-{i}"),
            text: text.to_string(),
            color: palette_color(palette, i),
        })
        .collect()
}

pub fn palette_color(palette: &[Color], index: usize) -> Color {
    if palette.is_empty() {
        return crate::config::WHITE;
    }
    palette[index % palette.len()]
}

/// Drop every line whose trimmed text matches one of `texts`.
///
/// Blank lines are dropped too, and duplicates of a matching name all go.
pub fn remove_entries<S: AsRef<str>>(raw: &str, texts: &[S]) -> String {
    raw.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty() && !texts.iter().any(|t| t.as_ref() == *line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shorten a label for the wheel face.
pub fn display_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut label: String = text.chars().take(keep).collect();
    label.push_str("...");
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_palette;

    #[test]
    fn blank_lines_never_become_segments() {
        let segments = derive_segments("Alice\nBob\n\nCarol", &default_palette());
        let texts: Vec<_> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["Alice", "Bob", "Carol"]);

        assert!(derive_segments("", &default_palette()).is_empty());
        assert!(derive_segments("  \n\t\n \r\n", &default_palette()).is_empty());
    }

    #[test]
    fn lines_are_trimmed_including_crlf() {
        let segments = derive_segments("  Alice \r\nBob\r\n", &default_palette());
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Alice");
        assert_eq!(segments[1].text, "Bob");
    }

    #[test]
    fn colors_cycle_with_position() {
        let palette = [Color::new(1, 0, 0), Color::new(0, 1, 0), Color::new(0, 0, 1)];
        let raw = (0..8).map(|i| format!("n{i}")).collect::<Vec<_>>().join("\n");
        let segments = derive_segments(&raw, &palette);
        for (i, segment) in segments.iter().enumerate() {
            assert_eq!(segment.color, palette[i % palette.len()]);
        }
    }

    #[test]
    fn ids_combine_text_and_position() {
        let segments = derive_segments("Sam\nSam", &default_palette());
        assert_eq!(segments[0].id, "Sam-0");
        assert_eq!(segments[1].id, "Sam-1");
    }

    #[test]
    fn remove_drops_matching_and_blank_lines() {
        assert_eq!(remove_entries("Alice\nBob\n\nCarol", &["Bob"]), "Alice\nCarol");
    }

    #[test]
    fn remove_drops_every_duplicate() {
        let out = remove_entries("Sam\nAlex\n  Sam  \nJo", &["Sam"]);
        assert_eq!(out, "Alex\nJo");
    }

    #[test]
    fn remove_keeps_near_matches() {
        let out = remove_entries("Sam\nSamuel\nsam", &["Sam"]);
        assert_eq!(out, "Samuel\nsam");
    }

    #[test]
    fn long_labels_are_truncated() {
        assert_eq!(display_label("Short", 15), "Short");
        assert_eq!(display_label("ExactlyFifteen!", 15), "ExactlyFifteen!");
        assert_eq!(display_label("Bartholomew Jones", 15), "Bartholomew ...");
        assert_eq!(display_label("ÉléonoreÉléonore", 15), "ÉléonoreÉléo...");
    }
}
