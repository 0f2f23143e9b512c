//! On-demand classification of raw toolpath lines. Nothing is cached on the
//! line itself, every pass classifies again.

use common::config::ToolpathConfig;

pub const COMMENT: char = ';';

/// The category declared by the most recent region marker comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionTag {
    Wall,
    Skin,
    Skirt,
    Brim,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    RegionMarker(RegionTag),
    Comment,
    /// Anything that is not a comment, trimmed.
    Command(&'a str),
}

impl RegionTag {
    /// Parses the text following the region marker. Cura splits walls into
    /// `WALL-OUTER` and `WALL-INNER`, both count as walls.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("WALL") {
            RegionTag::Wall
        } else if value.starts_with("SKIN") {
            RegionTag::Skin
        } else if value.starts_with("SKIRT") {
            RegionTag::Skirt
        } else if value.starts_with("BRIM") {
            RegionTag::Brim
        } else {
            RegionTag::Other(value.to_owned())
        }
    }

    /// Walls and skins track the object's real footprint.
    pub fn is_reference(&self) -> bool {
        matches!(self, RegionTag::Wall | RegionTag::Skin)
    }

    /// Regions laid out for a flat build plate.
    pub fn is_plate_only(&self) -> bool {
        matches!(self, RegionTag::Skirt | RegionTag::Brim)
    }
}

pub fn classify<'a>(line: &'a str, config: &ToolpathConfig) -> LineKind<'a> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }

    if let Some((_, tag)) = trimmed.split_once(config.region_marker.as_str()) {
        return LineKind::RegionMarker(RegionTag::parse(tag));
    }

    if trimmed.starts_with(COMMENT) {
        LineKind::Comment
    } else {
        LineKind::Command(trimmed)
    }
}

/// Splits a document into lines, keeping each line's terminator so the
/// kept lines can be written back byte for byte.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Terminator used by the first line, `\n` if it has none.
pub fn line_ending(lines: &[&str]) -> &'static str {
    match lines.first() {
        Some(line) if line.ends_with("\r\n") => "\r\n",
        _ => "\n",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_lines() {
        let config = ToolpathConfig::default();
        assert_eq!(classify("   \r\n", &config), LineKind::Blank);
        assert_eq!(classify(";LAYER:0\n", &config), LineKind::Comment);
        assert_eq!(
            classify(";TYPE:WALL-OUTER\n", &config),
            LineKind::RegionMarker(RegionTag::Wall)
        );
        assert_eq!(
            classify("  ;TYPE:SKIRT  ", &config),
            LineKind::RegionMarker(RegionTag::Skirt)
        );
        assert_eq!(
            classify(";TYPE:FILL", &config),
            LineKind::RegionMarker(RegionTag::Other("FILL".into()))
        );
        assert_eq!(
            classify("  G1 X1 Y2 E0.1 \n", &config),
            LineKind::Command("G1 X1 Y2 E0.1")
        );
    }

    #[test]
    fn region_tags() {
        assert!(RegionTag::parse("WALL-INNER").is_reference());
        assert!(RegionTag::parse("SKIN").is_reference());
        assert!(RegionTag::parse("BRIM").is_plate_only());
        assert!(!RegionTag::parse("SUPPORT").is_reference());
        assert!(!RegionTag::parse("SUPPORT").is_plate_only());
    }

    #[test]
    fn split_keeps_terminators() {
        assert_eq!(
            split_lines("G28\r\n;c\nG1 X1"),
            vec!["G28\r\n", ";c\n", "G1 X1"]
        );
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn line_ending_follows_first_line() {
        assert_eq!(line_ending(&split_lines(";a\r\n;b\n")), "\r\n");
        assert_eq!(line_ending(&split_lines(";a\n;b\r\n")), "\n");
        assert_eq!(line_ending(&split_lines(";a")), "\n");
        assert_eq!(line_ending(&[]), "\n");
    }
}
