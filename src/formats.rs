//! The format router: which inputs exist, and what each may become.
//!
//! Routing is deliberately dumb — two enums and three lookup tables. The
//! input extension picks a [`Category`], the category constrains the
//! [`Target`], and everything else (codecs, encoders, page geometry) lives
//! with the handler for that category. Keeping the tables here, in one
//! place, means the CLI help, the validation errors, and the dispatch in
//! [`crate::convert`] can never drift apart.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four conversion categories, detected from the input file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// png, jpg, jpeg, webp
    Image,
    /// pdf, docx, txt
    Document,
    /// mp3, wav, ogg
    Audio,
    /// mp4, avi, webm
    Video,
}

impl Category {
    /// Detect the category from a file extension (case-insensitive, no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" | "webp" => Some(Category::Image),
            "pdf" | "docx" | "txt" => Some(Category::Document),
            "mp3" | "wav" | "ogg" => Some(Category::Audio),
            "mp4" | "avi" | "webm" => Some(Category::Video),
            _ => None,
        }
    }

    /// The output formats offered for this category.
    pub fn targets(&self) -> &'static [Target] {
        match self {
            Category::Image => &[Target::Pdf, Target::Png, Target::Webp],
            Category::Document => &[Target::Pdf, Target::Txt, Target::Png],
            Category::Audio => &[Target::Mp3, Target::Wav, Target::Ogg],
            Category::Video => &[Target::Mp4, Target::Avi, Target::Webm],
        }
    }

    /// Whether `target` is a permitted output for this category.
    pub fn allows(&self, target: Target) -> bool {
        self.targets().contains(&target)
    }

    /// The input extensions this category accepts.
    pub fn input_extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Image => &["png", "jpg", "jpeg", "webp"],
            Category::Document => &["pdf", "docx", "txt"],
            Category::Audio => &["mp3", "wav", "ogg"],
            Category::Video => &["mp4", "avi", "webm"],
        }
    }

    pub const ALL: [Category; 4] = [
        Category::Image,
        Category::Document,
        Category::Audio,
        Category::Video,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Image => "image",
            Category::Document => "document",
            Category::Audio => "audio",
            Category::Video => "video",
        };
        f.write_str(s)
    }
}

/// Every output format the engine can produce, across all categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Pdf,
    Png,
    Webp,
    Txt,
    Mp3,
    Wav,
    Ogg,
    Mp4,
    Avi,
    Webm,
}

impl Target {
    /// Parse a user-supplied format name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Some(Target::Pdf),
            "png" => Some(Target::Png),
            "webp" => Some(Target::Webp),
            "txt" => Some(Target::Txt),
            "mp3" => Some(Target::Mp3),
            "wav" => Some(Target::Wav),
            "ogg" => Some(Target::Ogg),
            "mp4" => Some(Target::Mp4),
            "avi" => Some(Target::Avi),
            "webm" => Some(Target::Webm),
            _ => None,
        }
    }

    /// The output file extension (lowercase, no dot).
    pub fn extension(&self) -> &'static str {
        match self {
            Target::Pdf => "pdf",
            Target::Png => "png",
            Target::Webp => "webp",
            Target::Txt => "txt",
            Target::Mp3 => "mp3",
            Target::Wav => "wav",
            Target::Ogg => "ogg",
            Target::Mp4 => "mp4",
            Target::Avi => "avi",
            Target::Webm => "webm",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_ascii_uppercase())
    }
}

/// Render the supported-conversions table, one row per category.
///
/// Used by the CLI's `--list-formats` and mirrored in error hints.
pub fn conversion_table() -> String {
    let mut out = String::new();
    for cat in Category::ALL {
        let inputs = cat
            .input_extensions()
            .iter()
            .map(|e| e.to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(", ");
        let outputs = cat
            .targets()
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("{:<10} {} \u{2192} {}\n", cat.to_string(), inputs, outputs));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_detection_matches_router() {
        assert_eq!(Category::from_extension("JPG"), Some(Category::Image));
        assert_eq!(Category::from_extension("docx"), Some(Category::Document));
        assert_eq!(Category::from_extension("ogg"), Some(Category::Audio));
        assert_eq!(Category::from_extension("webm"), Some(Category::Video));
        assert_eq!(Category::from_extension("xlsx"), None);
        assert_eq!(Category::from_extension(""), None);
    }

    #[test]
    fn webp_routes_as_image_not_video() {
        // webp and webm differ by one letter; renamed uploads hit this a lot.
        assert_eq!(Category::from_extension("webp"), Some(Category::Image));
        assert_eq!(Category::from_extension("webm"), Some(Category::Video));
    }

    #[test]
    fn target_parse_is_case_insensitive() {
        assert_eq!(Target::parse("PDF"), Some(Target::Pdf));
        assert_eq!(Target::parse(" webp "), Some(Target::Webp));
        assert_eq!(Target::parse("flac"), None);
    }

    #[test]
    fn allowed_targets_per_category() {
        assert!(Category::Document.allows(Target::Png));
        assert!(!Category::Document.allows(Target::Mp3));
        assert!(Category::Audio.allows(Target::Wav));
        assert!(!Category::Audio.allows(Target::Pdf));
        assert!(Category::Image.allows(Target::Pdf));
        assert!(!Category::Video.allows(Target::Png));
    }

    #[test]
    fn conversion_table_lists_every_category() {
        let table = conversion_table();
        for cat in ["image", "document", "audio", "video"] {
            assert!(table.contains(cat), "missing {cat} in:\n{table}");
        }
    }
}
