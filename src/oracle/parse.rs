//! Parsing for the oracle's wire micro-formats.
//!
//! Combination and companion replies are pipe-delimited plain text
//! (`Result|Emoji|Hex1|Hex2`); extraction replies are JSON. Malformed fields
//! are recovered locally — a missing emoji is fished out of the result text,
//! bad colors fall back to fixed defaults — and never surface to the player.

use serde::{Deserialize, Serialize};

/// Default gradient used when the oracle forgets its colors.
pub const FALLBACK_COLORS: [&str; 2] = ["#60A5FA", "#A78BFA"];
/// Glyph used when no usable emoji can be recovered.
pub const FALLBACK_EMOJI: &str = "✨";

/// A successful combination outcome as stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combination {
    pub result: String,
    pub emoji: String,
    pub colors: [String; 2],
}

/// A companion descriptor, post-fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanionSpec {
    pub name: String,
    pub emoji: String,
    pub color: String,
    pub description: String,
}

impl CompanionSpec {
    /// The fixed descriptor used when companion generation fails outright.
    pub fn error_born() -> Self {
        Self {
            name: "Void Mite".into(),
            emoji: "🌑".into(),
            color: "#94a3b8".into(),
            description: "Born from an error.".into(),
        }
    }
}

/// One seed concept from extraction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedConcept {
    pub text: String,
    pub emoji: String,
}

/// Extraction result: detected language plus the seed concept batch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Extraction {
    #[serde(default)]
    pub language: String,
    pub concepts: Vec<SeedConcept>,
}

/// Whether `c` lands in the pictographic blocks the oracle emits emoji from.
/// Covers the Supplemental Symbols / Emoticons / Transport planes plus the
/// Miscellaneous Symbols, Dingbats and Symbols-and-Arrows BMP blocks.
pub fn is_pictographic(c: char) -> bool {
    matches!(c,
        '\u{1F000}'..='\u{1FAFF}'
        | '\u{2600}'..='\u{27BF}'
        | '\u{2B00}'..='\u{2BFF}')
}

/// First pictographic character in `s`.
pub fn find_pictograph(s: &str) -> Option<char> {
    s.chars().find(|c| is_pictographic(*c))
}

fn strip_wrapping(result: &str) -> String {
    let mut r = result.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    if let Some(stripped) = r.strip_suffix('.') {
        r = stripped;
    }
    r.trim().to_string()
}

/// Parse a combination reply. `None` is the valid "no relation" outcome:
/// an empty reply, a reply containing `NULL`, or one mentioning "nothing".
pub fn parse_combination(raw: &str) -> Option<Combination> {
    let text = raw.trim();
    if text.is_empty() || text.contains("NULL") || text.to_lowercase().contains("nothing") {
        return None;
    }

    let mut fields = text.split('|').map(str::trim);
    let mut result = strip_wrapping(fields.next().unwrap_or(""));
    let mut emoji = fields.next().unwrap_or("").to_string();
    let color1 = fields.next().unwrap_or("").to_string();
    let color2 = fields.next().unwrap_or("").to_string();

    if emoji.is_empty() {
        match find_pictograph(&result) {
            Some(p) => {
                emoji = p.to_string();
                // Orphaned variation selectors are invisible; drop them too.
                result = strip_wrapping(&result.replacen(p, "", 1).replace('\u{FE0F}', ""));
            }
            None => emoji = FALLBACK_EMOJI.into(),
        }
    }

    if result.is_empty() {
        return None;
    }

    let fix = |c: String, fallback: &str| {
        if c.starts_with('#') {
            c
        } else {
            fallback.to_string()
        }
    };

    Some(Combination {
        result,
        emoji,
        colors: [fix(color1, FALLBACK_COLORS[0]), fix(color2, FALLBACK_COLORS[1])],
    })
}

/// Parse an emoji-only reply for the custom-creation feature.
/// Falls back to [`FALLBACK_EMOJI`] when nothing pictographic comes back.
pub fn parse_emoji_reply(raw: &str) -> String {
    find_pictograph(raw.trim())
        .map(|c| c.to_string())
        .unwrap_or_else(|| FALLBACK_EMOJI.to_string())
}

/// Parse a companion reply, defaulting each field independently.
pub fn parse_companion(raw: &str) -> CompanionSpec {
    let mut fields = raw.trim().split('|').map(str::trim);
    let name = fields.next().unwrap_or("").to_string();
    let emoji = fields.next().unwrap_or("").to_string();
    let color = fields.next().unwrap_or("").to_string();
    let description = fields.next().unwrap_or("").to_string();

    CompanionSpec {
        name: if name.is_empty() { "Glitch".into() } else { name },
        emoji: if emoji.is_empty() { "👾".into() } else { emoji },
        color: if color.starts_with('#') { color } else { "#FFFFFF".into() },
        description: if description.is_empty() {
            "A strange visitor.".into()
        } else {
            description
        },
    }
}

/// Parse an extraction reply. Unlike the other operations this one has no
/// fallback: a session cannot start from a garbage seed set.
pub fn parse_extraction(raw: &str) -> Result<Extraction, String> {
    let mut extraction: Extraction =
        serde_json::from_str(raw.trim()).map_err(|e| e.to_string())?;
    extraction
        .concepts
        .retain(|c| !c.text.trim().is_empty());
    if extraction.concepts.is_empty() {
        return Err("no concepts in extraction reply".into());
    }
    if extraction.language.trim().is_empty() {
        extraction.language = "English".into();
    }
    Ok(extraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── combination ────────────────────────────────────────────────

    #[test]
    fn well_formed_combination() {
        let c = parse_combination("Lava|🌋|#FF4500|#8B0000").unwrap();
        assert_eq!(c.result, "Lava");
        assert_eq!(c.emoji, "🌋");
        assert_eq!(c.colors, ["#FF4500".to_string(), "#8B0000".to_string()]);
    }

    #[test]
    fn null_marker_is_no_relation() {
        assert_eq!(parse_combination("NULL"), None);
        assert_eq!(parse_combination("  NULL  "), None);
        assert_eq!(parse_combination("There is nothing here"), None);
        assert_eq!(parse_combination("Nothing"), None);
        assert_eq!(parse_combination(""), None);
        assert_eq!(parse_combination("   "), None);
    }

    #[test]
    fn missing_emoji_recovered_from_result_text() {
        let c = parse_combination("Steam 💨").unwrap();
        assert_eq!(c.result, "Steam");
        assert_eq!(c.emoji, "💨");
    }

    #[test]
    fn missing_emoji_with_no_pictograph_falls_back() {
        let c = parse_combination("Steam").unwrap();
        assert_eq!(c.result, "Steam");
        assert_eq!(c.emoji, FALLBACK_EMOJI);
        assert_eq!(c.colors, [FALLBACK_COLORS[0].to_string(), FALLBACK_COLORS[1].to_string()]);
    }

    #[test]
    fn malformed_colors_fall_back() {
        let c = parse_combination("Mud|🟤|brown|#123456").unwrap();
        assert_eq!(c.colors[0], FALLBACK_COLORS[0]);
        assert_eq!(c.colors[1], "#123456");
    }

    #[test]
    fn quotes_and_trailing_period_are_stripped() {
        let c = parse_combination("\"Obsidian.\"|🪨|#000000|#333333").unwrap();
        assert_eq!(c.result, "Obsidian");
    }

    #[test]
    fn emoji_only_reply_is_no_relation() {
        // Stripping the recovered emoji leaves an empty result.
        assert_eq!(parse_combination("🔥"), None);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let c = parse_combination("Rain|🌧|#4A90D9|#2C5AA0|junk|more").unwrap();
        assert_eq!(c.result, "Rain");
    }

    // ── single emoji ───────────────────────────────────────────────

    #[test]
    fn emoji_reply_extracts_pictograph() {
        // Variation selectors are dropped along with everything else that
        // is not the pictograph itself.
        assert_eq!(parse_emoji_reply(" 🕳️ "), '\u{1F573}'.to_string());
        assert_eq!(parse_emoji_reply("Here you go: 🚀"), "🚀");
    }

    #[test]
    fn emoji_reply_falls_back_to_sparkle() {
        assert_eq!(parse_emoji_reply("I cannot help with that"), FALLBACK_EMOJI);
        assert_eq!(parse_emoji_reply(""), FALLBACK_EMOJI);
    }

    // ── companion ──────────────────────────────────────────────────

    #[test]
    fn well_formed_companion() {
        let c = parse_companion("Lava Slime|🌋|#FF4500|A warm, bubbly friend.");
        assert_eq!(c.name, "Lava Slime");
        assert_eq!(c.emoji, "🌋");
        assert_eq!(c.color, "#FF4500");
        assert_eq!(c.description, "A warm, bubbly friend.");
    }

    #[test]
    fn companion_fields_default_independently() {
        let c = parse_companion("|||");
        assert_eq!(c.name, "Glitch");
        assert_eq!(c.emoji, "👾");
        assert_eq!(c.color, "#FFFFFF");
        assert_eq!(c.description, "A strange visitor.");

        let c = parse_companion("Mossling|🌿|chartreuse|Soft and quiet.");
        assert_eq!(c.color, "#FFFFFF");
        assert_eq!(c.name, "Mossling");
    }

    #[test]
    fn error_born_companion_is_fixed() {
        let c = CompanionSpec::error_born();
        assert_eq!(c.name, "Void Mite");
        assert_eq!(c.emoji, "🌑");
    }

    // ── extraction ─────────────────────────────────────────────────

    #[test]
    fn extraction_parses_language_and_concepts() {
        let raw = r#"{"language":"日本語","concepts":[{"text":"海","emoji":"🌊"},{"text":"山","emoji":"⛰"}]}"#;
        let e = parse_extraction(raw).unwrap();
        assert_eq!(e.language, "日本語");
        assert_eq!(e.concepts.len(), 2);
        assert_eq!(e.concepts[0].text, "海");
    }

    #[test]
    fn extraction_rejects_garbage_and_empty_sets() {
        assert!(parse_extraction("not json").is_err());
        assert!(parse_extraction(r#"{"language":"English","concepts":[]}"#).is_err());
        assert!(parse_extraction(r#"{"language":"","concepts":[{"text":"  ","emoji":"x"}]}"#).is_err());
    }

    #[test]
    fn extraction_defaults_missing_language() {
        let e = parse_extraction(r#"{"concepts":[{"text":"sea","emoji":"🌊"}]}"#).unwrap();
        assert_eq!(e.language, "English");
    }

    // ── pictograph detection ───────────────────────────────────────

    #[test]
    fn pictograph_ranges() {
        assert!(is_pictographic('🌋'));
        assert!(is_pictographic('✨'));
        assert!(is_pictographic('⭐'));
        assert!(is_pictographic('🫠'));
        assert!(!is_pictographic('A'));
        assert!(!is_pictographic('漢'));
        assert!(!is_pictographic('|'));
    }
}
