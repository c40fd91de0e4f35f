// Copyright (c) 2026 rezky_nightky

use std::char;

use crate::config::CANON_ALPHABET;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charset(u32);

impl Charset {
    pub const NONE: Charset = Charset(0);
    pub const CANON: Charset = Charset(0x1);
    pub const ENGLISH_LETTERS: Charset = Charset(0x2);
    pub const ENGLISH_DIGITS: Charset = Charset(0x4);
    pub const ENGLISH_PUNCTUATION: Charset = Charset(0x8);
    pub const BINARY: Charset = Charset(0x10);
    pub const HEX: Charset = Charset(0x20);
    pub const GREEK: Charset = Charset(0x40);
    pub const HIRAGANA: Charset = Charset(0x80);
    pub const BLOCKS: Charset = Charset(0x100);
    pub const BOXDRAW: Charset = Charset(0x200);
    pub const LATIN1: Charset = Charset(0x400);

    pub const ASCII: Charset = Charset(0xE);

    pub fn contains(self, other: Charset) -> bool {
        (self.0 & other.0) != 0
    }

    pub fn union(self, other: Charset) -> Charset {
        Charset(self.0 | other.0)
    }
}

pub const PRESETS: &[(&str, &str)] = &[
    ("canon", "Digits + letters + underscores of the film rain (alias: matrix)"),
    ("ascii", "Letters + digits + punctuation"),
    ("english", "Letters only"),
    ("digits", "Digits only (aliases: dec, decimal)"),
    ("punc", "Punctuation only"),
    ("binary", "0 and 1 (aliases: bin, 01)"),
    ("hex", "0-9 and A-F (alias: hexadecimal)"),
    ("greek", "Greek"),
    ("hiragana", "Hiragana (alias: kana)"),
    ("blocks", "Block elements (shading blocks)"),
    ("retro", "Box-drawing characters"),
    ("latin1", "Latin-1 accented letters (alias: latin)"),
    ("code", "Letters + digits + punc (combo)"),
];

/// Parses `--chars` input: comma separated hex code points, taken in pairs
/// as inclusive ranges.
pub fn parse_user_hex_chars(s: &str) -> Result<Vec<char>, String> {
    let mut out = Vec::new();
    for (i, part) in s.split(',').enumerate() {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let v = u32::from_str_radix(part, 16)
            .map_err(|_| format!("invalid hex char at index {}", i + 1))?;
        let ch = char::from_u32(v)
            .ok_or_else(|| format!("invalid unicode scalar at index {}", i + 1))?;
        out.push(ch);
    }
    Ok(out)
}

pub fn parse_user_ranges(s: &str) -> Result<Vec<(char, char)>, String> {
    let list = parse_user_hex_chars(s)?;
    if list.len() % 2 != 0 {
        return Err("odd number of unicode chars given (must be even)".to_string());
    }
    Ok(list.chunks(2).map(|pair| (pair[0], pair[1])).collect())
}

pub fn charset_from_str(spec: &str) -> Result<Charset, String> {
    let spec = spec.trim().to_ascii_lowercase();
    match spec.as_str() {
        "canon" | "matrix" => Ok(Charset::CANON),
        "ascii" => Ok(Charset::ASCII),
        "english" => Ok(Charset::ENGLISH_LETTERS),
        "digits" | "dec" | "decimal" => Ok(Charset::ENGLISH_DIGITS),
        "punc" => Ok(Charset::ENGLISH_PUNCTUATION),
        "bin" | "binary" | "01" => Ok(Charset::BINARY),
        "hex" | "hexadecimal" => Ok(Charset::HEX),
        "greek" => Ok(Charset::GREEK),
        "hiragana" | "kana" => Ok(Charset::HIRAGANA),
        "blocks" => Ok(Charset::BLOCKS),
        "retro" => Ok(Charset::BOXDRAW),
        "latin1" | "latin" => Ok(Charset::LATIN1),
        "code" => Ok(Charset::ENGLISH_LETTERS
            .union(Charset::ENGLISH_DIGITS)
            .union(Charset::ENGLISH_PUNCTUATION)),
        _ => Err(format!(
            "unsupported charset: {} (see --list-charsets)",
            spec
        )),
    }
}

fn push_range(out: &mut Vec<char>, start: u32, end: u32) {
    for v in start..=end {
        if let Some(ch) = char::from_u32(v) {
            out.push(ch);
        }
    }
}

/// Expands a preset plus user ranges into the stream alphabet. Falls back
/// to the canon alphabet when nothing was selected.
pub fn build_chars(charset: Charset, user_ranges: &[(char, char)]) -> Vec<char> {
    let mut out: Vec<char> = Vec::new();

    if charset.contains(Charset::CANON) {
        out.extend(CANON_ALPHABET.chars());
    }
    if charset.contains(Charset::BINARY) {
        push_range(&mut out, 0x30, 0x31);
    }
    if charset.contains(Charset::HEX) {
        push_range(&mut out, 0x30, 0x39);
        push_range(&mut out, 0x41, 0x46);
    }
    if charset.contains(Charset::ENGLISH_LETTERS) {
        push_range(&mut out, 0x41, 0x5A);
        push_range(&mut out, 0x61, 0x7A);
    }
    if charset.contains(Charset::ENGLISH_DIGITS) {
        push_range(&mut out, 0x30, 0x39);
    }
    if charset.contains(Charset::ENGLISH_PUNCTUATION) {
        push_range(&mut out, 0x21, 0x2F);
        push_range(&mut out, 0x3A, 0x40);
        push_range(&mut out, 0x5B, 0x60);
        push_range(&mut out, 0x7B, 0x7E);
    }
    if charset.contains(Charset::GREEK) {
        push_range(&mut out, 0x0391, 0x03A1);
        push_range(&mut out, 0x03A3, 0x03A9);
        push_range(&mut out, 0x03B1, 0x03C9);
    }
    if charset.contains(Charset::HIRAGANA) {
        push_range(&mut out, 0x3041, 0x3093);
    }
    if charset.contains(Charset::BLOCKS) {
        push_range(&mut out, 0x2580, 0x259F);
    }
    if charset.contains(Charset::BOXDRAW) {
        push_range(&mut out, 0x2500, 0x257F);
    }
    if charset.contains(Charset::LATIN1) {
        push_range(&mut out, 0x00C0, 0x00FF);
    }

    for &(a, b) in user_ranges {
        push_range(&mut out, a as u32, b as u32);
    }

    if out.is_empty() {
        out.extend(CANON_ALPHABET.chars());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_user_hex_chars_parses_hex_codepoints() {
        let v = parse_user_hex_chars("30,31").unwrap();
        assert_eq!(v, vec!['0', '1']);
    }

    #[test]
    fn user_ranges_require_pairs() {
        assert_eq!(parse_user_ranges("41,43").unwrap(), vec![('A', 'C')]);
        assert!(parse_user_ranges("41,43,45").is_err());
    }

    #[test]
    fn canon_keeps_repeated_underscores() {
        let out = build_chars(charset_from_str("canon").unwrap(), &[]);
        assert_eq!(out.iter().filter(|&&c| c == '_').count(), 4);
        assert!(!out.contains(&'c'));
    }

    #[test]
    fn build_chars_binary_has_only_0_and_1() {
        let out = build_chars(Charset::BINARY, &[]);
        assert_eq!(out, vec!['0', '1']);
    }

    #[test]
    fn empty_selection_falls_back_to_canon() {
        let out = build_chars(Charset::NONE, &[]);
        assert_eq!(out.len(), CANON_ALPHABET.chars().count());
    }
}
