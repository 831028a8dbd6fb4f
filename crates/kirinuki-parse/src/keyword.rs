use std::collections::HashMap;
use std::sync::LazyLock;

use bitflags::bitflags;

use crate::elements::{ElementCategory, Elements};
use crate::token::TokenRange;

bitflags! {
    /// Flags controlling how a keyword may be used once matched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeywordOptions: u8 {
        /// May seed automatic recognition during element extraction.
        const IDENTIFIABLE = 0b0000_0001;
        /// Eligible for secondary (fuzzy) matching.
        const SEARCHABLE = 0b0000_0010;
        /// An exact match is a legitimate token on its own. Cleared for
        /// keywords that only mean something next to other content, like
        /// a bare `E` episode prefix.
        const VALID = 0b0000_0100;
    }
}

impl KeywordOptions {
    pub const DEFAULT: Self = Self::all();
    pub const INVALID: Self = Self::IDENTIFIABLE.union(Self::SEARCHABLE);
    pub const UNIDENTIFIABLE: Self = Self::SEARCHABLE.union(Self::VALID);
    pub const UNIDENTIFIABLE_INVALID: Self = Self::SEARCHABLE;
    pub const UNIDENTIFIABLE_UNSEARCHABLE: Self = Self::VALID;

    pub fn identifiable(self) -> bool {
        self.contains(Self::IDENTIFIABLE)
    }

    pub fn searchable(self) -> bool {
        self.contains(Self::SEARCHABLE)
    }

    pub fn valid(self) -> bool {
        self.contains(Self::VALID)
    }
}

impl Default for KeywordOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A registered keyword: the category it populates plus its matching flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordEntry {
    pub category: ElementCategory,
    pub options: KeywordOptions,
}

type KeywordGroup = (ElementCategory, KeywordOptions, &'static [&'static str]);

/// Built-in keyword groups, registered in order. All keys are UPPERCASE.
const BUILTIN_KEYWORDS: &[KeywordGroup] = &[
    // ── Season prefix ────────────────────────────────────────────
    (
        ElementCategory::AnimeSeasonPrefix,
        KeywordOptions::UNIDENTIFIABLE,
        &["SAISON", "SEASON"],
    ),
    // ── Anime type ───────────────────────────────────────────────
    (
        ElementCategory::AnimeType,
        KeywordOptions::UNIDENTIFIABLE,
        &["GEKIJOUBAN", "MOVIE", "OAD", "OAV", "ONA", "OVA", "SPECIAL", "SPECIALS", "TV"],
    ),
    // e.g. "Yumeiro Patissiere SP Professional"
    (
        ElementCategory::AnimeType,
        KeywordOptions::UNIDENTIFIABLE_UNSEARCHABLE,
        &["SP"],
    ),
    (
        ElementCategory::AnimeType,
        KeywordOptions::UNIDENTIFIABLE_INVALID,
        &["ED", "ENDING", "NCED", "NCOP", "OP", "OPENING", "PREVIEW", "PV"],
    ),
    // ── Audio terms ──────────────────────────────────────────────
    (
        ElementCategory::AudioTerm,
        KeywordOptions::DEFAULT,
        &[
            // Channels
            "2.0CH", "2CH", "5.1", "5.1CH", "DTS", "DTS-ES", "DTS5.1", "TRUEHD5.1",
            // Codecs
            "AAC", "AACX2", "AACX3", "AACX4", "AC3", "FLAC", "FLACX2", "FLACX3", "FLACX4",
            "LOSSLESS", "MP3", "OGG", "VORBIS",
            // Language
            "DUALAUDIO", "DUAL AUDIO",
        ],
    ),
    // ── Device compatibility ─────────────────────────────────────
    (
        ElementCategory::DeviceCompatibility,
        KeywordOptions::DEFAULT,
        &["IPAD3", "IPHONE5", "IPOD", "PS3", "XBOX", "XBOX360"],
    ),
    (
        ElementCategory::DeviceCompatibility,
        KeywordOptions::UNIDENTIFIABLE,
        &["ANDROID"],
    ),
    // ── Episode prefix ───────────────────────────────────────────
    (
        ElementCategory::EpisodePrefix,
        KeywordOptions::DEFAULT,
        &[
            "EP", "EP.", "EPS", "EPS.", "EPISODE", "EPISODE.", "EPISODES", "VOL", "VOL.",
            "VOLUME", "CAPITULO", "EPISODIO", "FOLGE",
        ],
    ),
    // Single-letter prefixes are never tokens by themselves.
    (
        ElementCategory::EpisodePrefix,
        KeywordOptions::INVALID,
        &["E", "\u{7B2C}"],
    ),
    // ── File extensions ──────────────────────────────────────────
    (
        ElementCategory::FileExtension,
        KeywordOptions::DEFAULT,
        &[
            "3GP", "AVI", "DIVX", "FLV", "M2TS", "MKV", "MOV", "MP4", "MPG", "OGM", "RM", "RMVB",
            "WEBM", "WMV",
        ],
    ),
    (
        ElementCategory::FileExtension,
        KeywordOptions::INVALID,
        &[
            "AAC", "AIFF", "FLAC", "M4A", "MP3", "MKA", "OGG", "WAV", "WMA", "7Z", "RAR", "ZIP",
            "ASS", "SRT",
        ],
    ),
    // ── Language ─────────────────────────────────────────────────
    (
        ElementCategory::Language,
        KeywordOptions::DEFAULT,
        &["ENG", "ENGLISH", "ESPANOL", "JAP", "PT-BR", "SPANISH", "VOSTFR"],
    ),
    // e.g. "Tokyo ESP", "Bokura ga Ita"
    (
        ElementCategory::Language,
        KeywordOptions::UNIDENTIFIABLE,
        &["ESP", "ITA"],
    ),
    // ── Other ────────────────────────────────────────────────────
    (
        ElementCategory::Other,
        KeywordOptions::DEFAULT,
        &["REMASTER", "REMASTERED", "UNCENSORED", "UNCUT", "TS", "VFR", "WIDESCREEN", "WS"],
    ),
    // ── Release group ────────────────────────────────────────────
    (
        ElementCategory::ReleaseGroup,
        KeywordOptions::DEFAULT,
        &["THORA"],
    ),
    // ── Release information ──────────────────────────────────────
    (
        ElementCategory::ReleaseInformation,
        KeywordOptions::DEFAULT,
        &["BATCH", "COMPLETE", "PATCH", "REMUX"],
    ),
    // e.g. "The End of Evangelion", "Final Approach"
    (
        ElementCategory::ReleaseInformation,
        KeywordOptions::UNIDENTIFIABLE,
        &["END", "FINAL"],
    ),
    // ── Release version ──────────────────────────────────────────
    (
        ElementCategory::ReleaseVersion,
        KeywordOptions::DEFAULT,
        &["V0", "V1", "V2", "V3", "V4"],
    ),
    // ── Source ───────────────────────────────────────────────────
    (
        ElementCategory::Source,
        KeywordOptions::DEFAULT,
        &[
            "BD", "BDRIP", "BLURAY", "BLU-RAY", "DVD", "DVD5", "DVD9", "DVD-R2J", "DVDRIP",
            "DVD-RIP", "R2DVD", "R2J", "R2JDVD", "R2JDVDRIP", "HDTV", "HDTVRIP", "TVRIP",
            "TV-RIP", "WEBCAST", "WEBRIP",
        ],
    ),
    // ── Subtitles ────────────────────────────────────────────────
    (
        ElementCategory::Subtitles,
        KeywordOptions::DEFAULT,
        &[
            "ASS", "BIG5", "DUB", "DUBBED", "HARDSUB", "RAW", "SOFTSUB", "SOFTSUBS", "SUB",
            "SUBBED", "SUBTITLED",
        ],
    ),
    // ── Video terms ──────────────────────────────────────────────
    (
        ElementCategory::VideoTerm,
        KeywordOptions::DEFAULT,
        &[
            // Frame rate
            "23.976FPS", "24FPS", "29.97FPS", "30FPS", "60FPS", "120FPS",
            // Codec
            "8BIT", "8-BIT", "10BIT", "10BITS", "10-BIT", "10-BITS", "HI10P", "H264", "H.264",
            "X264", "X.264", "AVC", "DIVX", "DIVX5", "DIVX6", "XVID",
            // Format
            "AVI", "RMVB", "WMV", "WMV3", "WMV9",
            // Quality
            "HQ", "LQ",
            // Resolution
            "HD", "SD",
        ],
    ),
];

/// A literal phrase found by [`KeywordDictionary::peek`] before any
/// splitting, so it survives as a single token.
#[derive(Debug)]
struct Phrase {
    category: ElementCategory,
    /// Only match where no letter or digit touches either end.
    whole_word: bool,
    texts: &'static [&'static str],
}

/// Phrases are matched with their exact casing.
const PEEK_PHRASES: &[Phrase] = &[
    Phrase {
        category: ElementCategory::AudioTerm,
        whole_word: false,
        texts: &["Dual Audio"],
    },
    Phrase {
        category: ElementCategory::VideoTerm,
        whole_word: false,
        texts: &["H264", "H.264", "h264", "h.264"],
    },
    Phrase {
        category: ElementCategory::VideoResolution,
        whole_word: false,
        texts: &["480p", "720p", "1080p"],
    },
    Phrase {
        category: ElementCategory::Source,
        whole_word: false,
        texts: &["Blu-Ray"],
    },
    // e.g. "[Thora]", but not "Thorax"
    Phrase {
        category: ElementCategory::ReleaseGroup,
        whole_word: true,
        texts: &["Thora"],
    },
];

static SHARED: LazyLock<KeywordDictionary> = LazyLock::new(KeywordDictionary::new);

/// Categorized keyword tables plus the pre-identification phrase table.
///
/// Build it once, then share it by reference: nothing mutates a dictionary
/// after construction apart from [`add`](Self::add) calls made while
/// setting it up.
#[derive(Debug, Clone)]
pub struct KeywordDictionary {
    keys: HashMap<String, KeywordEntry>,
    // Kept apart so "AVI" or "ASS" can be both an extension and a term.
    file_extensions: HashMap<String, KeywordEntry>,
    phrases: &'static [Phrase],
}

impl Default for KeywordDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordDictionary {
    /// Dictionary populated with the built-in keyword tables.
    pub fn new() -> Self {
        let mut dictionary = Self::empty();
        for (category, options, keywords) in BUILTIN_KEYWORDS {
            dictionary.add(*category, *options, keywords.iter().copied());
        }
        dictionary
    }

    /// Dictionary with no keywords. The phrase table is still present.
    pub fn empty() -> Self {
        Self {
            keys: HashMap::new(),
            file_extensions: HashMap::new(),
            phrases: PEEK_PHRASES,
        }
    }

    /// Process-wide built-in dictionary, constructed on first access.
    pub fn shared() -> &'static KeywordDictionary {
        &SHARED
    }

    /// Register `keywords` under `category`. Empty keywords are skipped and
    /// a keyword already in the table keeps its first registration.
    pub fn add<I, S>(&mut self, category: ElementCategory, options: KeywordOptions, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let table = self.table_mut(category);
        for keyword in keywords {
            let keyword = keyword.as_ref();
            if keyword.is_empty() {
                continue;
            }
            table
                .entry(Self::normalize(keyword))
                .or_insert(KeywordEntry { category, options });
        }
    }

    /// Whether `s` is registered under exactly `category`.
    pub fn find(&self, category: ElementCategory, s: &str) -> bool {
        self.table(category)
            .get(&Self::normalize(s))
            .is_some_and(|entry| entry.category == category)
    }

    /// Look up `s`. With [`ElementCategory::Unknown`] any category matches
    /// and the returned entry tells which one; otherwise the keyword must
    /// belong to `category`.
    pub fn lookup(&self, s: &str, category: ElementCategory) -> Option<KeywordEntry> {
        let entry = self.table(category).get(&Self::normalize(s))?;
        if category != ElementCategory::Unknown && entry.category != category {
            return None;
        }
        Some(*entry)
    }

    /// Keys are compared after upper-casing each character on its own.
    /// Characters without a single-character upper case (`ß`, `ﬁ`) are kept
    /// as they are, so a key never changes length.
    pub fn normalize(s: &str) -> String {
        s.chars()
            .map(|c| {
                let mut upper = c.to_uppercase();
                match (upper.next(), upper.next()) {
                    (Some(u), None) => u,
                    _ => c,
                }
            })
            .collect()
    }

    /// Scan `range` of the raw filename for literal phrases.
    ///
    /// Each phrase's first occurrence inside the range is recorded as an
    /// element and its absolute range is appended to `ranges`, in phrase
    /// table order. Whole-word phrases skip occurrences that run into a
    /// letter or digit; the edges of the range count as boundaries. Tokens
    /// are never touched.
    pub fn peek(
        &self,
        filename: &[char],
        range: TokenRange,
        elements: &mut Elements,
        ranges: &mut Vec<TokenRange>,
    ) {
        let haystack = &filename[range.offset..range.end()];
        for phrase in self.phrases {
            for text in phrase.texts {
                let needle: Vec<char> = text.chars().collect();
                let found = find_subslice(haystack, &needle, |position| {
                    !phrase.whole_word || is_word_bounded(haystack, position, needle.len())
                });
                if let Some(position) = found {
                    tracing::trace!(phrase = %text, offset = range.offset + position, "Pre-identified phrase");
                    elements.insert(phrase.category, *text);
                    ranges.push(TokenRange::new(range.offset + position, needle.len()));
                }
            }
        }
    }

    fn table(&self, category: ElementCategory) -> &HashMap<String, KeywordEntry> {
        if category == ElementCategory::FileExtension {
            &self.file_extensions
        } else {
            &self.keys
        }
    }

    fn table_mut(&mut self, category: ElementCategory) -> &mut HashMap<String, KeywordEntry> {
        if category == ElementCategory::FileExtension {
            &mut self.file_extensions
        } else {
            &mut self.keys
        }
    }
}

/// First position of `needle` in `haystack` that `accept` agrees to.
fn find_subslice(
    haystack: &[char],
    needle: &[char],
    accept: impl Fn(usize) -> bool,
) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .enumerate()
        .find(|&(position, window)| window == needle && accept(position))
        .map(|(position, _)| position)
}

fn is_word_bounded(haystack: &[char], start: usize, len: usize) -> bool {
    let before = start.checked_sub(1).and_then(|i| haystack.get(i));
    let after = haystack.get(start + len);
    !before.is_some_and(|c| c.is_alphanumeric()) && !after.is_some_and(|c| c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let dictionary = KeywordDictionary::new();
        for input in ["bd", "Bd", "BD"] {
            assert!(dictionary.find(ElementCategory::Source, input));
            let entry = dictionary.lookup(input, ElementCategory::Unknown).unwrap();
            assert_eq!(entry.category, ElementCategory::Source);
            assert_eq!(entry.options, KeywordOptions::DEFAULT);
        }
    }

    #[test]
    fn test_lookup_resolves_unknown_category() {
        let dictionary = KeywordDictionary::new();
        let entry = dictionary.lookup("Season", ElementCategory::Unknown).unwrap();
        assert_eq!(entry.category, ElementCategory::AnimeSeasonPrefix);
        assert!(!entry.options.identifiable());
        assert!(entry.options.searchable());
        assert!(entry.options.valid());
    }

    #[test]
    fn test_lookup_rejects_category_mismatch() {
        let dictionary = KeywordDictionary::new();
        assert!(dictionary.lookup("BD", ElementCategory::Language).is_none());
        assert!(!dictionary.find(ElementCategory::Language, "BD"));
        assert!(dictionary.lookup("NOT-A-KEYWORD", ElementCategory::Unknown).is_none());
    }

    #[test]
    fn test_file_extensions_live_in_separate_table() {
        let dictionary = KeywordDictionary::new();
        let extension = dictionary.lookup("avi", ElementCategory::FileExtension).unwrap();
        assert_eq!(extension.category, ElementCategory::FileExtension);
        let term = dictionary.lookup("avi", ElementCategory::Unknown).unwrap();
        assert_eq!(term.category, ElementCategory::VideoTerm);
        // Unknown never searches the extension table.
        assert!(dictionary.lookup("mkv", ElementCategory::Unknown).is_none());
        assert!(dictionary.find(ElementCategory::FileExtension, "mkv"));
    }

    #[test]
    fn test_invalid_options() {
        let dictionary = KeywordDictionary::new();
        let entry = dictionary.lookup("e", ElementCategory::EpisodePrefix).unwrap();
        assert!(entry.options.identifiable());
        assert!(!entry.options.valid());
        let srt = dictionary.lookup("srt", ElementCategory::FileExtension).unwrap();
        assert_eq!(srt.options, KeywordOptions::INVALID);
        let sp = dictionary.lookup("sp", ElementCategory::AnimeType).unwrap();
        assert!(!sp.options.searchable());
    }

    #[test]
    fn test_first_registration_wins() {
        let mut dictionary = KeywordDictionary::empty();
        dictionary.add(ElementCategory::Source, KeywordOptions::DEFAULT, ["WEB"]);
        dictionary.add(ElementCategory::Other, KeywordOptions::INVALID, ["web", ""]);
        let entry = dictionary.lookup("Web", ElementCategory::Unknown).unwrap();
        assert_eq!(entry.category, ElementCategory::Source);
        assert_eq!(entry.options, KeywordOptions::DEFAULT);
        assert!(dictionary.lookup("", ElementCategory::Unknown).is_none());
    }

    #[test]
    fn test_same_keyword_in_both_tables() {
        let dictionary = KeywordDictionary::new();
        assert!(dictionary.find(ElementCategory::Subtitles, "ass"));
        assert!(dictionary.find(ElementCategory::FileExtension, "ass"));
    }

    #[test]
    fn test_peek_reports_phrase_and_range() {
        let dictionary = KeywordDictionary::new();
        let filename = chars("[Group] Title Dual Audio 720p");
        let mut elements = Elements::new();
        let mut ranges = Vec::new();
        dictionary.peek(
            &filename,
            TokenRange::new(8, filename.len() - 8),
            &mut elements,
            &mut ranges,
        );
        assert_eq!(elements.get(ElementCategory::AudioTerm), "Dual Audio");
        assert_eq!(elements.get(ElementCategory::VideoResolution), "720p");
        assert_eq!(ranges, vec![TokenRange::new(14, 10), TokenRange::new(25, 4)]);
    }

    #[test]
    fn test_peek_is_case_exact_and_range_bound() {
        let dictionary = KeywordDictionary::new();
        let filename = chars("dual audio 1080P H264");
        let mut elements = Elements::new();
        let mut ranges = Vec::new();
        dictionary.peek(&filename, TokenRange::new(0, 16), &mut elements, &mut ranges);
        assert!(elements.is_empty());
        assert!(ranges.is_empty());
    }

    #[test]
    fn test_peek_records_first_occurrence_only() {
        let dictionary = KeywordDictionary::new();
        let filename = chars("720p 720p");
        let mut elements = Elements::new();
        let mut ranges = Vec::new();
        dictionary.peek(
            &filename,
            TokenRange::new(0, filename.len()),
            &mut elements,
            &mut ranges,
        );
        assert_eq!(elements.count(ElementCategory::VideoResolution), 1);
        assert_eq!(ranges, vec![TokenRange::new(0, 4)]);
    }

    #[test]
    fn test_normalize_keeps_length() {
        assert_eq!(KeywordDictionary::normalize("bd-rip"), "BD-RIP");
        assert_eq!(KeywordDictionary::normalize("straße ﬁ"), "STRAßE ﬁ");
        assert_eq!(KeywordDictionary::normalize("straße ﬁ").chars().count(), 8);
    }

    #[test]
    fn test_whole_word_phrase_skips_longer_words() {
        let dictionary = KeywordDictionary::new();
        let filename = chars("Thorax Thora_v2");
        let mut elements = Elements::new();
        let mut ranges = Vec::new();
        dictionary.peek(
            &filename,
            TokenRange::new(0, filename.len()),
            &mut elements,
            &mut ranges,
        );
        assert_eq!(elements.get(ElementCategory::ReleaseGroup), "Thora");
        assert_eq!(ranges, vec![TokenRange::new(7, 5)]);

        let filename = chars("Thorax");
        let mut elements = Elements::new();
        let mut ranges = Vec::new();
        dictionary.peek(&filename, TokenRange::new(0, 6), &mut elements, &mut ranges);
        assert!(elements.is_empty());
        assert!(ranges.is_empty());
    }

    #[test]
    fn test_substring_phrase_matches_inside_words() {
        let dictionary = KeywordDictionary::new();
        let filename = chars("x1080px");
        let mut elements = Elements::new();
        let mut ranges = Vec::new();
        dictionary.peek(
            &filename,
            TokenRange::new(0, filename.len()),
            &mut elements,
            &mut ranges,
        );
        assert_eq!(elements.get(ElementCategory::VideoResolution), "1080p");
        assert_eq!(ranges, vec![TokenRange::new(1, 5)]);
    }

    #[test]
    fn test_shared_is_single_instance() {
        let a = KeywordDictionary::shared();
        let b = KeywordDictionary::shared();
        assert!(std::ptr::eq(a, b));
        assert!(a.find(ElementCategory::ReleaseGroup, "thora"));
    }
}
