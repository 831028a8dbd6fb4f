use serde::{Deserialize, Serialize};

/// The kind of metadata an element carries.
///
/// Keyword categories are a subset of these; `Unknown` is the sentinel a
/// dictionary lookup uses to mean "any category".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementCategory {
    AnimeSeason,
    AnimeSeasonPrefix,
    AnimeTitle,
    AnimeType,
    AnimeYear,
    AudioTerm,
    DeviceCompatibility,
    EpisodeNumber,
    EpisodeNumberAlt,
    EpisodePrefix,
    EpisodeTitle,
    FileChecksum,
    FileExtension,
    FileName,
    Language,
    Other,
    ReleaseGroup,
    ReleaseInformation,
    ReleaseVersion,
    Source,
    Subtitles,
    VideoResolution,
    VideoTerm,
    VolumeNumber,
    VolumePrefix,
    Unknown,
}

/// A single extracted fact about a filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub category: ElementCategory,
    /// Never empty; see [`Elements::insert`].
    pub value: String,
}

/// Ordered collection of parsed elements.
///
/// Duplicates per category are allowed and insertion order is preserved.
/// Filled partially by the tokenizer's pre-identification and later by
/// element extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Elements {
    elements: Vec<Element>,
}

impl Elements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value. Empty values are dropped.
    pub fn insert(&mut self, category: ElementCategory, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        self.elements.push(Element { category, value });
    }

    /// First value of `category`, or `""` when there is none.
    pub fn get(&self, category: ElementCategory) -> &str {
        self.find(category).map_or("", |e| e.value.as_str())
    }

    /// Every value of `category`, in insertion order.
    pub fn get_all(&self, category: ElementCategory) -> Vec<&str> {
        self.elements
            .iter()
            .filter(|e| e.category == category)
            .map(|e| e.value.as_str())
            .collect()
    }

    /// Remove every element of `category`.
    pub fn erase(&mut self, category: ElementCategory) {
        self.elements.retain(|e| e.category != category);
    }

    /// Remove the element at `position`, returning it.
    pub fn remove_at(&mut self, position: usize) -> Option<Element> {
        (position < self.elements.len()).then(|| self.elements.remove(position))
    }

    pub fn count(&self, category: ElementCategory) -> usize {
        self.elements.iter().filter(|e| e.category == category).count()
    }

    /// True when no element of `category` is present.
    pub fn empty(&self, category: ElementCategory) -> bool {
        self.find(category).is_none()
    }

    pub fn find(&self, category: ElementCategory) -> Option<&Element> {
        self.elements.iter().find(|e| e.category == category)
    }

    pub fn get_at(&self, position: usize) -> Option<&Element> {
        self.elements.get(position)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }
}

impl std::ops::Index<usize> for Elements {
    type Output = Element;

    fn index(&self, position: usize) -> &Element {
        &self.elements[position]
    }
}

impl<'a> IntoIterator for &'a Elements {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
