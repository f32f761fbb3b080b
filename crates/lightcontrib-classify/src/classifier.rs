//! Name-based light classification
//!
//! A light's classification key is the first keyword found in its name
//! (leftmost match, earlier keywords winning ties), lowercased. Names with no
//! keyword keep their own name as the key.

use crate::store::KeywordStore;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use thiserror::Error;

/// Classifier construction errors
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Keyword pattern too large: {0}")]
    Pattern(#[from] regex::Error),
}

/// Matches light names against the keyword list
#[derive(Debug, Clone)]
pub struct Classifier {
    pattern: Option<Regex>,
    keywords: Vec<String>,
}

impl Classifier {
    /// Build one combined case-insensitive pattern from the keywords.
    ///
    /// Keywords are matched literally. Empty segments are skipped since they
    /// would match every name.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self, ClassifyError> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let pattern = if keywords.is_empty() {
            None
        } else {
            let alternation = keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            Some(
                RegexBuilder::new(&alternation)
                    .case_insensitive(true)
                    .build()?,
            )
        };

        Ok(Self { pattern, keywords })
    }

    /// Build from the store's current keywords
    pub fn from_store(store: &KeywordStore) -> Result<Self, ClassifyError> {
        Self::new(store.keywords())
    }

    /// Keywords in use, in priority order
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Classification key for a light name
    pub fn classify(&self, name: &str) -> String {
        self.pattern
            .as_ref()
            .and_then(|p| p.find(name))
            .map(|m| m.as_str().to_lowercase())
            .unwrap_or_else(|| name.to_string())
    }

    /// Bucket items by classification key, preserving discovery order
    pub fn group<T, I>(&self, items: I) -> LightGroups<T>
    where
        T: AsRef<str>,
        I: IntoIterator<Item = T>,
    {
        let mut groups = LightGroups::new();
        for item in items {
            let key = self.classify(item.as_ref());
            groups.push(key, item);
        }
        groups
    }

    /// Canonical name of a group, derived from its last member
    pub fn group_name<T: AsRef<str>>(&self, members: &[T]) -> Option<String> {
        members.last().map(|m| self.classify(m.as_ref()))
    }
}

/// Classification key to member lights, in first-seen key order
#[derive(Debug, Clone, PartialEq)]
pub struct LightGroups<T> {
    groups: Vec<(String, Vec<T>)>,
    index: HashMap<String, usize>,
}

impl<T> LightGroups<T> {
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Append an item to the bucket for `key`, creating the bucket on first use
    pub fn push(&mut self, key: String, item: T) {
        match self.index.get(&key) {
            Some(&i) => self.groups[i].1.push(item),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![item]));
            }
        }
    }

    /// Members of a group
    pub fn get(&self, key: &str) -> Option<&[T]> {
        self.index.get(key).map(|&i| self.groups[i].1.as_slice())
    }

    /// Keys in first-seen order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of grouped items
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|(_, v)| v.len()).sum()
    }
}

impl<T> Default for LightGroups<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntoIterator for LightGroups<T> {
    type Item = (String, Vec<T>);
    type IntoIter = std::vec::IntoIter<(String, Vec<T>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DEFAULT_KEYWORDS;
    use lightcontrib_core::{LightInstance, LightKind};

    fn default_classifier() -> Classifier {
        Classifier::new(&DEFAULT_KEYWORDS).unwrap()
    }

    #[test]
    fn test_classify_match_and_miss() {
        let classifier = default_classifier();

        assert_eq!(classifier.classify("key_light01"), "key");
        assert_eq!(classifier.classify("RIM_light02"), "rim");
        assert_eq!(classifier.classify("mystery01"), "mystery01");
    }

    #[test]
    fn test_leftmost_match_wins() {
        let classifier = default_classifier();
        // "rim" starts before "key"
        assert_eq!(classifier.classify("rim_key_light"), "rim");
    }

    #[test]
    fn test_earlier_keyword_wins_at_same_position() {
        let classifier = Classifier::new(&["back", "background"]).unwrap();
        assert_eq!(classifier.classify("backgroundFill"), "back");

        let classifier = Classifier::new(&["background", "back"]).unwrap();
        assert_eq!(classifier.classify("backgroundFill"), "background");
    }

    #[test]
    fn test_keywords_are_literal() {
        let classifier = Classifier::new(&["a.b"]).unwrap();
        assert_eq!(classifier.classify("axb"), "axb");
        assert_eq!(classifier.classify("light_A.B"), "a.b");
    }

    #[test]
    fn test_empty_segments_ignored() {
        let classifier = Classifier::new(&["key", ""]).unwrap();
        assert_eq!(classifier.keywords(), ["key"]);
        assert_eq!(classifier.classify("fill01"), "fill01");

        let classifier = Classifier::new::<&str>(&[]).unwrap();
        assert_eq!(classifier.classify("key01"), "key01");
    }

    #[test]
    fn test_classify_returns_substring_or_name() {
        let classifier = default_classifier();
        for name in ["KEYlight", "bgWALL", "x", "", "kickKey", "Bounce_Bounce"] {
            let key = classifier.classify(name);
            assert!(
                key == name || name.to_lowercase().contains(&key),
                "{} -> {}",
                name,
                key
            );
            assert_eq!(key, classifier.classify(name));
        }
    }

    #[test]
    fn test_group_scenario() {
        let classifier = default_classifier();
        let groups = classifier.group(["key_light01", "RIM_light02", "mystery01"]);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups.get("key"), Some(&["key_light01"][..]));
        assert_eq!(groups.get("rim"), Some(&["RIM_light02"][..]));
        assert_eq!(groups.get("mystery01"), Some(&["mystery01"][..]));
    }

    #[test]
    fn test_group_partitions_in_order() {
        let classifier = default_classifier();
        let lights = vec![
            LightInstance::new("keyA", "keyA_t", LightKind::Standard),
            LightInstance::new("rimA", "rimA_t", LightKind::Standard),
            LightInstance::new("keyB", "keyB_t", LightKind::Standard),
            LightInstance::new("fill", "fill_t", LightKind::Standard),
        ];
        let groups = classifier.group(lights.iter().cloned());

        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["key", "rim", "fill"]);
        assert_eq!(groups.member_count(), lights.len());

        let key_members: Vec<_> = groups
            .get("key")
            .unwrap()
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(key_members, vec!["keyA", "keyB"]);

        for light in &lights {
            let holding = groups
                .iter()
                .filter(|(_, members)| members.contains(light))
                .count();
            assert_eq!(holding, 1);
        }
    }

    #[test]
    fn test_group_name_from_last_member() {
        let classifier = default_classifier();
        assert_eq!(
            classifier.group_name(&["Key_main", "KEY_fill"]),
            Some("key".to_string())
        );
        assert_eq!(classifier.group_name::<&str>(&[]), None);
    }
}
