//! Section registry
//!
//! Records the latest intersection ratio of each section and picks the active
//! one. Within a batch the candidate with the highest ratio wins, ties going to
//! the section listed first; a later batch with any candidate replaces the
//! active section.

use crate::capture::input::IntersectionEntry;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRegistry {
    ids: Vec<String>,
    ratios: Vec<f64>,
    active: Option<usize>,
    #[serde(skip)]
    active_threshold: f64,
}

impl SectionRegistry {
    /// The first section starts out active.
    pub fn new(ids: Vec<String>, active_threshold: f64) -> Self {
        let ratios = vec![0.0; ids.len()];
        let active = if ids.is_empty() { None } else { Some(0) };
        Self {
            ids,
            ratios,
            active,
            active_threshold,
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|s| s == id)
    }

    pub fn active(&self) -> Option<&str> {
        self.active.map(|i| self.ids[i].as_str())
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Last reported ratio, zero for sections never reported or unknown
    pub fn visibility(&self, id: &str) -> f64 {
        self.index_of(id).map(|i| self.ratios[i]).unwrap_or(0.0)
    }

    /// Ratios in section order
    pub fn visibilities(&self) -> impl Iterator<Item = (&str, f64)> {
        self.ids
            .iter()
            .map(String::as_str)
            .zip(self.ratios.iter().copied())
    }

    /// Record a batch of entries. Returns the new active id when it changed.
    pub fn apply_batch(&mut self, entries: &[IntersectionEntry]) -> Option<&str> {
        let mut winner: Option<(usize, f64)> = None;

        for entry in entries {
            let Some(index) = self.index_of(&entry.id) else {
                tracing::trace!("Ignoring intersection for unknown section {}", entry.id);
                continue;
            };
            let ratio = entry.ratio.clamp(0.0, 1.0);
            self.ratios[index] = ratio;

            if !(entry.is_intersecting && ratio > self.active_threshold) {
                continue;
            }
            winner = match winner {
                Some((best, best_ratio))
                    if best_ratio > ratio || (best_ratio == ratio && best < index) =>
                {
                    Some((best, best_ratio))
                }
                _ => Some((index, ratio)),
            };
        }

        let (index, _) = winner?;
        if self.active == Some(index) {
            return None;
        }
        self.active = Some(index);
        Some(self.ids[index].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SectionRegistry {
        SectionRegistry::new(vec!["a".into(), "b".into(), "c".into()], 0.2)
    }

    fn entry(id: &str, ratio: f64, is_intersecting: bool) -> IntersectionEntry {
        IntersectionEntry {
            id: id.to_string(),
            ratio,
            is_intersecting,
        }
    }

    #[test]
    fn test_first_section_starts_active() {
        assert_eq!(registry().active(), Some("a"));
        assert_eq!(SectionRegistry::new(vec![], 0.2).active(), None);
    }

    #[test]
    fn test_section_crossing_threshold_becomes_active() {
        let mut registry = registry();
        assert_eq!(registry.apply_batch(&[entry("b", 0.35, true)]), Some("b"));
        assert_eq!(registry.active(), Some("b"));
        assert_eq!(registry.visibility("b"), 0.35);
    }

    #[test]
    fn test_ratio_at_threshold_is_not_enough() {
        let mut registry = registry();
        assert_eq!(registry.apply_batch(&[entry("c", 0.2, true)]), None);
        assert_eq!(registry.active(), Some("a"));
        assert_eq!(registry.visibility("c"), 0.2);
    }

    #[test]
    fn test_not_intersecting_is_recorded_but_never_active() {
        let mut registry = registry();
        registry.apply_batch(&[entry("c", 0.9, false)]);
        assert_eq!(registry.active(), Some("a"));
        assert_eq!(registry.visibility("c"), 0.9);
    }

    #[test]
    fn test_highest_ratio_wins_within_batch() {
        let mut registry = registry();
        registry.apply_batch(&[entry("b", 0.25, true), entry("c", 0.5, true)]);
        assert_eq!(registry.active(), Some("c"));

        // Same batch in reverse arrival order picks the same section
        let mut registry = self::registry();
        registry.apply_batch(&[entry("c", 0.5, true), entry("b", 0.25, true)]);
        assert_eq!(registry.active(), Some("c"));
    }

    #[test]
    fn test_equal_ratios_prefer_earlier_section() {
        let mut registry = registry();
        registry.apply_batch(&[entry("c", 0.4, true), entry("b", 0.4, true)]);
        assert_eq!(registry.active(), Some("b"));
    }

    #[test]
    fn test_later_batch_overwrites() {
        let mut registry = registry();
        registry.apply_batch(&[entry("c", 0.9, true)]);
        registry.apply_batch(&[entry("b", 0.3, true)]);
        assert_eq!(registry.active(), Some("b"));
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let mut registry = registry();
        assert_eq!(registry.apply_batch(&[entry("zzz", 1.0, true)]), None);
        assert_eq!(registry.visibility("zzz"), 0.0);
        assert_eq!(registry.active(), Some("a"));
    }

    #[test]
    fn test_unchanged_active_reports_none() {
        let mut registry = registry();
        registry.apply_batch(&[entry("b", 0.3, true)]);
        assert_eq!(registry.apply_batch(&[entry("b", 0.6, true)]), None);
        assert_eq!(registry.visibility("b"), 0.6);
    }
}
