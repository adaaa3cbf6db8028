use crate::pdf::density::percentile;
use crate::pdf::signals::{PageSignals, DEFAULT_DOMINANT_PIXELS};
use std::collections::BTreeSet;

/// Tuning knobs for the char-count / image-dominance suggestion.
#[derive(Debug, Clone)]
pub struct SuggestConfig {
    pub abs_min_chars: usize,
    /// Propagated into signal extraction; kept here so one config drives a
    /// whole document job.
    pub dominant_pixels_threshold: u64,
    pub rel_percentile: f64,
    /// The relative layer only considers pages already below this char count.
    /// Without the gate, a 340-char page would get flagged in a document
    /// whose norm is 2000 chars purely for ranking low.
    pub rel_apply_only_if_chars_below: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        SuggestConfig {
            abs_min_chars: 250,
            dominant_pixels_threshold: DEFAULT_DOMINANT_PIXELS,
            rel_percentile: 15.0,
            rel_apply_only_if_chars_below: 350,
        }
    }
}

/// Flag pages to exclude from printing, by char count and image dominance.
///
/// Three flag sets are unioned:
///   - absolute low text: `char_count < abs_min_chars`
///   - image-dominant pages
///   - relative: among gated candidates, char counts at or below the
///     `rel_percentile` cutoff (inclusive)
///
/// Output is a sorted, deduplicated list of 0-based page indices. Purely a
/// suggestion: nothing here touches the document itself.
pub fn suggest_excludes(signals: &[PageSignals], cfg: &SuggestConfig) -> Vec<usize> {
    if signals.is_empty() {
        return Vec::new();
    }

    let mut flagged: BTreeSet<usize> = BTreeSet::new();

    for s in signals {
        if s.char_count < cfg.abs_min_chars {
            flagged.insert(s.page_index);
        }
        if s.image_dominant {
            flagged.insert(s.page_index);
        }
    }

    let candidates: Vec<&PageSignals> = signals
        .iter()
        .filter(|s| s.char_count < cfg.rel_apply_only_if_chars_below)
        .collect();
    if !candidates.is_empty() {
        // Char count, not density: density proved misleading in practice.
        let values: Vec<f64> = candidates.iter().map(|s| s.char_count as f64).collect();
        let cutoff = percentile(&values, cfg.rel_percentile);
        for s in &candidates {
            if s.char_count as f64 <= cutoff {
                flagged.insert(s.page_index);
            }
        }
    }

    flagged.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(page_index: usize, char_count: usize, image_dominant: bool) -> PageSignals {
        PageSignals {
            page_index,
            char_count,
            area_sq_in: 93.5,
            image_count: usize::from(image_dominant),
            largest_image_pixels: if image_dominant { 2_000_000 } else { 0 },
            total_image_pixels: if image_dominant { 2_000_000 } else { 0 },
            image_dominant,
        }
    }

    #[test]
    fn test_low_char_pages_flagged_absolutely() {
        let signals = vec![
            signal(0, 3000, false),
            signal(1, 40, false),
            signal(2, 0, false),
        ];
        let out = suggest_excludes(&signals, &SuggestConfig::default());
        assert_eq!(out, vec![1, 2]);
    }

    #[test]
    fn test_image_dominant_page_flagged_despite_text() {
        let signals = vec![signal(0, 5000, true), signal(1, 5000, false)];
        let out = suggest_excludes(&signals, &SuggestConfig::default());
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn test_gate_empties_relative_set_for_text_heavy_documents() {
        // Every page is at or above the gate, so the relative layer has no
        // candidates and nothing at all is flagged.
        let signals: Vec<PageSignals> =
            (0..6).map(|i| signal(i, 350 + i * 10, false)).collect();
        let out = suggest_excludes(&signals, &SuggestConfig::default());
        assert!(out.is_empty());
    }

    #[test]
    fn test_relative_layer_only_ranks_within_the_gate() {
        // Pages 3 and 4 are under the gate but over the absolute bar; the
        // relative cutoff picks the lowest of them.
        let signals = vec![
            signal(0, 2000, false),
            signal(1, 2100, false),
            signal(2, 1900, false),
            signal(3, 260, false),
            signal(4, 340, false),
        ];
        let out = suggest_excludes(&signals, &SuggestConfig::default());
        assert_eq!(out, vec![3]);
    }

    #[test]
    fn test_relative_cutoff_is_inclusive() {
        // Candidates with the exact cutoff value are flagged.
        let cfg = SuggestConfig {
            rel_percentile: 0.0,
            ..Default::default()
        };
        let signals = vec![
            signal(0, 300, false),
            signal(1, 300, false),
            signal(2, 340, false),
            signal(3, 9000, false),
        ];
        let out = suggest_excludes(&signals, &cfg);
        assert_eq!(out, vec![0, 1]);
    }

    #[test]
    fn test_union_deduplicates_across_flag_sets() {
        // Page 0 is low-text AND image-dominant; it appears once.
        let signals = vec![signal(0, 10, true), signal(1, 4000, false)];
        let out = suggest_excludes(&signals, &SuggestConfig::default());
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn test_idempotent_over_identical_input() {
        let signals = vec![
            signal(0, 3000, false),
            signal(1, 40, true),
            signal(2, 280, false),
            signal(3, 0, false),
        ];
        let cfg = SuggestConfig::default();
        let first = suggest_excludes(&signals, &cfg);
        let second = suggest_excludes(&signals, &cfg);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_signals_empty_result() {
        assert!(suggest_excludes(&[], &SuggestConfig::default()).is_empty());
    }
}
