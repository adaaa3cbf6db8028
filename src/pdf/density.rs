use crate::pdf::page::PageContent;
use crate::pdf::signals::{glyph_count, page_area_sq_in};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::collections::HashMap;

/// Text-density snapshot of one page: chars per square inch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageTextStats {
    pub page_index: usize,
    pub char_count: usize,
    pub area_sq_in: f64,
    pub density: f64,
}

pub fn page_text_stats(page: &dyn PageContent, page_index: usize) -> PageTextStats {
    let char_count = glyph_count(&page.text());
    let (width_pt, height_pt) = page.size_points();
    let area_sq_in = page_area_sq_in(width_pt, height_pt);
    let density = if area_sq_in > 0.0 {
        char_count as f64 / area_sq_in
    } else {
        0.0
    };
    PageTextStats {
        page_index,
        char_count,
        area_sq_in,
        density,
    }
}

/// Deterministic percentile with linear interpolation between sorted order
/// statistics. `p` is 0..100; an empty input returns 0.0 rather than erroring
/// since callers already special-case empty candidate sets.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut xs = values.to_vec();
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    if p <= 0.0 {
        return xs[0];
    }
    if p >= 100.0 {
        return xs[xs.len() - 1];
    }
    let n = xs.len();
    // Fractional rank in [0, n-1].
    let r = (p / 100.0) * (n - 1) as f64;
    let lo = r.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = r - lo as f64;
    xs[lo] * (1.0 - frac) + xs[hi] * frac
}

#[derive(Debug, Clone)]
pub struct HybridParams {
    pub abs_min_chars: usize,
    pub abs_min_density: f64,
    pub rel_percentile: f64,
    pub max_suggestions: Option<usize>,
}

impl Default for HybridParams {
    fn default() -> Self {
        HybridParams {
            abs_min_chars: 250,
            abs_min_density: 25.0,
            rel_percentile: 20.0,
            max_suggestions: None,
        }
    }
}

/// Hybrid density rule:
///   1. Absolute: flag if `char_count < abs_min_chars` OR
///      `density < abs_min_density`.
///   2. Relative: also flag the bottom `rel_percentile` of the document by
///      density (cutoff is inclusive), catching ad-heavy pages that still
///      carry some text.
///
/// Returns 0-based page indices, sorted and deduplicated. With
/// `max_suggestions`, only the lowest-density flagged pages survive the cap.
pub fn suggest_excludes_hybrid(stats: &[PageTextStats], params: &HybridParams) -> Vec<usize> {
    if stats.is_empty() {
        return Vec::new();
    }

    let densities: Vec<f64> = stats.iter().map(|s| s.density).collect();
    let cutoff = percentile(&densities, params.rel_percentile);

    let mut flagged: BTreeSet<usize> = BTreeSet::new();
    for s in stats {
        let absolute = s.char_count < params.abs_min_chars || s.density < params.abs_min_density;
        let relative = s.density <= cutoff;
        if absolute || relative {
            flagged.insert(s.page_index);
        }
    }

    let flagged: Vec<usize> = flagged.into_iter().collect();

    if let Some(cap) = params.max_suggestions {
        let density_of: HashMap<usize, f64> =
            stats.iter().map(|s| (s.page_index, s.density)).collect();
        let mut by_density = flagged;
        // Stable sort keeps index order among equal densities.
        by_density.sort_by(|a, b| {
            let da = density_of.get(a).copied().unwrap_or(0.0);
            let db = density_of.get(b).copied().unwrap_or(0.0);
            da.partial_cmp(&db).unwrap_or(Ordering::Equal)
        });
        by_density.truncate(cap);
        return by_density;
    }

    flagged
}
