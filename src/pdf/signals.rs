use crate::pdf::page::PageContent;
use serde::Serialize;

pub const POINTS_PER_INCH: f64 = 72.0;

/// One big image likely means an ad or full-bleed art: a full-page photo at
/// modest resolution lands around a million pixels.
pub const DEFAULT_DOMINANT_PIXELS: u64 = 1_000_000;

/// Per-page derived snapshot used for exclusion scoring. Computed fresh per
/// document, never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSignals {
    pub page_index: usize,
    pub char_count: usize,
    pub area_sq_in: f64,
    pub image_count: usize,
    pub largest_image_pixels: u64,
    pub total_image_pixels: u64,
    pub image_dominant: bool,
}

/// Count non-whitespace characters. All whitespace runs are removed, not just
/// trimmed, so whitespace-padded pages do not score as dense.
pub fn glyph_count(text: &str) -> usize {
    text.split_whitespace().map(|run| run.chars().count()).sum()
}

/// Physical page area in square inches, floored at zero for degenerate boxes.
pub fn page_area_sq_in(width_pt: f64, height_pt: f64) -> f64 {
    let area = (width_pt / POINTS_PER_INCH) * (height_pt / POINTS_PER_INCH);
    area.max(0.0)
}

/// Compute the full signal snapshot for one page.
pub fn page_signals(
    page: &dyn PageContent,
    page_index: usize,
    dominant_pixels_threshold: u64,
) -> PageSignals {
    let char_count = glyph_count(&page.text());
    let (width_pt, height_pt) = page.size_points();
    let area_sq_in = page_area_sq_in(width_pt, height_pt);

    let mut image_count = 0;
    let mut largest = 0u64;
    let mut total = 0u64;
    for image in page.images() {
        image_count += 1;
        let pixels = image.pixels();
        total += pixels;
        if pixels > largest {
            largest = pixels;
        }
    }

    PageSignals {
        page_index,
        char_count,
        area_sq_in,
        image_count,
        largest_image_pixels: largest,
        total_image_pixels: total,
        image_dominant: largest >= dominant_pixels_threshold,
    }
}
