use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;

/// Pixel dimensions of one embedded raster image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Read-only capability the signal extractor needs from one document page.
/// Keeps the scoring code independent of the PDF library.
pub trait PageContent {
    /// Extracted text; empty when the page's text is unreadable.
    fn text(&self) -> String;
    /// Media-box width and height in points (72 per inch).
    fn size_points(&self) -> (f64, f64);
    /// Every embedded raster image reachable from the page's resources,
    /// including images nested inside Form XObjects.
    fn images(&self) -> Vec<ImageInfo>;
}

/// One page of a loaded lopdf document.
pub struct PdfPage<'a> {
    doc: &'a Document,
    page_id: ObjectId,
    page_number: u32,
}

/// All pages of a document, in page order.
pub fn document_pages(doc: &Document) -> Vec<PdfPage<'_>> {
    doc.get_pages()
        .into_iter()
        .map(|(page_number, page_id)| PdfPage {
            doc,
            page_id,
            page_number,
        })
        .collect()
}

impl PageContent for PdfPage<'_> {
    fn text(&self) -> String {
        match self.doc.extract_text(&[self.page_number]) {
            Ok(text) => text,
            Err(e) => {
                log::debug!("text extraction failed on page {}: {e}", self.page_number);
                String::new()
            }
        }
    }

    fn size_points(&self) -> (f64, f64) {
        media_box(self.doc, self.page_id).unwrap_or((0.0, 0.0))
    }

    fn images(&self) -> Vec<ImageInfo> {
        let mut out = Vec::new();
        let mut visited: HashSet<ObjectId> = HashSet::new();
        let (direct, inherited) = self
            .doc
            .get_page_resources(self.page_id)
            .unwrap_or((None, Vec::new()));
        if let Some(res) = direct {
            walk_resources(self.doc, res, &mut visited, &mut out, 0);
        }
        for id in inherited {
            if let Ok(res) = self.doc.get_object(id).and_then(Object::as_dict) {
                walk_resources(self.doc, res, &mut visited, &mut out, 0);
            }
        }
        out
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Media box of a page, following the Parent chain for inherited boxes.
fn media_box(doc: &Document, page_id: ObjectId) -> Option<(f64, f64)> {
    let mut dict = doc.get_object(page_id).ok()?.as_dict().ok()?;
    for _ in 0..32 {
        if let Ok(obj) = dict.get(b"MediaBox") {
            let arr = resolve(doc, obj).as_array().ok()?;
            let nums: Vec<f64> = arr.iter().map(|o| number(resolve(doc, o))).collect::<Option<_>>()?;
            if nums.len() != 4 {
                return None;
            }
            return Some(((nums[2] - nums[0]).abs(), (nums[3] - nums[1]).abs()));
        }
        let parent = dict.get(b"Parent").ok()?;
        dict = resolve(doc, parent).as_dict().ok()?;
    }
    None
}

const MAX_RESOURCE_DEPTH: usize = 16;

/// Walk one resource dictionary's XObjects. Image entries are recorded; Form
/// XObjects are recursed into for their own nested resources. Malformed
/// entries are skipped so one corrupt object cannot sink the page.
fn walk_resources(
    doc: &Document,
    resources: &Dictionary,
    visited: &mut HashSet<ObjectId>,
    out: &mut Vec<ImageInfo>,
    depth: usize,
) {
    if depth > MAX_RESOURCE_DEPTH {
        log::warn!("resource nesting deeper than {MAX_RESOURCE_DEPTH}, stopping walk");
        return;
    }
    let xobjects = match resources.get(b"XObject").map(|o| resolve(doc, o)) {
        Ok(obj) => match obj.as_dict() {
            Ok(dict) => dict,
            Err(_) => return,
        },
        Err(_) => return,
    };

    for (_name, entry) in xobjects.iter() {
        if let Object::Reference(id) = entry {
            // Reference cycles exist in the wild; visit each object once.
            if !visited.insert(*id) {
                continue;
            }
        }
        let dict = match resolve(doc, entry) {
            Object::Stream(stream) => &stream.dict,
            Object::Dictionary(dict) => dict,
            _ => continue,
        };
        let subtype = dict
            .get(b"Subtype")
            .ok()
            .and_then(|s| resolve(doc, s).as_name().ok());
        match subtype {
            Some(name) if name == b"Image" => {
                let width = dimension(doc, dict, b"Width");
                let height = dimension(doc, dict, b"Height");
                out.push(ImageInfo { width, height });
            }
            Some(name) if name == b"Form" => {
                if let Ok(nested) = dict.get(b"Resources").map(|o| resolve(doc, o)) {
                    if let Ok(nested) = nested.as_dict() {
                        walk_resources(doc, nested, visited, out, depth + 1);
                    }
                }
            }
            _ => {}
        }
    }
}

fn dimension(doc: &Document, dict: &Dictionary, key: &[u8]) -> u32 {
    dict.get(key)
        .ok()
        .and_then(|o| resolve(doc, o).as_i64().ok())
        .map(|v| v.clamp(0, i64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}
