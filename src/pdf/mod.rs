pub mod density;
pub mod job;
pub mod page;
pub mod signals;
pub mod suggest;

pub use density::{page_text_stats, percentile, suggest_excludes_hybrid, HybridParams, PageTextStats};
pub use job::{JobArtifact, PageRef};
pub use page::{document_pages, ImageInfo, PageContent, PdfPage};
pub use signals::{page_signals, PageSignals, DEFAULT_DOMINANT_PIXELS};
pub use suggest::{suggest_excludes, SuggestConfig};
