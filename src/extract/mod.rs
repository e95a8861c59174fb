mod flattened;
mod markup;
mod pdf_text;

use anyhow::Result;

use crate::cli::TextStrategy;
use crate::vocabulary::Vocabulary;

pub use flattened::{PatternExtractor, SentinelScanner, TextRecordExtractor};
pub use markup::MarkupExtractor;
pub use pdf_text::read_pdf_text;

pub fn text_extractor(
    strategy: TextStrategy,
    vocabulary: Vocabulary,
) -> Result<Box<dyn TextRecordExtractor>> {
    Ok(match strategy {
        TextStrategy::Pattern => Box::new(PatternExtractor::new(vocabulary)?),
        TextStrategy::Scan => Box::new(SentinelScanner::new(vocabulary)?),
    })
}
