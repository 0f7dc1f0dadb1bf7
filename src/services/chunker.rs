//! Sliding-window text chunking with exact overlap.

use std::path::Path;

use crate::models::{ChunkMetadata, DocumentChunk, ExtractedDocument, IndexingConfig};

/// Splits extracted documents into bounded, overlapping chunks.
///
/// Every chunk is at most `chunk_size` characters long and consecutive
/// chunks from the same document share exactly `chunk_overlap` trailing /
/// leading characters. Chunk boundaries prefer a paragraph break, then a
/// sentence end, then plain whitespace, and fall back to a hard cut, so
/// mid-word splits only happen in unbroken runs of text. Splitting is
/// deterministic.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a chunker from indexing configuration.
    ///
    /// Callers must ensure `chunk_overlap < chunk_size`; `Config::from_env`
    /// rejects anything else.
    pub fn new(config: &IndexingConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            overlap: config.chunk_overlap,
        }
    }

    /// Chunk one extracted document, stamping source metadata onto every
    /// produced chunk.
    ///
    /// Extractor-provided metadata is copied verbatim; the originating path
    /// and base filename are injected. Whitespace-only input produces no
    /// chunks.
    pub fn chunk(&self, document: &ExtractedDocument, path: &Path) -> Vec<DocumentChunk> {
        if document.text.trim().is_empty() {
            return Vec::new();
        }

        let metadata = ChunkMetadata::for_path(path, document.metadata.clone());

        self.split(&document.text)
            .into_iter()
            .map(|text| DocumentChunk::new(text, metadata.clone()))
            .collect()
    }

    /// Split text into overlapping windows.
    fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let mut chunks = Vec::new();

        if total == 0 {
            return chunks;
        }

        let mut start = 0;
        loop {
            let target_end = (start + self.chunk_size).min(total);
            let end = self.find_break_point(&chars, start, target_end, total);

            let chunk: String = chars[start..end].iter().collect();
            if !chunk.trim().is_empty() {
                chunks.push(chunk);
            }

            if end >= total {
                break;
            }

            // Next window starts exactly `overlap` before this chunk's end,
            // which is what makes the shared boundary content exactly
            // `overlap` characters long.
            start = end - self.overlap;
        }

        chunks
    }

    /// Find a natural break near the target end position.
    ///
    /// Searches the trailing 20% of the window. A break that would land
    /// inside the overlap region is rejected, otherwise the window could
    /// stop making forward progress.
    fn find_break_point(&self, chars: &[char], start: usize, target_end: usize, total: usize) -> usize {
        if target_end >= total {
            return total;
        }

        let search_start = target_end.saturating_sub(self.chunk_size / 5);
        let search_range = &chars[search_start..target_end];

        let mut paragraph = None;
        let mut sentence = None;
        let mut space = None;

        for (i, c) in search_range.iter().enumerate() {
            let pos = search_start + i;
            match c {
                '\n' => {
                    if i > 0 && search_range.get(i - 1) == Some(&'\n') {
                        paragraph = Some(pos + 1);
                    }
                    space = Some(pos + 1);
                }
                '.' | '!' | '?' => {
                    if search_range.get(i + 1).is_some_and(|c| c.is_whitespace()) {
                        sentence = Some(pos + 1);
                    }
                }
                ' ' | '\t' => {
                    space = Some(pos + 1);
                }
                _ => {}
            }
        }

        let chosen = paragraph.or(sentence).or(space).unwrap_or(target_end);
        if chosen <= start + self.overlap {
            target_end
        } else {
            chosen
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn chunker(size: usize, overlap: usize) -> TextChunker {
        TextChunker {
            chunk_size: size,
            overlap,
        }
    }

    fn doc(text: &str) -> ExtractedDocument {
        ExtractedDocument {
            text: text.to_string(),
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn test_small_document_single_chunk() {
        let chunks = chunker(1000, 200).chunk(&doc("Paris is the capital of France."), Path::new("/tmp/facts.txt"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Paris is the capital of France.");
        assert_eq!(chunks[0].metadata.filename, "facts.txt");
    }

    #[test]
    fn test_empty_and_whitespace_documents() {
        let c = chunker(100, 20);
        assert!(c.chunk(&doc(""), Path::new("a.txt")).is_empty());
        assert!(c.chunk(&doc("   \n\n \t "), Path::new("a.txt")).is_empty());
    }

    #[test]
    fn test_chunk_length_bounded() {
        let c = chunker(50, 10);
        let text = "word ".repeat(200);
        for chunk in c.split(&text) {
            assert!(chunk.chars().count() <= 50);
        }
    }

    #[test]
    fn test_exact_overlap_on_unbroken_text() {
        // No whitespace anywhere, so every boundary is a hard cut and the
        // overlap must be exactly 10 characters.
        let c = chunker(50, 10);
        let text: String = ('a'..='z').cycle().take(500).collect();
        let chunks = c.split(&text);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let next: Vec<char> = pair[1].chars().collect();
            let tail: String = prev[prev.len() - 10..].iter().collect();
            let head: String = next[..10].iter().collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_exact_overlap_with_natural_breaks() {
        let c = chunker(80, 15);
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(30);
        let chunks = c.split(&text);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let next: Vec<char> = pair[1].chars().collect();
            let tail: String = prev[prev.len() - 15..].iter().collect();
            let head: String = next[..15].iter().collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_prefers_paragraph_break() {
        let c = chunker(100, 10);
        let mut text = "a".repeat(85);
        text.push_str("\n\n");
        text.push_str(&"b".repeat(100));
        let chunks = c.split(&text);
        assert!(chunks[0].ends_with("\n\n"));
    }

    #[test]
    fn test_prefers_sentence_break_over_space() {
        let c = chunker(100, 10);
        // A sentence end and a later space both fall in the search window;
        // the sentence end wins even though it comes earlier.
        let text = format!("{}. some more words {}", "a".repeat(88), "b".repeat(60));
        let chunks = c.split(&text);
        assert!(chunks[0].ends_with('.'));
    }

    #[test]
    fn test_metadata_copied_to_every_chunk() {
        let c = chunker(50, 10);
        let mut metadata = BTreeMap::new();
        metadata.insert("page".to_string(), "7".to_string());
        let document = ExtractedDocument {
            text: "sentence one here. ".repeat(20),
            metadata,
        };
        let chunks = c.chunk(&document, Path::new("/data/report.pdf"));
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert_eq!(chunk.metadata.filename, "report.pdf");
            assert_eq!(chunk.metadata.source_path, "/data/report.pdf");
            assert_eq!(chunk.metadata.extra.get("page").map(String::as_str), Some("7"));
        }
    }

    #[test]
    fn test_deterministic() {
        let c = chunker(64, 16);
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(25);
        assert_eq!(c.split(&text), c.split(&text));
    }
}
