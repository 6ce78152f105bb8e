//! Boundary-preferring text splitter with character overlap.
//!
//! Splits long source text into windows of at most `chunk_size` characters,
//! where consecutive windows share up to `chunk_overlap` characters. Cuts
//! prefer semantic boundaries in priority order — paragraph (`\n\n`), line
//! (`\n`), sentence (`. `), word (` `) — and fall back to a raw character
//! cut only when no higher-priority boundary fits the budget.
//!
//! The transform is a pure, deterministic windowing pass: concatenating each
//! chunk minus its recorded overlap prefix reconstructs the input exactly.

/// Boundary separators in priority order. Separators are kept attached to
/// the fragment that precedes them so no characters are lost.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// One window of source text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    /// The window content, including the overlap prefix.
    pub text: String,
    /// Number of leading characters duplicated from the previous chunk's tail.
    /// Always 0 for the first chunk and never more than the configured overlap.
    pub overlap: usize,
}

impl TextChunk {
    /// The non-overlapping portion of this chunk.
    pub fn core(&self) -> &str {
        match self.text.char_indices().nth(self.overlap) {
            Some((idx, _)) => &self.text[idx..],
            None => "",
        }
    }
}

/// Split `text` into overlapping chunks of at most `chunk_size` characters.
///
/// `chunk_overlap` must be smaller than `chunk_size` (validated at config
/// load). Empty input produces no chunks.
pub fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<TextChunk> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut fragments = Vec::new();
    split_fragments(text, &SEPARATORS, chunk_size, &mut fragments);

    let mut chunks: Vec<TextChunk> = Vec::new();
    let mut prefix = String::new();
    let mut cur_overlap = 0usize;
    let mut core = String::new();
    let mut core_chars = 0usize;

    for frag in fragments {
        let frag_chars = char_len(frag);

        if !core.is_empty() && cur_overlap + core_chars + frag_chars > chunk_size {
            let flushed = format!("{prefix}{core}");
            // Cap the carried suffix so it still leaves room for the
            // incoming fragment within the size budget.
            let budget = chunk_overlap.min(chunk_size.saturating_sub(frag_chars));
            let next_prefix = tail_chars(&flushed, budget);
            chunks.push(TextChunk {
                text: flushed,
                overlap: cur_overlap,
            });
            cur_overlap = char_len(&next_prefix);
            prefix = next_prefix;
            core.clear();
            core_chars = 0;
        }

        core.push_str(frag);
        core_chars += frag_chars;
    }

    if !core.is_empty() {
        chunks.push(TextChunk {
            text: format!("{prefix}{core}"),
            overlap: cur_overlap,
        });
    }

    chunks
}

/// Recursively split `text` into fragments of at most `max_chars` characters,
/// trying each separator in priority order. Fragments concatenate back to
/// `text` exactly.
fn split_fragments<'a>(
    text: &'a str,
    separators: &[&str],
    max_chars: usize,
    out: &mut Vec<&'a str>,
) {
    if char_len(text) <= max_chars {
        if !text.is_empty() {
            out.push(text);
        }
        return;
    }

    match separators.split_first() {
        Some((sep, rest)) => {
            for piece in text.split_inclusive(*sep) {
                if char_len(piece) <= max_chars {
                    out.push(piece);
                } else {
                    split_fragments(piece, rest, max_chars, out);
                }
            }
        }
        None => hard_split(text, max_chars, out),
    }
}

/// Raw character cut for text with no usable boundary.
fn hard_split<'a>(text: &'a str, max_chars: usize, out: &mut Vec<&'a str>) {
    let mut rest = text;
    while char_len(rest) > max_chars {
        let cut = rest
            .char_indices()
            .nth(max_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        out.push(&rest[..cut]);
        rest = &rest[cut..];
    }
    if !rest.is_empty() {
        out.push(rest);
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The last `n` characters of `s`.
fn tail_chars(s: &str, n: usize) -> String {
    let len = char_len(s);
    s.chars().skip(len.saturating_sub(n)).collect()
}
