//! Folds streaming `delta`/`done` event sequences from a recognizer or
//! translator into exactly one finalized line per utterance.
//!
//! Streaming providers resend overlapping and sometimes fully-duplicated
//! fragments of the line they are building. [`TextBuffer`] is the
//! deterministic merge/suppress fold that turns that stream into a single
//! printed line, used identically for the source transcript and the
//! translated line.

/// Per-stream state: one instance per utterance per language direction.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    buffer: String,
    last_chunk: Option<String>,
    last_line: Option<String>,
    printed: bool,
    done: bool,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current accumulated (not yet finalized) text.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_printed(&self) -> bool {
        self.printed
    }

    /// Fold a delta chunk into the buffer. Returns `true` if the buffer
    /// changed (i.e. the chunk carried new text).
    pub fn append(&mut self, chunk: &str) -> bool {
        if chunk.is_empty() || self.last_chunk.as_deref() == Some(chunk) {
            return false;
        }
        self.last_chunk = Some(chunk.to_string());

        let new_buffer = merge(&self.buffer, chunk);
        if new_buffer != self.buffer {
            self.printed = false;
            self.buffer = new_buffer;
            true
        } else {
            false
        }
    }

    /// Mark the stream as done. Call [`finalize`](Self::finalize) next (or
    /// let the caller drive both from one event).
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Triggered on a `done` event or stream close. Returns `Some(line)`
    /// exactly once per utterance: when the buffer holds unprinted text
    /// that is not identical to, nor a prefix/suffix of, the previously
    /// emitted line.
    pub fn finalize(&mut self) -> Option<String> {
        let line = self.buffer.trim();
        let emit = !self.printed && !line.is_empty() && !is_suppressed(line, self.last_line.as_deref());

        let result = if emit {
            let line = line.to_string();
            self.last_line = Some(line.clone());
            Some(line)
        } else {
            None
        };

        self.buffer.clear();
        self.printed = true;
        self.done = false;
        result
    }

    /// Convenience: feed a chunk and, if `is_done`, finalize in one call.
    pub fn feed(&mut self, chunk: &str, is_done: bool) -> Option<String> {
        self.append(chunk);
        if is_done {
            self.mark_done();
            self.finalize()
        } else {
            None
        }
    }
}

fn is_suppressed(candidate: &str, last_line: Option<&str>) -> bool {
    match last_line {
        None => false,
        Some(last) => candidate == last || last.starts_with(candidate) || last.ends_with(candidate),
    }
}

/// `merge(buffer, chunk)` per the assembler's append rule:
/// 1. an empty chunk leaves the buffer untouched;
/// 2. a chunk that is already a substring of the buffer is a repeat, ignored;
/// 3. otherwise the longest suffix of `buffer` that equals a prefix of
///    `chunk` is joined (greedy overlap merge);
/// 4. otherwise the chunk is appended verbatim.
///
/// The overlap search walks characters, not bytes: `buffer`/`chunk` slicing
/// on raw byte offsets can land inside a multibyte UTF-8 codepoint and panic
/// for non-Latin scripts.
fn merge(buffer: &str, chunk: &str) -> String {
    let s = chunk.trim();
    if s.is_empty() {
        return buffer.to_string();
    }
    if buffer.contains(s) {
        return buffer.to_string();
    }

    let buffer_chars: Vec<char> = buffer.chars().collect();
    let s_chars: Vec<char> = s.chars().collect();
    let max_overlap = buffer_chars.len().min(s_chars.len());
    for k in (1..=max_overlap).rev() {
        if buffer_chars[buffer_chars.len() - k..] == s_chars[..k] {
            let tail: String = s_chars[k..].iter().collect();
            return format!("{buffer}{tail}");
        }
    }
    format!("{buffer}{s}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_merge_joins_suffix_prefix() {
        assert_eq!(merge("hello wor", "world"), "hello world");
        assert_eq!(merge("hello", "lo world"), "hello world");
    }

    #[test]
    fn substring_chunk_is_ignored() {
        assert_eq!(merge("hello wor", "hello"), "hello wor");
    }

    #[test]
    fn no_overlap_is_plain_append() {
        assert_eq!(merge("hello", "world"), "helloworld");
    }

    #[test]
    fn multibyte_chunks_without_overlap_do_not_panic() {
        // Neither is a substring of the other and there is no char overlap;
        // byte-offset slicing here used to land mid-codepoint and panic.
        assert_eq!(merge("你好", "世界"), "你好世界");
    }

    #[test]
    fn multibyte_overlap_join_matches_on_characters() {
        assert_eq!(merge("你好世", "世界"), "你好世界");
    }

    #[test]
    fn suppresses_when_candidate_is_suffix_of_last_line() {
        // After emitting "hello world", a later buffer that re-derives just
        // the trailing "world" is a suffix of the prior line and must be
        // suppressed, not treated as a new distinct line.
        assert!(is_suppressed("world", Some("hello world")));
    }

    #[test]
    fn does_not_suppress_extension_of_last_line() {
        // "hello world" extends the previously emitted "hello" and is a
        // genuinely new, longer line - it must NOT be suppressed.
        assert!(!is_suppressed("hello world", Some("hello")));
    }

    #[test]
    fn clean_single_utterance_emits_once() {
        let mut buf = TextBuffer::new();
        assert_eq!(buf.feed("hello world", true), Some("hello world".to_string()));
    }

    #[test]
    fn duplicate_deltas_emit_exactly_one_line() {
        let mut buf = TextBuffer::new();
        assert_eq!(buf.feed("he", false), None);
        assert_eq!(buf.feed("hello", false), None);
        assert_eq!(buf.feed("hello wo", false), None);
        assert_eq!(buf.feed("hello world", true), Some("hello world".to_string()));
    }

    #[test]
    fn overlap_merge_scenario() {
        let mut buf = TextBuffer::new();
        buf.feed("hello", false);
        assert_eq!(buf.feed("lo world", true), Some("hello world".to_string()));
    }

    #[test]
    fn idempotent_under_repeated_identical_delta() {
        let mut without_repeat = TextBuffer::new();
        without_repeat.feed("hello", false);
        let a = without_repeat.feed("world", true);

        let mut with_repeat = TextBuffer::new();
        with_repeat.feed("hello", false);
        with_repeat.append("hello");
        with_repeat.append("world");
        with_repeat.mark_done();
        let b = with_repeat.finalize();

        assert_eq!(a, b);
    }

    #[test]
    fn single_emission_per_done_when_buffer_repeats_previous_line() {
        let mut buf = TextBuffer::new();
        assert_eq!(buf.feed("hello world", true), Some("hello world".to_string()));
        // A later utterance whose buffer happens to re-derive the same
        // line as last time is still suppressed, since it is identical.
        assert_eq!(buf.feed("hello world", true), None);
    }

    #[test]
    fn empty_chunk_is_ignored() {
        let mut buf = TextBuffer::new();
        assert_eq!(buf.feed("", true), None);
    }

    #[test]
    fn whitespace_only_buffer_never_emits() {
        let mut buf = TextBuffer::new();
        assert_eq!(buf.feed("   ", true), None);
    }
}
