use std::collections::VecDeque;

pub const DEFAULT_CHUNK_SIZE: usize = 1500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Recursive character splitter.
///
/// Text is cut on the coarsest separator present (paragraphs, then lines,
/// then words, then characters) and the pieces are greedily merged back into
/// chunks of at most `chunk_size` characters. Each new chunk starts with up
/// to `chunk_overlap` characters carried over from the end of the previous one.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (separator, finer) = pick_separator(text, separators);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut small: Vec<&str> = Vec::new();

        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                small.push(piece);
                continue;
            }

            if !small.is_empty() {
                chunks.extend(self.merge(&small, separator));
                small.clear();
            }

            if finer.is_empty() {
                if let Some(chunk) = trimmed(piece) {
                    chunks.push(chunk);
                }
            } else {
                chunks.extend(self.split_with(piece, finer));
            }
        }

        if !small.is_empty() {
            chunks.extend(self.merge(&small, separator));
        }

        chunks
    }

    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);

            if !window.is_empty() && total + len + joiner(&window, sep_len) > self.chunk_size {
                if let Some(chunk) = join(&window, separator) {
                    chunks.push(chunk);
                }

                // Drop from the front until only the overlap tail remains and
                // the next piece fits.
                while total > self.chunk_overlap
                    || (total > 0 && total + len + joiner(&window, sep_len) > self.chunk_size)
                {
                    let Some(front) = window.pop_front() else {
                        break;
                    };
                    total = total.saturating_sub(char_len(front) + joiner(&window, sep_len));
                }
            }

            total += len + joiner(&window, sep_len);
            window.push_back(piece);
        }

        if let Some(chunk) = join(&window, separator) {
            chunks.push(chunk);
        }

        chunks
    }
}

fn pick_separator<'a, 's>(text: &str, separators: &'s [&'a str]) -> (&'a str, &'s [&'a str]) {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() || text.contains(sep) {
            return (*sep, &separators[i + 1..]);
        }
    }
    ("", &[])
}

/// Separator length owed when appending to `window`.
fn joiner(window: &VecDeque<&str>, sep_len: usize) -> usize {
    if window.is_empty() {
        0
    } else {
        sep_len
    }
}

fn join(window: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    trimmed(&joined)
}

fn trimmed(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = TextSplitter::default().split("  A short page.\n\nTwo paragraphs.  ");
        assert_eq!(chunks, vec!["A short page.\n\nTwo paragraphs.".to_string()]);
    }

    #[test]
    fn empty_and_blank_text_yield_no_chunks() {
        let splitter = TextSplitter::default();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split(" \n\n \n ").is_empty());
    }

    #[test]
    fn long_text_respects_chunk_size() {
        let text = words(3000);
        let chunks = TextSplitter::default().split(&text);

        assert!(chunks.len() > 4);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= DEFAULT_CHUNK_SIZE, "chunk too long");
        }
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let text = words(1000);
        let chunks = TextSplitter::default().split(&text);
        assert!(chunks.len() >= 2);

        for pair in chunks.windows(2) {
            let head: Vec<&str> = pair[1].split(' ').take(3).collect();
            assert!(
                pair[0].contains(&head.join(" ")),
                "next chunk should start inside the previous one"
            );
            let carried = pair[0].split(' ').filter(|w| pair[1].split(' ').any(|x| x == *w)).count();
            assert!(carried > 0);
        }
    }

    #[test]
    fn overlap_never_exceeds_limit() {
        let splitter = TextSplitter::new(100, 20);
        let text = words(200);
        let chunks = splitter.split(&text);

        for pair in chunks.windows(2) {
            let prev: Vec<&str> = pair[0].split(' ').collect();
            let next: Vec<&str> = pair[1].split(' ').collect();
            let shared = next.iter().take_while(|w| prev.contains(*w)).count();
            let shared_chars: usize = next[..shared].iter().map(|w| w.len()).sum::<usize>()
                + shared.saturating_sub(1);
            assert!(shared_chars <= 20);
        }
    }

    #[test]
    fn paragraphs_stay_whole_when_they_fit() {
        let para_a = "a".repeat(600);
        let para_b = "b".repeat(600);
        let para_c = "c".repeat(600);
        let text = format!("{}\n\n{}\n\n{}", para_a, para_b, para_c);

        let chunks = TextSplitter::default().split(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], format!("{}\n\n{}", para_a, para_b));
        assert_eq!(chunks[1], para_c);
    }

    #[test]
    fn unbroken_text_falls_back_to_characters() {
        let text = "x".repeat(3500);
        let chunks = TextSplitter::default().split(&text);

        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= DEFAULT_CHUNK_SIZE));
    }

    #[test]
    fn multibyte_text_is_counted_in_chars() {
        let text = "é".repeat(1499);
        assert_eq!(TextSplitter::default().split(&text).len(), 1);
    }
}
