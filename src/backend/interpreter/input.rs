use std::collections::VecDeque;
use std::io::{self, BufRead};

/// Where `rd` statements take their numbers from. The driver owns the source
/// and lends it to each evaluation.
pub trait InputSource {
    /// Next whitespace-separated word, or `None` once the input is exhausted.
    fn next_word(&mut self) -> io::Result<Option<String>>;
}

/// Splits any buffered reader into whitespace-separated words, pulling one
/// line at a time so interactive input is consumed lazily.
pub struct WordReader<R> {
    reader: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> WordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }
}

impl<R: BufRead> InputSource for WordReader<R> {
    fn next_word(&mut self) -> io::Result<Option<String>> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_string));
        }
        Ok(self.pending.pop_front())
    }
}
