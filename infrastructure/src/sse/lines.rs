//! Byte-level line splitting for incrementally received bodies.

/// Accumulates raw bytes and hands out complete lines.
///
/// Lines are split on `\n` only; a trailing `\r` is stripped. Since `\n`
/// never occurs inside a multi-byte UTF-8 sequence, a character split
/// across two chunks is reassembled before its line is decoded.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
    /// Bytes already searched for `\n`; never rescanned.
    scanned: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.extend_from_slice(chunk);
        let mut lines = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.buffer[from..].iter().position(|b| *b == b'\n') {
            let end = from + offset;
            let mut line = &self.buffer[start..end];
            if line.last() == Some(&b'\r') {
                line = &line[..line.len() - 1];
            }
            lines.push(line.to_vec());
            start = end + 1;
            from = start;
        }
        if start > 0 {
            self.buffer.drain(..start);
        }
        self.scanned = self.buffer.len();
        lines
    }

    /// Take whatever is left after the final newline.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.buffer.is_empty() {
            return None;
        }
        self.scanned = 0;
        let mut line = std::mem::take(&mut self.buffer);
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_lines_across_chunks() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"ab").is_empty());
        let lines = buffer.push(b"c\r\nde\nf");
        assert_eq!(lines, vec![b"abc".to_vec(), b"de".to_vec()]);
        assert_eq!(buffer.pending(), 1);
        assert_eq!(buffer.finish(), Some(b"f".to_vec()));
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_long_line_in_small_chunks() {
        let payload = vec![b'x'; 1 << 20];
        let mut buffer = LineBuffer::new();
        for chunk in payload.chunks(64) {
            assert!(buffer.push(chunk).is_empty());
            assert_eq!(buffer.scanned, buffer.pending());
        }
        let lines = buffer.push(b"\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), payload.len());
        assert_eq!(buffer.pending(), 0);
    }

    #[test]
    fn test_many_lines_in_one_chunk() {
        let body: Vec<u8> = (0..50_000)
            .flat_map(|i| format!("data: {i}\r\n").into_bytes())
            .collect();
        let mut buffer = LineBuffer::new();
        let lines = buffer.push(&body[..body.len() - 3]);
        assert_eq!(lines.len(), 49_999);
        assert_eq!(lines[49_998], b"data: 49998".to_vec());
        let rest = buffer.push(&body[body.len() - 3..]);
        assert_eq!(rest, vec![b"data: 49999".to_vec()]);
    }

    #[test]
    fn test_multibyte_char_split_between_chunks() {
        let bytes = "é\n".as_bytes();
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(&bytes[..1]).is_empty());
        let lines = buffer.push(&bytes[1..]);
        assert_eq!(String::from_utf8(lines[0].clone()).unwrap(), "é");
    }
}
