//! Stream framing: splitting raw socket bytes into JSON object frames.
//!
//! The wire carries bare JSON objects back-to-back with no length prefix,
//! so the reader has to find object boundaries itself. [`JsonFramer`]
//! buffers incoming chunks and yields one complete top-level object at a
//! time by tracking brace depth, aware of strings and escape sequences.
//! A client may therefore split one object across several writes or batch
//! several objects into a single write.
//!
//! Bytes that cannot start an object (anything but whitespace before the
//! first `{`) are yielded as a frame of their own so the codec turns them
//! into an `INTERNAL_ERROR` reply instead of silently discarding them.

/// Frames larger than this are handed to the codec unfinished, which
/// rejects them; it bounds buffering for a client that never closes a brace.
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Incremental splitter for concatenated JSON objects.
#[derive(Debug, Default)]
pub struct JsonFramer {
    buf: Vec<u8>,

    // Scan state, persistent across `push` calls so each byte is
    // examined once.
    scanned: usize,
    depth: u32,
    in_string: bool,
    escaped: bool,
}

impl JsonFramer {
    pub fn new() -> Self {
        JsonFramer::default()
    }

    /// Append a chunk read from the socket.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Extract the next complete frame, if one is buffered.
    ///
    /// Call repeatedly after each [`push`](Self::push) until it returns
    /// `None`.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        // Drop leading whitespace between objects.
        if self.depth == 0 {
            let skip = self
                .buf
                .iter()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
            if skip > 0 {
                self.buf.drain(..skip);
                self.scanned = 0;
            }
        }

        if self.buf.is_empty() {
            return None;
        }

        // Garbage that cannot open an object: surrender everything up to
        // the next `{` (or the whole buffer) as an invalid frame.
        if self.depth == 0 && self.buf[0] != b'{' {
            let end = self
                .buf
                .iter()
                .position(|&b| b == b'{')
                .unwrap_or(self.buf.len());
            let frame = self.buf.drain(..end).collect();
            self.scanned = 0;
            return Some(frame);
        }

        while self.scanned < self.buf.len() {
            let byte = self.buf[self.scanned];
            self.scanned += 1;

            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                }
                continue;
            }

            match byte {
                b'"' => self.in_string = true,
                b'{' => self.depth += 1,
                b'}' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        let frame = self.buf.drain(..self.scanned).collect();
                        self.scanned = 0;
                        return Some(frame);
                    }
                }
                _ => {}
            }
        }

        // Oversized unfinished frame: flush it as-is rather than buffering
        // without bound.
        if self.buf.len() > MAX_FRAME_LEN {
            let frame = std::mem::take(&mut self.buf);
            self.scanned = 0;
            self.depth = 0;
            self.in_string = false;
            self.escaped = false;
            return Some(frame);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(framer: &mut JsonFramer) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(frame) = framer.next_frame() {
            out.push(String::from_utf8(frame).unwrap());
        }
        out
    }

    #[test]
    fn yields_a_single_complete_object() {
        let mut framer = JsonFramer::new();
        framer.push(br#"{"REQUEST_NAME":"CONFIG_UNLOAD","CONFIG_ID":1}"#);
        assert_eq!(
            frames(&mut framer),
            vec![r#"{"REQUEST_NAME":"CONFIG_UNLOAD","CONFIG_ID":1}"#]
        );
        assert!(framer.next_frame().is_none());
    }

    #[test]
    fn reassembles_an_object_split_across_chunks() {
        let mut framer = JsonFramer::new();
        framer.push(br#"{"REQUEST_NAME":"CONFIG_LOAD","#);
        assert!(framer.next_frame().is_none());
        framer.push(br#""CONFIG_KEY":"abc"}"#);
        assert_eq!(
            frames(&mut framer),
            vec![r#"{"REQUEST_NAME":"CONFIG_LOAD","CONFIG_KEY":"abc"}"#]
        );
    }

    #[test]
    fn splits_objects_batched_into_one_chunk() {
        let mut framer = JsonFramer::new();
        framer.push(br#"{"a":1} {"b":{"c":2}}{"d":3}"#);
        assert_eq!(
            frames(&mut framer),
            vec![r#"{"a":1}"#, r#"{"b":{"c":2}}"#, r#"{"d":3}"#]
        );
    }

    #[test]
    fn braces_inside_strings_do_not_close_frames() {
        let mut framer = JsonFramer::new();
        framer.push(br#"{"name":"weird } \" { value"}"#);
        assert_eq!(frames(&mut framer), vec![r#"{"name":"weird } \" { value"}"#]);
    }

    #[test]
    fn garbage_before_an_object_becomes_its_own_frame() {
        let mut framer = JsonFramer::new();
        framer.push(br#"hello{"a":1}"#);
        assert_eq!(frames(&mut framer), vec!["hello", r#"{"a":1}"#]);
    }

    #[test]
    fn bare_garbage_is_flushed() {
        let mut framer = JsonFramer::new();
        framer.push(b"not json at all");
        assert_eq!(frames(&mut framer), vec!["not json at all"]);
    }
}
