//! Frame reassembly for the `#`-delimited command stream
//!
//! The robot speaks an ASCII line protocol where every command is one frame
//! terminated by [`DELIMITER`]:
//!
//! ```text
//! q 0.98 0.01 -0.12 0.05#p 12.5 1.2 0.8#
//! ```
//!
//! TCP delivers this stream in arbitrary chunks, so a frame may arrive split
//! across any number of reads. [`FrameSplitter`] accumulates bytes across
//! calls and yields complete frames in arrival order, retaining any
//! undelimited suffix for the next call.
//!
//! Each channel (TCP control, UDP telemetry) needs its own splitter instance;
//! the accumulation buffer is per-stream state. UDP datagrams are
//! self-contained and never carry a remainder worth keeping, so they go
//! through [`split_datagram`] instead.
//!
//! # Buffer growth
//!
//! If the peer never sends a delimiter the buffer would grow without bound
//! (the original protocol accepts this). We cap it at [`MAX_BUFFER_LEN`] and
//! reset on overflow, dropping whatever garbage accumulated.

/// Frame terminator character
pub const DELIMITER: char = '#';

/// Accumulation buffer cap; a legitimate frame is tens of bytes
pub const MAX_BUFFER_LEN: usize = 64 * 1024;

/// Reassembles complete frames from an arbitrarily-chunked byte stream
#[derive(Debug, Default)]
pub struct FrameSplitter {
    buffer: String,
}

impl FrameSplitter {
    /// Create a new splitter with an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning every frame completed by it
    ///
    /// Frames are returned without their terminating delimiter, in arrival
    /// order. Non-UTF-8 bytes are replaced; the protocol is plain ASCII so
    /// this only matters for line noise, which the parser drops anyway.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.find(DELIMITER) {
            let frame = self.buffer[..pos].to_string();
            self.buffer.replace_range(..=pos, "");
            frames.push(frame);
        }

        if self.buffer.len() > MAX_BUFFER_LEN {
            log::warn!(
                "Frame buffer overflow ({} bytes without delimiter), resetting",
                self.buffer.len()
            );
            self.buffer.clear();
        }

        frames
    }

    /// Number of buffered bytes still waiting for a delimiter
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// Split one self-contained datagram into complete frames
///
/// A datagram may hold zero, one, or several delimiter-terminated frames.
/// Any trailing bytes after the last delimiter are discarded: datagrams are
/// whole deliveries, there is no later chunk to complete them.
pub fn split_datagram(data: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(data);
    let mut frames: Vec<String> = text.split(DELIMITER).map(str::to_string).collect();
    // split() yields the undelimited tail as a last element; drop it
    frames.pop();
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_read_two_frames() {
        let mut splitter = FrameSplitter::new();
        let frames = splitter.feed(b"q 1 0 0 0#p 2 3 4#");
        assert_eq!(frames, ["q 1 0 0 0", "p 2 3 4"]);
        assert_eq!(splitter.pending(), 0);
    }

    #[test]
    fn test_all_chunk_boundaries() {
        // The frame sequence must survive any split point
        let stream = b"q 1 0 0 0#p 2 3 4#";
        for cut in 0..=stream.len() {
            let mut splitter = FrameSplitter::new();
            let mut frames = splitter.feed(&stream[..cut]);
            frames.extend(splitter.feed(&stream[cut..]));
            assert_eq!(frames, ["q 1 0 0 0", "p 2 3 4"], "failed at cut {}", cut);
        }
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut splitter = FrameSplitter::new();
        let mut frames = Vec::new();
        for byte in b"q 1 0 0 0#p 2 3 4#" {
            frames.extend(splitter.feed(&[*byte]));
        }
        assert_eq!(frames, ["q 1 0 0 0", "p 2 3 4"]);
    }

    #[test]
    fn test_suffix_retained_across_reads() {
        let mut splitter = FrameSplitter::new();
        assert!(splitter.feed(b"q 1 0").is_empty());
        assert_eq!(splitter.pending(), 5);
        let frames = splitter.feed(b" 0 0#");
        assert_eq!(frames, ["q 1 0 0 0"]);
    }

    #[test]
    fn test_empty_frame_between_delimiters() {
        let mut splitter = FrameSplitter::new();
        let frames = splitter.feed(b"##q 1 0 0 0#");
        assert_eq!(frames, ["", "", "q 1 0 0 0"]);
    }

    #[test]
    fn test_overflow_resets_buffer() {
        let mut splitter = FrameSplitter::new();
        let junk = vec![b'x'; MAX_BUFFER_LEN + 1];
        assert!(splitter.feed(&junk).is_empty());
        assert_eq!(splitter.pending(), 0);
        // Splitter keeps working after the reset
        let frames = splitter.feed(b"S#");
        assert_eq!(frames, ["S"]);
    }

    #[test]
    fn test_datagram_multiple_frames() {
        let frames = split_datagram(b"q 1 0 0 0#p 2 3 4#");
        assert_eq!(frames, ["q 1 0 0 0", "p 2 3 4"]);
    }

    #[test]
    fn test_datagram_discards_tail() {
        let frames = split_datagram(b"q 1 0 0 0#p 2 3");
        assert_eq!(frames, ["q 1 0 0 0"]);
    }

    #[test]
    fn test_datagram_empty() {
        assert!(split_datagram(b"").is_empty());
        assert!(split_datagram(b"no delimiter").is_empty());
    }
}
