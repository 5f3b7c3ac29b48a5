//! Incremental Server-Sent Events frame decoder.
//!
//! Fed raw body chunks, yields complete frames. Handles fields split across
//! chunks, multi-line `data:`, `:` comment lines, and CRLF line endings.
//! `id:` and `retry:` fields are accepted and ignored.
//!
//! One deviation from browser EventSource: a named event with no `data`
//! lines still dispatches (with empty data), because the server signals
//! liveness with a payload-free `connected` event.

/// One decoded frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` field, if any.
    pub event: Option<String>,
    /// Concatenated `data:` lines, newline-joined.
    pub data: String,
}

/// Streaming decoder; owns the partial line between chunks.
#[derive(Debug, Default)]
pub struct SseDecoder {
    partial: String,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a body chunk, returning every frame completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.partial.push_str(&String::from_utf8_lossy(chunk));

        let mut frames = Vec::new();
        while let Some(newline) = self.partial.find('\n') {
            let mut line: String = self.partial.drain(..=newline).collect();
            line.pop(); // trailing \n
            if line.ends_with('\r') {
                line.pop();
            }
            self.process_line(&line, &mut frames);
        }
        frames
    }

    fn process_line(&mut self, line: &str, frames: &mut Vec<SseFrame>) {
        if line.is_empty() {
            if self.event.is_some() || !self.data.is_empty() {
                frames.push(SseFrame {
                    event: self.event.take(),
                    data: std::mem::take(&mut self.data).join("\n"),
                });
            }
            return;
        }
        if line.starts_with(':') {
            return; // comment / keep-alive
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {} // id, retry, unknown fields
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_single_data_frame() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"data: {\"id\":1}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, None);
        assert_eq!(frames[0].data, "{\"id\":1}");
    }

    #[test]
    fn joins_multiline_data() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"data: line one\ndata: line two\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "line one\nline two");
    }

    #[test]
    fn named_event_without_data_dispatches() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"event: connected\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("connected"));
        assert!(frames[0].data.is_empty());
    }

    #[test]
    fn frame_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"id\"").is_empty());
        assert!(decoder.feed(b":7}\n").is_empty());
        let frames = decoder.feed(b"\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{\"id\":7}");
    }

    #[test]
    fn crlf_and_comments_are_handled() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b": keep-alive\r\ndata: x\r\n\r\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "x");
    }

    #[test]
    fn id_and_retry_fields_are_ignored() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"id: 12\nretry: 3000\ndata: y\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "y");
        assert_eq!(frames[0].event, None);
    }

    #[test]
    fn multiple_frames_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"data: a\n\nevent: connected\n\ndata: b\n\n");
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].data, "a");
        assert_eq!(frames[1].event.as_deref(), Some("connected"));
        assert_eq!(frames[2].data, "b");
    }

    #[test]
    fn blank_lines_without_pending_fields_emit_nothing() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"\n\n\n").is_empty());
    }
}
