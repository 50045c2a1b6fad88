//! Line reassembly over a chunked byte stream.
//!
//! Both SSE and NDJSON are line-oriented, but network chunks split lines
//! (and multi-byte chars) at arbitrary points.

use super::LlmError;
use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;

/// Buffers bytes until complete `\n`-terminated lines are available.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every complete line it finishes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(decode(&line[..pos]));
        }
        lines
    }

    /// Flush a trailing line that never got its newline.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(decode(&rest))
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\r')
        .to_string()
}

struct LineState<S> {
    bytes: Pin<Box<S>>,
    buffer: LineBuffer,
    ready: VecDeque<String>,
    finished: bool,
}

/// Turn a stream of byte chunks into a stream of lines.
///
/// A chunk error is yielded once and ends the stream.
pub fn lines<S, B, E>(bytes: S) -> impl Stream<Item = Result<String, LlmError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Into<LlmError> + Send,
{
    let state = LineState {
        bytes: Box::pin(bytes),
        buffer: LineBuffer::new(),
        ready: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.ready.pop_front() {
                return Some((Ok(line), state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let complete = state.buffer.push(chunk.as_ref());
                    state.ready.extend(complete);
                }
                Some(Err(err)) => {
                    state.finished = true;
                    return Some((Err(err.into()), state));
                }
                None => {
                    state.finished = true;
                    state.ready.extend(state.buffer.finish());
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_splits_lines() {
        let mut buffer = LineBuffer::new();
        assert_eq!(buffer.push(b"uno\r\ndo"), vec!["uno"]);
        assert_eq!(buffer.push(b"s\ntres"), vec!["dos"]);
        assert_eq!(buffer.finish(), Some("tres".to_string()));
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_push_keeps_split_utf8() {
        let mut buffer = LineBuffer::new();
        let bytes = "oración\n".as_bytes();
        // Split inside the two-byte 'ó'.
        let cut = "oraci".len() + 1;
        assert!(buffer.push(&bytes[..cut]).is_empty());
        assert_eq!(buffer.push(&bytes[cut..]), vec!["oración"]);
    }

    #[tokio::test]
    async fn test_lines_stream() {
        let chunks: Vec<Result<&'static [u8], LlmError>> =
            vec![Ok(b"a\nb"), Ok(b"\n\nc"), Ok(b"")];
        let collected: Vec<String> = lines(stream::iter(chunks))
            .map(|l| l.unwrap())
            .collect()
            .await;
        assert_eq!(collected, vec!["a", "b", "", "c"]);
    }

    #[tokio::test]
    async fn test_lines_stream_stops_on_error() {
        let chunks: Vec<Result<&'static [u8], LlmError>> = vec![
            Ok(b"a\n"),
            Err(LlmError::Transport("reset".to_string())),
            Ok(b"b\n"),
        ];
        let collected: Vec<Result<String, LlmError>> =
            lines(stream::iter(chunks)).collect().await;
        assert_eq!(collected.len(), 2);
        assert!(matches!(collected[0], Ok(ref l) if l == "a"));
        assert!(matches!(collected[1], Err(LlmError::Transport(_))));
    }
}
