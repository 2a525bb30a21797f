//! # SSE Parser
//!
//! Server-Sent Events line parser shared by every streaming backend:
//! - Line buffering from chunked responses (`\n` or `\r\n`)
//! - `data: ` prefix extraction
//! - `[DONE]`, comment, `event:` and empty lines are skipped
//! - A trailing line without a newline is still processed at end of stream
//!
//! A read error from the underlying byte stream is yielded once as
//! [`ProviderError::SseParse`] and ends the stream.

use std::fmt::Display;

use bytes::{Bytes, BytesMut};
use futures::Stream;
use tokio_stream::StreamExt;

use crate::error::{ProviderError, ProviderResult};

/// Parse SSE lines from a byte stream and yield raw `data:` payloads.
pub fn parse_sse_lines<S, E>(byte_stream: S) -> impl Stream<Item = ProviderResult<String>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + Unpin + 'static,
    E: Display + Send + 'static,
{
    futures::stream::unfold(
        (byte_stream, BytesMut::with_capacity(8192), false),
        |(mut stream, mut buffer, done)| async move {
            if done {
                return None;
            }

            loop {
                if let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                    let mut line_bytes = buffer.split_to(newline_pos + 1);
                    line_bytes.truncate(line_bytes.len() - 1);
                    if line_bytes.last() == Some(&b'\r') {
                        line_bytes.truncate(line_bytes.len() - 1);
                    }

                    let Ok(line) = std::str::from_utf8(&line_bytes) else {
                        continue;
                    };

                    if let Some(data) = extract_sse_data(line) {
                        return Some((Ok(data), (stream, buffer, false)));
                    }
                    continue;
                }

                match stream.next().await {
                    Some(Ok(chunk)) => buffer.extend_from_slice(&chunk),
                    Some(Err(e)) => {
                        let err = ProviderError::SseParse {
                            message: format!("stream read error: {e}"),
                        };
                        return Some((Err(err), (stream, buffer, true)));
                    }
                    None => {
                        if buffer.is_empty() {
                            return None;
                        }
                        let data = std::str::from_utf8(&buffer)
                            .ok()
                            .and_then(extract_sse_data);
                        buffer.clear();
                        return data.map(|d| (Ok(d), (stream, buffer, true)));
                    }
                }
            }
        },
    )
}

/// Extract the data payload from one SSE line.
///
/// Returns `None` for comments, empty lines, non-data fields, empty data and
/// the `[DONE]` marker.
pub fn extract_sse_data(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') {
        return None;
    }

    let data = trimmed
        .strip_prefix("data: ")
        .or_else(|| trimmed.strip_prefix("data:"))?
        .trim();

    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    Some(data.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_stream(
        chunks: Vec<Result<&'static str, &'static str>>,
    ) -> impl Stream<Item = Result<Bytes, String>> + Send + Unpin + 'static {
        futures::stream::iter(chunks.into_iter().map(|c| {
            c.map(|s| Bytes::from_static(s.as_bytes()))
                .map_err(String::from)
        }))
    }

    async fn collect(chunks: Vec<Result<&'static str, &'static str>>) -> Vec<ProviderResult<String>> {
        parse_sse_lines(byte_stream(chunks)).collect().await
    }

    // ── extract_sse_data ─────────────────────────────────────────────────

    #[test]
    fn extract_data_line() {
        assert_eq!(extract_sse_data(r#"data: {"a":1}"#), Some(r#"{"a":1}"#.into()));
        assert_eq!(extract_sse_data(r#"data:{"a":1}"#), Some(r#"{"a":1}"#.into()));
    }

    #[test]
    fn extract_skips_markers_and_fields() {
        assert_eq!(extract_sse_data("data: [DONE]"), None);
        assert_eq!(extract_sse_data("data: "), None);
        assert_eq!(extract_sse_data(": keep-alive"), None);
        assert_eq!(extract_sse_data("event: message_start"), None);
        assert_eq!(extract_sse_data(""), None);
    }

    // ── parse_sse_lines ──────────────────────────────────────────────────

    #[tokio::test]
    async fn splits_lines_across_chunks() {
        let out = collect(vec![Ok("data: {\"a\""), Ok(":1}\n\ndata: {\"b\":2}\n\n")]).await;
        let data: Vec<String> = out.into_iter().map(Result::unwrap).collect();
        assert_eq!(data, vec![r#"{"a":1}"#, r#"{"b":2}"#]);
    }

    #[tokio::test]
    async fn handles_crlf_and_done() {
        let out = collect(vec![Ok("data: 1\r\n\r\ndata: [DONE]\r\n\r\n")]).await;
        let data: Vec<String> = out.into_iter().map(Result::unwrap).collect();
        assert_eq!(data, vec!["1"]);
    }

    #[tokio::test]
    async fn processes_trailing_line_without_newline() {
        let out = collect(vec![Ok("data: first\n"), Ok("data: last")]).await;
        let data: Vec<String> = out.into_iter().map(Result::unwrap).collect();
        assert_eq!(data, vec!["first", "last"]);
    }

    #[tokio::test]
    async fn event_lines_are_ignored() {
        let out = collect(vec![Ok(
            "event: content_block_delta\ndata: {\"type\":\"x\"}\n\n",
        )])
        .await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_ref().unwrap(), r#"{"type":"x"}"#);
    }

    #[tokio::test]
    async fn read_error_is_yielded_then_stream_ends() {
        let out = collect(vec![Ok("data: 1\n"), Err("connection reset"), Ok("data: 2\n")]).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_ref().unwrap(), "1");
        let err = out[1].as_ref().unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
