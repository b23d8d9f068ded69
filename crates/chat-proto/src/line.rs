//! Line-based codecs for tokio.
//!
//! [`LineCodec`] splits a byte stream into newline-terminated UTF-8 lines.
//! Framing problems (over-long lines, invalid UTF-8) are yielded as items
//! rather than stream errors, so a single bad line never ends the stream;
//! only I/O failures do.
//!
//! [`ServerCodec`] and [`ClientCodec`] are the two ends of a chat
//! connection: the server reads command lines and writes JSON envelopes,
//! the client does the opposite.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::envelope::Envelope;
use crate::error::{ProtocolError, Result};

/// Default maximum line length in bytes, including the newline.
pub const DEFAULT_MAX_LINE_LEN: usize = 4096;

/// A decoded frame: either a line or the reason it was dropped.
pub type Frame<T> = std::result::Result<T, ProtocolError>;

/// Newline-delimited UTF-8 line codec with a length limit.
///
/// Trailing `\r\n` or `\n` is stripped from each line.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length, newline included
    max_len: usize,
    /// Skipping the rest of an over-long line
    discarding: bool,
    /// Bytes skipped so far for the current over-long line
    discarded: usize,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }
}

impl LineCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with a custom line limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len: max_len.max(1),
            discarding: false,
            discarded: 0,
        }
    }

    /// The configured line limit.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    fn decode_line(line: &[u8]) -> Frame<String> {
        let mut end = line.len();
        if end > 0 && line[end - 1] == b'\n' {
            end -= 1;
        }
        if end > 0 && line[end - 1] == b'\r' {
            end -= 1;
        }
        std::str::from_utf8(&line[..end])
            .map(str::to_owned)
            .map_err(|e| ProtocolError::InvalidUtf8 {
                byte_pos: e.valid_up_to(),
                details: e.to_string(),
            })
    }
}

impl Decoder for LineCodec {
    type Item = Frame<String>;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        loop {
            if self.discarding {
                match src.iter().position(|b| *b == b'\n') {
                    Some(offset) => {
                        src.advance(offset + 1);
                        let actual = self.discarded + offset + 1;
                        self.discarding = false;
                        self.discarded = 0;
                        return Ok(Some(Err(ProtocolError::LineTooLong {
                            actual,
                            limit: self.max_len,
                        })));
                    }
                    None => {
                        self.discarded += src.len();
                        src.clear();
                        return Ok(None);
                    }
                }
            }

            let read_to = src.len().min(self.max_len);
            match src[self.next_index..read_to].iter().position(|b| *b == b'\n') {
                Some(offset) => {
                    let line = src.split_to(self.next_index + offset + 1);
                    self.next_index = 0;
                    return Ok(Some(Self::decode_line(&line)));
                }
                None if src.len() >= self.max_len => {
                    // No newline within the limit: drop what we have and
                    // skip ahead to the next line boundary.
                    self.discarding = true;
                    self.discarded = 0;
                    self.next_index = 0;
                }
                None => {
                    self.next_index = read_to;
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if self.discarding || src.is_empty() {
            src.clear();
            self.discarding = false;
            self.discarded = 0;
            self.next_index = 0;
            return Ok(None);
        }
        // Unterminated final line
        let line = src.split_to(src.len());
        self.next_index = 0;
        Ok(Some(Self::decode_line(&line)))
    }
}

/// Server side of a connection: reads command lines, writes envelopes.
#[derive(Debug, Clone, Default)]
pub struct ServerCodec {
    lines: LineCodec,
}

impl ServerCodec {
    /// Create a server codec with the given inbound line limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            lines: LineCodec::with_max_len(max_len),
        }
    }
}

impl Decoder for ServerCodec {
    type Item = Frame<String>;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        self.lines.decode(src)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        self.lines.decode_eof(src)
    }
}

impl<'a> Encoder<&'a Envelope> for ServerCodec {
    type Error = ProtocolError;

    fn encode(&mut self, envelope: &'a Envelope, dst: &mut BytesMut) -> Result<()> {
        let json = serde_json::to_vec(envelope)?;
        dst.reserve(json.len() + 1);
        dst.extend_from_slice(&json);
        dst.extend_from_slice(b"\n");
        Ok(())
    }
}

/// Client side of a connection: reads envelopes, writes command lines.
#[derive(Debug, Clone, Default)]
pub struct ClientCodec {
    lines: LineCodec,
}

impl ClientCodec {
    /// Create a client codec with the given inbound line limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            lines: LineCodec::with_max_len(max_len),
        }
    }

    fn to_envelope(frame: Frame<String>) -> Frame<Envelope> {
        frame.and_then(|line| Envelope::from_json(&line))
    }
}

impl Decoder for ClientCodec {
    type Item = Frame<Envelope>;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        Ok(self.lines.decode(src)?.map(Self::to_envelope))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        Ok(self.lines.decode_eof(src)?.map(Self::to_envelope))
    }
}

impl Encoder<String> for ClientCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<()> {
        let line = line.trim_end_matches(['\r', '\n']);
        dst.reserve(line.len() + 1);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut LineCodec, input: &[u8]) -> Vec<Frame<String>> {
        let mut buf = BytesMut::from(input);
        let mut out = Vec::new();
        while let Some(frame) = codec.decode(&mut buf).unwrap() {
            out.push(frame);
        }
        out
    }

    #[test]
    fn splits_lines_and_strips_crlf() {
        let mut codec = LineCodec::new();
        let frames = decode_all(&mut codec, b"NICK alice\r\nhello\n");
        let lines: Vec<String> = frames.into_iter().map(|f| f.unwrap()).collect();
        assert_eq!(lines, vec!["NICK alice", "hello"]);
    }

    #[test]
    fn waits_for_newline() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"partial"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(b" line\n");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap().unwrap(), "partial line");
    }

    #[test]
    fn over_long_line_is_dropped_and_stream_recovers() {
        let mut codec = LineCodec::with_max_len(8);
        let frames = decode_all(&mut codec, b"0123456789abcdef\nok\n");
        assert_eq!(frames.len(), 2);
        assert!(matches!(
            frames[0],
            Err(ProtocolError::LineTooLong { actual: 17, limit: 8 })
        ));
        assert_eq!(frames[1].as_ref().unwrap(), "ok");
    }

    #[test]
    fn line_at_limit_is_accepted() {
        let mut codec = LineCodec::with_max_len(4);
        let frames = decode_all(&mut codec, b"abc\nabcd\n");
        assert_eq!(frames[0].as_ref().unwrap(), "abc");
        assert!(frames[1].is_err());
    }

    #[test]
    fn invalid_utf8_is_reported_per_line() {
        let mut codec = LineCodec::new();
        let frames = decode_all(&mut codec, b"ok\n\xff\xfe\nafter\n");
        assert_eq!(frames.len(), 3);
        assert!(matches!(frames[1], Err(ProtocolError::InvalidUtf8 { byte_pos: 0, .. })));
        assert_eq!(frames[2].as_ref().unwrap(), "after");
    }

    #[test]
    fn eof_flushes_unterminated_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"QUIT"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(codec.decode_eof(&mut buf).unwrap().unwrap().unwrap(), "QUIT");
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn server_codec_writes_one_json_line_per_envelope() {
        let mut codec = ServerCodec::default();
        let mut buf = BytesMut::new();
        codec.encode(&Envelope::server("hi"), &mut buf).unwrap();
        codec.encode(&Envelope::new("bob", "yo"), &mut buf).unwrap();
        assert_eq!(
            &buf[..],
            b"{\"msg\":\"hi\",\"username\":\"SERVER\"}\n{\"msg\":\"yo\",\"username\":\"bob\"}\n"
        );
    }

    #[test]
    fn client_codec_decodes_envelopes_and_survives_garbage() {
        let mut codec = ClientCodec::default();
        let mut buf = BytesMut::from(&b"garbage\n{\"msg\":\"HEARTBEAT\",\"username\":\"SERVER\"}\n"[..]);
        let first = codec.decode(&mut buf).unwrap().unwrap();
        assert!(matches!(first, Err(ProtocolError::Json(_))));
        let second = codec.decode(&mut buf).unwrap().unwrap().unwrap();
        assert!(second.is_heartbeat());
    }

    #[test]
    fn client_codec_terminates_lines() {
        let mut codec = ClientCodec::default();
        let mut buf = BytesMut::new();
        codec.encode("HEARTBEAT".to_string(), &mut buf).unwrap();
        codec.encode("QUIT\n".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"HEARTBEAT\nQUIT\n");
    }
}
