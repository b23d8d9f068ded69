//! Classification of inbound framing errors.

use chat_proto::ProtocolError;

/// What the read loop should do about a frame that failed to decode.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum ReadErrorAction {
    /// Line exceeded the limit and was discarded; tell the client and continue.
    InputTooLong,
    /// Line was unreadable (bad UTF-8); drop it silently and continue.
    Skip,
    /// Transport is broken.
    IoError,
}

pub(super) fn classify_read_error(e: &ProtocolError) -> ReadErrorAction {
    match e {
        ProtocolError::LineTooLong { .. } => ReadErrorAction::InputTooLong,
        ProtocolError::Io(_) => ReadErrorAction::IoError,
        _ if e.is_recoverable() => ReadErrorAction::Skip,
        _ => ReadErrorAction::IoError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn framing_errors_are_recoverable() {
        let too_long = ProtocolError::LineTooLong {
            actual: 10,
            limit: 4,
        };
        assert_eq!(classify_read_error(&too_long), ReadErrorAction::InputTooLong);

        let bad_utf8 = ProtocolError::InvalidUtf8 {
            byte_pos: 0,
            details: "invalid".into(),
        };
        assert_eq!(classify_read_error(&bad_utf8), ReadErrorAction::Skip);
    }

    #[test]
    fn io_errors_end_the_connection() {
        let err = ProtocolError::Io(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert_eq!(classify_read_error(&err), ReadErrorAction::IoError);
    }
}
