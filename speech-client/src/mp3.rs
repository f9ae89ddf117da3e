//! MP3 stream sniffing

use crate::error::{Result, SpeechError};

/// MIME type of every artifact produced by this crate
pub const MIME_TYPE: &str = "audio/mpeg";

/// Check whether bytes start like an MP3 stream: an ID3v2 tag or an MPEG
/// audio frame sync (11 set bits).
pub fn looks_like_mp3(bytes: &[u8]) -> bool {
    match bytes {
        [b'I', b'D', b'3', ..] => true,
        [0xFF, second, ..] => second & 0xE0 == 0xE0,
        _ => false,
    }
}

/// Reject responses that are empty or not MP3 audio
pub fn ensure_mp3(bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        return Err(SpeechError::InvalidAudio("empty response".to_string()));
    }

    if !looks_like_mp3(bytes) {
        let head = &bytes[..bytes.len().min(4)];
        return Err(SpeechError::InvalidAudio(format!(
            "response is not MP3 audio (starts with {:02x?})",
            head
        )));
    }

    Ok(())
}
