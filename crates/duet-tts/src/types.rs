/// One line of text to speak in one voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    /// Text to synthesize into speech
    pub input: String,
    /// Voice identifier (e.g. "alloy" or an `ElevenLabs` voice ID)
    pub voice: String,
}

impl SpeechRequest {
    pub fn new(input: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            voice: voice.into(),
        }
    }
}

/// Raw audio response from a TTS provider
#[derive(Debug, Clone)]
pub struct SpeechResponse {
    /// Raw audio bytes
    pub audio: Vec<u8>,
    /// Content type of the audio (e.g. "audio/mpeg")
    pub content_type: String,
}
