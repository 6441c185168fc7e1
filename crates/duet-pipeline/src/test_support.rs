//! Fixtures and fake collaborators shared by unit tests

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use duet_core::{DraftLine, GenerationParams, Script, Section, SourceDocument};
use duet_llm::{CompletionRequest, CompletionResponse, LlmError, Provider, Usage};
use duet_source::{ContentSource, DocumentQuery, SourceError};
use duet_tts::{SpeechRequest, SpeechResponse, TtsError, TtsProvider};

use crate::validator::{ScriptMeta, validate};

const SENTENCES: &[&str] = &[
    "Today we are talking about how plants turn sunlight into the sugar that keeps nearly every food chain on Earth running.",
    "That sounds enormous, so where does the process actually start inside a leaf?",
    "It starts in the chloroplasts, tiny green structures packed with chlorophyll that absorbs red and blue light very efficiently.",
    "So the green colour we see is really the light the plant does not want to use?",
    "Exactly, the reflected green light is leftover, while the absorbed energy splits water molecules and releases oxygen as a by-product.",
    "And the oxygen we breathe comes from that splitting step rather than from the carbon dioxide the plant takes in?",
];

pub fn draft(index: u32, speaker: &str, section: Section, text: &str) -> DraftLine {
    DraftLine {
        index,
        speaker: speaker.to_string(),
        text: text.to_string(),
        section,
    }
}

/// `n` alternating lines: three opening lines, one closing line, the
/// middle split evenly across the remaining sections
pub fn well_formed_draft(n: u32) -> Vec<DraftLine> {
    let middle = n.saturating_sub(4).max(1);
    (1..=n)
        .map(|index| {
            let section = if index <= 3 {
                Section::Opening
            } else if index == n {
                Section::Closing
            } else {
                match (index - 4) * 3 / middle {
                    0 => Section::CoreExplanation,
                    1 => Section::Elaboration,
                    _ => Section::InteractiveExchange,
                }
            };
            let speaker = if index % 2 == 1 { "host" } else { "guest" };
            let text = SENTENCES[(index as usize - 1) % SENTENCES.len()];
            draft(index, speaker, section, text)
        })
        .collect()
}

pub fn sample_meta() -> ScriptMeta {
    ScriptMeta {
        title: "Photosynthesis".to_string(),
        source_url: "https://en.wikipedia.org/wiki/Photosynthesis".to_string(),
        params: GenerationParams {
            provider: "fake".to_string(),
            model: "fake-model".to_string(),
            prompt_version: "v1".to_string(),
            ..GenerationParams::default()
        },
        created_at: "2024-06-01T12:00:00Z".parse().expect("valid timestamp"),
    }
}

pub fn sample_script() -> Script {
    validate(well_formed_draft(12), sample_meta()).expect("fixture script is valid")
}

/// Model output for [`well_formed_draft`] in the JSON shape the writer expects
pub fn draft_json(lines: &[DraftLine]) -> String {
    let lines: Vec<serde_json::Value> = lines
        .iter()
        .map(|line| {
            serde_json::json!({
                "speaker": line.speaker,
                "section": line.section.as_str(),
                "text": line.text,
            })
        })
        .collect();
    serde_json::json!({ "lines": lines }).to_string()
}

/// Content source returning a fixed document or error
pub struct FakeSource {
    pub result: Mutex<Option<Result<SourceDocument, SourceError>>>,
}

impl FakeSource {
    pub fn document() -> Self {
        let text = SENTENCES.join(" ").repeat(10);
        Self {
            result: Mutex::new(Some(Ok(SourceDocument::new(
                "Photosynthesis",
                "https://en.wikipedia.org/wiki/Photosynthesis",
                text,
            )))),
        }
    }

    pub fn failing(error: SourceError) -> Self {
        Self {
            result: Mutex::new(Some(Err(error))),
        }
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn fetch(&self, _query: &DocumentQuery) -> duet_source::Result<SourceDocument> {
        self.result
            .lock()
            .expect("lock")
            .take()
            .unwrap_or_else(|| Err(SourceError::Unavailable("fixture already consumed".to_string())))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Language model replaying queued replies
pub struct FakeLlm {
    pub replies: Mutex<VecDeque<Result<Option<String>, LlmError>>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeLlm {
    pub fn replying(content: impl Into<String>) -> Self {
        Self::queue(vec![Ok(Some(content.into()))])
    }

    pub fn queue(replies: Vec<Result<Option<String>, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Provider for FakeLlm {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().expect("lock").push(request.clone());
        let content = self
            .replies
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Upstream("no reply queued".to_string())))?;

        Ok(CompletionResponse {
            id: "fake-1".to_string(),
            model: request.model.clone(),
            content,
            finish_reason: None,
            usage: Usage::default(),
        })
    }
}

/// Speech provider that fails the calls whose 1-based numbers are listed
pub struct FakeTts {
    pub calls: AtomicUsize,
    fail_calls: Vec<usize>,
    always_fail: bool,
    pub voices: Mutex<Vec<String>>,
}

impl FakeTts {
    pub fn healthy() -> Self {
        Self::failing_calls(Vec::new())
    }

    pub fn failing_calls(fail_calls: Vec<usize>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_calls,
            always_fail: false,
            voices: Mutex::new(Vec::new()),
        }
    }

    pub fn broken() -> Self {
        Self {
            always_fail: true,
            ..Self::healthy()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TtsProvider for FakeTts {
    async fn synthesize(&self, request: SpeechRequest) -> duet_tts::Result<SpeechResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.voices.lock().expect("lock").push(request.voice.clone());

        if self.always_fail || self.fail_calls.contains(&call) {
            return Err(TtsError::ProviderApiError {
                status: 503,
                message: format!("call {call} failed"),
            });
        }

        Ok(SpeechResponse {
            audio: format!("audio for: {}", request.input).into_bytes(),
            content_type: "audio/mpeg".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "fake"
    }

    fn file_extension(&self) -> &'static str {
        "mp3"
    }
}

/// Write an executable shell script
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, format!("#!/bin/sh\n{body}\n")).expect("write stub");
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).expect("chmod stub");
}

/// `ffmpeg` stand-in: answers `-version`, copies the concat list to the
/// output path, and appends any extra stderr given in `stderr`
#[cfg(unix)]
pub fn fake_ffmpeg(dir: &Path, stderr: &str, exit_code: i32) -> std::path::PathBuf {
    let path = dir.join("ffmpeg");
    write_script(
        &path,
        &format!(
            r#"if [ "$1" = "-version" ]; then echo "ffmpeg version stub"; exit 0; fi
list=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-i" ]; then list="$arg"; fi
  prev="$arg"
  out="$arg"
done
cp "$list" "$out"
printf '%s' "{stderr}" >&2
exit {exit_code}"#
        ),
    );
    path
}

/// `ffprobe` stand-in reporting a fixed duration
#[cfg(unix)]
pub fn fake_ffprobe(dir: &Path, duration: &str) -> std::path::PathBuf {
    let path = dir.join("ffprobe");
    write_script(
        &path,
        &format!(
            r#"if [ "$1" = "-version" ]; then echo "ffprobe version stub"; exit 0; fi
echo "{duration}""#
        ),
    );
    path
}
