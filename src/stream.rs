// Reassembles a line-streamed generate response into one answer string

use serde::Deserialize;

/// Returned instead of an empty string when no line of the stream carried
/// any text, so callers can tell "nothing received" from "received empty
/// text".
pub const NO_RESPONSE: &str = "No response received from the model.";

/// One line of the stream. The server emits a self-contained JSON object per
/// decoding step; only `response` matters here, the final line carries
/// `done` and no text.
#[derive(Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    done: bool,
}

/// Incremental accumulator for streamed response lines.
///
/// A line that is blank, not valid JSON, truncated, or simply missing the
/// `response` field contributes nothing and is skipped. Skipping is the
/// contract: one corrupt line must never abort the whole stream or surface
/// to the caller.
#[derive(Default)]
pub struct Reassembler {
    text: String,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw line. Returns true when the line carried a text delta.
    pub fn push_line(&mut self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return false;
        }
        match serde_json::from_str::<GenerateChunk>(line) {
            Ok(GenerateChunk {
                response: Some(delta),
                ..
            }) => {
                self.text.push_str(&delta);
                true
            }
            // done-marker or a chunk without a text field
            Ok(_) => false,
            Err(e) => {
                log::debug!("skipping undecodable stream line: {e}");
                false
            }
        }
    }

    /// Consume the accumulator; an empty accumulation yields the sentinel.
    pub fn finish(self) -> String {
        if self.text.is_empty() {
            NO_RESPONSE.to_string()
        } else {
            self.text
        }
    }
}

/// Reassemble a finite sequence of already-split lines in input order.
pub fn reassemble<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut acc = Reassembler::new();
    for line in lines {
        acc.push_line(line.as_ref());
    }
    acc.finish()
}
