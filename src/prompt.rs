// The instruction prompt sent with every analysis request

use crate::error::{AnalyzerError, Result};
use std::path::Path;

/// Default instruction: a strictly observational description of a technical
/// museum object. Injectable, not baked into the call logic — callers may
/// load an alternate prompt from a file.
pub const DEFAULT_PROMPT: &str = r#"Objective:
Generate a concise, strictly objective description of the technical museum object
shown in the uploaded images. The description must be based **only on visible evidence**
in the images. Do not speculate or invent any information.

Rules:
- Describe exclusively what can be clearly observed (shape, materials, labels, markings).
- Do not add assumptions about usage, origin, or history unless explicitly visible or labeled.
- If details are unclear or not visible, omit them entirely.
- Avoid subjective or interpretive language (no "probably", "might be", "appears to").
- Length: As detailed as possible, but only as long as factual content allows.
  (If only a few facts are visible, keep the text short.)

Required Structure & Content:
1. Identification (only if visibly labeled; otherwise omit)
2. Physical Characteristics (size impression, materials, form, color, condition)
3. Technical Function (only if clearly deducible from visible features; otherwise omit)
4. Distinguishing Details (markings, numbers, accessories, engineering evidence)

Output:
- Write a cohesive, integrated description in English.
"#;

/// Load a prompt override from a file
pub fn load_prompt(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)?;
    let text = text.trim();
    if text.is_empty() {
        return Err(AnalyzerError::Config(format!(
            "prompt file {} is empty",
            path.display()
        )));
    }
    Ok(text.to_string())
}
