//! Bidirectional mapping between template text and generated unit text
//!
//! The generator appends both texts through this type, recording for each
//! appended piece whether it exists on the generated side, the generating
//! (template) side, or both. Diagnostics against the generated unit are then
//! resolved back to template positions.
//!
//! Segments are append-only and their ranges are contiguous on each side, so
//! a generated offset is resolved with one binary search plus, for segments
//! that have no text on one side, a hop along back-references to the nearest
//! segment that does.

use crate::location::{location_at, offset_at, Location};

#[derive(Debug, Clone)]
struct Segment {
    gen_start: usize,
    gen_end: usize,
    ging_start: usize,
    ging_end: usize,
    /// Nearest earlier segment with generated text.
    prev_generated: Option<usize>,
    /// Nearest earlier segment with generating text.
    prev_generating: Option<usize>,
}

impl Segment {
    fn has_generated(&self) -> bool {
        self.gen_end > self.gen_start
    }

    fn has_generating(&self) -> bool {
        self.ging_end > self.ging_start
    }
}

/// Position map built up while the unit is generated.
///
/// `generating` accumulates the template text that produced the unit and
/// `generated` accumulates the unit itself; for a successful build the
/// generating text equals the original template.
#[derive(Debug, Default)]
pub struct SourceMap {
    segments: Vec<Segment>,
    generated: String,
    generating: String,
    last_generated: Option<usize>,
    last_generating: Option<usize>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The synthesized unit text.
    pub fn generated_code(&self) -> &str {
        &self.generated
    }

    /// The template text consumed so far.
    pub fn generating_code(&self) -> &str {
        &self.generating
    }

    /// Template text copied into the unit unchanged.
    pub fn add_user_provided_code(&mut self, code: &str) {
        self.push(code, code);
    }

    /// Unit text with no template counterpart (boilerplate).
    pub fn add_generated_code_from_nil(&mut self, code: &str) {
        self.push(code, "");
    }

    /// Template text that produces no unit text (delimiters, comments).
    pub fn add_nil_generating_code(&mut self, code: &str) {
        self.push("", code);
    }

    /// Template text that appears in the unit in a different form.
    pub fn add_translated_code(&mut self, generating: &str, generated: &str) {
        self.push(generated, generating);
    }

    /// Template text copied into the unit through a character escaper.
    ///
    /// Unescaped runs become plain user-provided segments; each escaped
    /// character becomes its own translated segment, so positions inside a
    /// run stay exact and positions inside an escape resolve to the escaped
    /// character.
    pub fn add_escaped_user_provided_code(
        &mut self,
        text: &str,
        escape: impl Fn(char) -> Option<String>,
    ) {
        let mut plain = String::new();
        let mut buf = [0u8; 4];
        for c in text.chars() {
            match escape(c) {
                Some(escaped) => {
                    if !plain.is_empty() {
                        self.add_user_provided_code(&plain);
                        plain.clear();
                    }
                    self.add_translated_code(c.encode_utf8(&mut buf), &escaped);
                }
                None => plain.push(c),
            }
        }
        if !plain.is_empty() {
            self.add_user_provided_code(&plain);
        }
    }

    fn push(&mut self, generated: &str, generating: &str) {
        let gen_start = self.generated.len();
        let ging_start = self.generating.len();
        let segment = Segment {
            gen_start,
            gen_end: gen_start + generated.len(),
            ging_start,
            ging_end: ging_start + generating.len(),
            prev_generated: self.last_generated,
            prev_generating: self.last_generating,
        };
        let index = self.segments.len();
        if segment.has_generated() {
            self.last_generated = Some(index);
        }
        if segment.has_generating() {
            self.last_generating = Some(index);
        }
        self.generated.push_str(generated);
        self.generating.push_str(generating);
        self.segments.push(segment);
    }

    /// Resolve a byte offset in the generated unit to a template location.
    ///
    /// Offsets inside boilerplate resolve to the last template character
    /// that preceded it; offsets inside a translated segment clamp to the
    /// segment's template text, never past it.
    pub fn generating_location(&self, generated_offset: usize) -> Location {
        let candidate = self
            .segments
            .partition_point(|s| s.gen_start <= generated_offset);
        let Some(mut index) = candidate.checked_sub(1) else {
            return Location::start();
        };
        // Empty generated ranges share their start with the next segment;
        // hop back to the segment that actually holds the offset.
        let segment = loop {
            let s = &self.segments[index];
            if s.has_generated() {
                break s;
            }
            match s.prev_generated {
                Some(prev) => index = prev,
                None => return Location::start(),
            }
        };

        if !segment.has_generating() {
            return match segment.prev_generating {
                Some(prev) => {
                    let source = &self.segments[prev];
                    location_at(&self.generating, self.floor_generating(source.ging_end - 1))
                }
                None => Location::start(),
            };
        }

        let delta = generated_offset - segment.gen_start;
        let span = segment.ging_end - segment.ging_start;
        let target = segment.ging_start + delta.min(span - 1);
        location_at(&self.generating, self.floor_generating(target))
    }

    /// Resolve a one-based (line, column) in the generated unit.
    pub fn generating_location_at(&self, line: usize, column: usize) -> Location {
        self.generating_location(offset_at(&self.generated, line, column))
    }

    /// Location of a byte offset in the template text itself.
    pub fn location_in_generating(&self, generating_offset: usize) -> Location {
        location_at(&self.generating, generating_offset)
    }

    fn floor_generating(&self, mut offset: usize) -> usize {
        while offset > 0 && !self.generating.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }
}
