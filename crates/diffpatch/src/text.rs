//! Unified text diff patches.
//!
//! Text deltas carry a patch in the diff-match-patch text format:
//!
//! ```text
//! @@ -1,8 +1,9 @@
//!  hel
//! -l
//! +L
//! +l
//!  o wo
//! ```
//!
//! Each hunk line starts with ` ` (context), `-` (deletion) or `+`
//! (insertion), and its body is percent-encoded. All positions and lengths
//! are in Unicode scalar values (`char`s). Hunks are applied in order; a hunk
//! only applies where its context and deletions match the text exactly.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::PatchError;

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+),?(\d*) \+(\d+),?(\d*) @@$").expect("hunk header pattern is valid")
});

// ── Types ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOpType {
    Del = -1,
    Eql = 0,
    Ins = 1,
}

pub type PatchOperation = (PatchOpType, String);

/// One `@@ … @@` hunk.
#[derive(Debug, Clone, PartialEq)]
pub struct Hunk {
    pub start1: usize,
    pub length1: usize,
    pub start2: usize,
    pub length2: usize,
    pub ops: Vec<PatchOperation>,
}

impl Hunk {
    /// The text this hunk expects to find: context plus deletions.
    pub fn source_text(&self) -> Vec<char> {
        self.collect(PatchOpType::Del)
    }

    /// The text this hunk leaves behind: context plus insertions.
    pub fn target_text(&self) -> Vec<char> {
        self.collect(PatchOpType::Ins)
    }

    fn collect(&self, side: PatchOpType) -> Vec<char> {
        self.ops
            .iter()
            .filter(|(op, _)| *op == PatchOpType::Eql || *op == side)
            .flat_map(|(_, text)| text.chars())
            .collect()
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────

/// Parse the textual form of a patch into hunks.
pub fn parse_patch(text: &str) -> Result<Vec<Hunk>, PatchError> {
    let mut hunks = Vec::new();
    let mut lines = text.split('\n').peekable();
    while let Some(line) = lines.next() {
        if line.is_empty() {
            continue;
        }
        let caps = HUNK_HEADER
            .captures(line)
            .ok_or_else(|| PatchError::TextPatchParse(format!("invalid hunk header `{line}`")))?;
        let (start1, length1) = header_range(&caps[1], &caps[2])?;
        let (start2, length2) = header_range(&caps[3], &caps[4])?;

        let mut ops = Vec::new();
        while let Some(&next) = lines.peek() {
            let op = match next.chars().next() {
                None => {
                    lines.next();
                    continue;
                }
                Some('@') => break,
                Some('-') => PatchOpType::Del,
                Some('+') => PatchOpType::Ins,
                Some(' ') => PatchOpType::Eql,
                Some(other) => {
                    return Err(PatchError::TextPatchParse(format!("invalid patch mode `{other}`")))
                }
            };
            ops.push((op, decode_line(&next[1..])?));
            lines.next();
        }
        hunks.push(Hunk { start1, length1, start2, length2, ops });
    }
    Ok(hunks)
}

/// Header coordinates are 1-based, except that an empty range names the
/// position it sits at.
fn header_range(start: &str, length: &str) -> Result<(usize, usize), PatchError> {
    let start: usize = start
        .parse()
        .map_err(|_| PatchError::TextPatchParse(format!("invalid hunk start `{start}`")))?;
    match length {
        "" => Ok((start.saturating_sub(1), 1)),
        "0" => Ok((start, 0)),
        n => n
            .parse()
            .map(|len| (start.saturating_sub(1), len))
            .map_err(|_| PatchError::TextPatchParse(format!("invalid hunk length `{n}`"))),
    }
}

fn decode_line(raw: &str) -> Result<String, PatchError> {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| PatchError::TextPatchParse(e.to_string()))
}

// ── Application ───────────────────────────────────────────────────────────

/// Parse `patch_text` and apply it to `src`.
pub fn apply_patch(src: &str, patch_text: &str) -> Result<String, PatchError> {
    let hunks = parse_patch(patch_text)?;
    apply_hunks(src, &hunks)
}

/// Apply hunks in order. Each hunk is looked up at its expected position,
/// shifted by how far earlier hunks landed from theirs, and otherwise at
/// the nearest exact occurrence of its source text.
pub fn apply_hunks(src: &str, hunks: &[Hunk]) -> Result<String, PatchError> {
    let mut text: Vec<char> = src.chars().collect();
    let mut drift: isize = 0;
    for (n, hunk) in hunks.iter().enumerate() {
        let before = hunk.source_text();
        let after = hunk.target_text();
        let expected = (hunk.start2 as isize + drift).max(0) as usize;
        let at = locate(&text, &before, expected).ok_or(PatchError::TextPatchFailed { hunk: n })?;
        drift += at as isize - expected as isize;
        text.splice(at..at + before.len(), after);
    }
    Ok(text.into_iter().collect())
}

fn locate(text: &[char], needle: &[char], expected: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(expected.min(text.len()));
    }
    if needle.len() > text.len() {
        return None;
    }
    let fits = |at: usize| text.get(at..at + needle.len()) == Some(needle);
    if fits(expected) {
        return Some(expected);
    }
    (0..=text.len() - needle.len())
        .filter(|&at| fits(at))
        .min_by_key(|&at| at.abs_diff(expected))
}

// ── Tests ─────────────────────────────────────────────────────────────────
