//! Structural glob matching for archive paths
//!
//! Only the subset the layouts need is supported: `**` as a whole segment
//! (any number of segments, including none) and segment patterns made of
//! literals and `*` (any run of characters inside one segment). Patterns are
//! compiled once and matched segment by segment, case-insensitively.

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    AnyDepth,
    Pattern(Vec<Piece>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Star,
}

/// A compiled glob pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glob {
    segments: Vec<Segment>,
}

impl Glob {
    /// Compile a pattern such as `**/*.reds` or `*.archive`
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split(['/', '\\'])
            .filter(|s| !s.is_empty())
            .map(|segment| {
                if segment == "**" {
                    Segment::AnyDepth
                } else {
                    Segment::Pattern(compile_segment(segment))
                }
            })
            .collect();

        Self { segments }
    }

    /// Every file at any depth
    pub fn any() -> Self {
        Self::new("**")
    }

    /// Files directly in the base directory
    pub fn direct() -> Self {
        Self::new("*")
    }

    /// Match a relative path (segments separated by `/`)
    pub fn matches(&self, relative: &str) -> bool {
        let parts: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
        match_from(&self.segments, &parts)
    }
}

fn compile_segment(segment: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut literal = String::new();

    for ch in segment.chars() {
        if ch == '*' {
            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            if pieces.last() != Some(&Piece::Star) {
                pieces.push(Piece::Star);
            }
        } else {
            literal.push(ch.to_ascii_lowercase());
        }
    }
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }

    pieces
}

fn match_from(segments: &[Segment], parts: &[&str]) -> bool {
    match segments.split_first() {
        None => parts.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            (0..=parts.len()).any(|skip| match_from(rest, &parts[skip..]))
        }
        Some((Segment::Pattern(pieces), rest)) => match parts.split_first() {
            Some((part, remaining)) => {
                match_segment(pieces, &part.to_ascii_lowercase()) && match_from(rest, remaining)
            }
            None => false,
        },
    }
}

fn match_segment(pieces: &[Piece], text: &str) -> bool {
    match pieces.split_first() {
        None => text.is_empty(),
        Some((Piece::Literal(lit), rest)) => text
            .strip_prefix(lit.as_str())
            .is_some_and(|remaining| match_segment(rest, remaining)),
        Some((Piece::Star, rest)) => {
            if rest.is_empty() {
                return true;
            }
            text.char_indices()
                .map(|(idx, _)| idx)
                .chain(std::iter::once(text.len()))
                .any(|idx| match_segment(rest, &text[idx..]))
        }
    }
}
