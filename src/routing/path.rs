//! URL path normalization.
//!
//! # Responsibilities
//! - Strip query and fragment, percent-decode
//! - Collapse `.` and `..` segments without touching the filesystem
//! - Reject anything that would climb above the root or inject a drive
//!
//! # Design Decisions
//! - `\` is a separator too, so `..\` cannot slip past the segment check
//! - Containment is checked per path component, never by string prefix,
//!   so a root of `/a` does not contain `/ab/x`

use std::fmt;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Why a URL path was refused before any filesystem lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathRejection {
    #[error("path climbs above the root")]
    EscapesRoot,

    #[error("path contains a forbidden segment")]
    ForbiddenSegment,
}

/// A request path reduced to root-relative segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    segments: Vec<String>,
}

impl RequestPath {
    /// Normalize a raw URL path.
    pub fn parse(raw: &str) -> Result<Self, PathRejection> {
        let end = raw.find(['?', '#']).unwrap_or(raw.len());
        let decoded = percent_decode_str(&raw[..end]).decode_utf8_lossy();

        let mut segments: Vec<String> = Vec::new();
        for segment in decoded.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(PathRejection::EscapesRoot);
                    }
                }
                s if s.contains('\0') || is_drive_prefix(s) => {
                    return Err(PathRejection::ForbiddenSegment)
                }
                s => segments.push(s.to_string()),
            }
        }

        Ok(Self { segments })
    }

    /// True for `/` (and anything that collapses to it).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether the last segment carries a file extension.
    pub fn has_extension(&self) -> bool {
        self.segments
            .last()
            .is_some_and(|last| Path::new(last).extension().is_some())
    }

    /// The path joined onto `root`.
    pub fn join_onto(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(&self.segments);
        path
    }

    /// The path joined onto `root` with `.ext` appended to the last segment.
    pub fn join_with_extension(&self, root: &Path, ext: &str) -> PathBuf {
        match self.segments.split_last() {
            Some((last, parents)) => {
                let mut path = root.to_path_buf();
                path.extend(parents);
                path.push(format!("{last}.{ext}"));
                path
            }
            None => root.to_path_buf(),
        }
    }
}

impl fmt::Display for RequestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// `C:`, `c:foo` and the like. Other colons are ordinary filename bytes.
fn is_drive_prefix(segment: &str) -> bool {
    matches!(segment.as_bytes(), [letter, b':', ..] if letter.is_ascii_alphabetic())
}

/// Whether `candidate` lies at or below `root`, compared per component.
pub fn is_within(root: &Path, candidate: &Path) -> bool {
    candidate.starts_with(root)
}
