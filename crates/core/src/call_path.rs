//! Call-site paths used to align state and exports across devices.

use std::fmt;

/// One step of a call path: a named call site and how many times that name
/// was already reached under the same parent during the current round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Segment {
    name: &'static str,
    occurrence: u32,
}

impl Segment {
    /// Create a segment.
    pub fn new(name: &'static str, occurrence: u32) -> Self {
        Self { name, occurrence }
    }

    /// Call-site name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Occurrence index under the parent path.
    pub fn occurrence(&self) -> u32 {
        self.occurrence
    }
}

/// Position in the program, from the root scope down to a call site.
///
/// Two devices exchange a value only when they produced it at equal paths,
/// so a branch executed by some devices never sees values from devices that
/// took the other branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallPath(Vec<Segment>);

impl CallPath {
    /// The empty path.
    pub fn root() -> Self {
        Self::default()
    }

    /// A new path one segment below this one.
    pub fn child(&self, name: &'static str, occurrence: u32) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::new(name, occurrence));
        Self(segments)
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The segments, outermost first.
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// The innermost segment.
    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    pub(crate) fn pop(&mut self) -> Option<Segment> {
        self.0.pop()
    }

    pub(crate) fn truncate(&mut self, depth: usize) {
        self.0.truncate(depth);
    }
}

impl fmt::Display for CallPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.0 {
            write!(f, "/{}#{}", segment.name, segment.occurrence)?;
        }
        Ok(())
    }
}
