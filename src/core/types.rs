/// Simulation clock value. The remanufacturing line counts minutes.
pub type SimTime = f64;

/// Identifier of a registered process.
///
/// Ids are handed out in registration order, and that order breaks ties
/// between wake-ups due at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(pub(crate) usize);

impl ProcessId {
    /// Registration index of the process
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}
