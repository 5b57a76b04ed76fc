use std::fmt;
use std::hash::{Hash, Hasher};

use crate::SharedString;

/// Units of measurement for a [`Measure`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Count.
    Count,
    /// Seconds.
    Seconds,
    /// Milliseconds.
    ///
    /// One millisecond is equal to 1000 microseconds.
    Milliseconds,
    /// Microseconds.
    ///
    /// One microsecond is equal to 1000 nanoseconds.
    Microseconds,
    /// Bytes.
    Bytes,
}

impl Unit {
    /// Gets the string form of this `Unit`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Count => "count",
            Unit::Seconds => "s",
            Unit::Milliseconds => "ms",
            Unit::Microseconds => "us",
            Unit::Bytes => "bytes",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed quantity that can be recorded.
///
/// A measure is immutable once created. Its name is its identity: two
/// measures with the same name compare equal regardless of description, and a
/// recorded value is routed to views by measure name alone.
#[derive(Clone, Debug)]
pub struct Measure {
    name: SharedString,
    description: SharedString,
    unit: Unit,
}

impl Measure {
    /// Creates a `Measure`.
    pub fn new<N, D>(name: N, description: D, unit: Unit) -> Measure
    where
        N: Into<SharedString>,
        D: Into<SharedString>,
    {
        Measure { name: name.into(), description: description.into(), unit }
    }

    /// Name of this measure.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description of this measure.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Unit of this measure.
    pub fn unit(&self) -> Unit {
        self.unit
    }
}

impl PartialEq for Measure {
    fn eq(&self, other: &Measure) -> bool {
        self.name == other.name
    }
}

impl Eq for Measure {}

impl Hash for Measure {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.unit)
    }
}
