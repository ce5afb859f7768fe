use serde::{Deserialize, Serialize};
use std::fmt;

/// Plain concatenation with no delimiter: `["--a", "b"]` and `["--ab"]` collide.
pub fn join_flags(flags: &[String]) -> String {
    flags.concat()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListKey {
    pub filter: String,
    pub flags: String,
}

impl ListKey {
    pub fn new(filter: impl Into<String>, flags: &[String]) -> Self {
        Self {
            filter: filter.into(),
            flags: join_flags(flags),
        }
    }
}

impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listkey(filter={},flags={})", self.filter, self.flags)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiffKey {
    pub name: String,
    pub chart: String,
    pub flags: String,
}

impl DiffKey {
    pub fn new(name: impl Into<String>, chart: impl Into<String>, flags: &[String]) -> Self {
        Self {
            name: name.into(),
            chart: chart.into(),
            flags: join_flags(flags),
        }
    }
}

impl fmt::Display for DiffKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "diffkey(name={},chart={},flags={})",
            self.name, self.chart, self.flags
        )
    }
}
