//! Generation mode flags

use bitflags::bitflags;

bitflags! {
    /// What the generator should emit besides models.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GenerateMode: u8 {
        /// Generate the default query object
        const DEFAULT_QUERY = 1;
        /// Generate query interfaces
        const QUERY_INTERFACE = 1 << 1;
        /// Generate code without a context parameter
        const WITHOUT_CONTEXT = 1 << 2;
    }
}

impl GenerateMode {
    /// Parse `|`-separated mode names. Unknown names are ignored; an empty
    /// string yields the default set.
    pub fn parse(mode: &str) -> Self {
        if mode.trim().is_empty() {
            return Self::default();
        }
        mode.split('|')
            .fold(Self::empty(), |acc, name| match name.trim() {
                "DefaultQuery" => acc | Self::DEFAULT_QUERY,
                "QueryInterface" => acc | Self::QUERY_INTERFACE,
                "OutContext" => acc | Self::WITHOUT_CONTEXT,
                _ => acc,
            })
    }

    /// Mode names in flag order
    pub fn names(&self) -> Vec<&'static str> {
        [
            (Self::DEFAULT_QUERY, "DefaultQuery"),
            (Self::QUERY_INTERFACE, "QueryInterface"),
            (Self::WITHOUT_CONTEXT, "OutContext"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect()
    }
}

impl Default for GenerateMode {
    fn default() -> Self {
        Self::DEFAULT_QUERY | Self::QUERY_INTERFACE | Self::WITHOUT_CONTEXT
    }
}
