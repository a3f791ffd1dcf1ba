#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixOptions {
    /// Return `""` when no triple in the query matched the schema.
    pub empty_when_unmatched: bool,
    /// Reject schema text that holds no tuples instead of treating it as an empty schema.
    pub require_schema: bool,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self::strict()
    }
}

impl FixOptions {
    /// Unmatched queries collapse to `""`.
    pub fn strict() -> Self {
        Self {
            empty_when_unmatched: true,
            require_schema: false,
        }
    }

    /// Unmatched queries are returned unchanged.
    pub fn lenient() -> Self {
        Self {
            empty_when_unmatched: false,
            ..Self::strict()
        }
    }

    pub fn with_require_schema(mut self, require_schema: bool) -> Self {
        self.require_schema = require_schema;
        self
    }
}
