pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A parenthesised schema group did not hold exactly three non-empty elements.
    #[error("Can't extract schema from tuple `({tuple})`: expected `(source, relation, destination)`")]
    MalformedSchema { tuple: String },

    #[error("Schema text contains no `(source, relation, destination)` tuples")]
    EmptySchema,
}
