use thiserror::Error;

/// Failures of named parameter binding and placeholder rewriting. Offsets
/// are byte positions in the query text where the offending region opens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    #[error("named bind: nil params")]
    NilParameters,
    #[error("named bind: params must be a record or a text-keyed map, got {0}")]
    UnsupportedArgument(&'static str),
    #[error("named bind: duplicate key {0:?} from record tags/fields")]
    DuplicateKey(String),
    #[error("named bind: missing value for :{0}")]
    MissingValue(String),
    #[error("unterminated single-quoted string at byte {offset}")]
    UnterminatedLiteral { offset: usize },
    #[error("unterminated {quote}-quoted identifier at byte {offset}")]
    UnterminatedIdentifier { quote: char, offset: usize },
    #[error("unterminated block comment at byte {offset}")]
    UnterminatedComment { offset: usize },
    #[error("unterminated dollar-quoted string {tag} at byte {offset}")]
    UnterminatedDollarBlock { tag: String, offset: usize },
}
