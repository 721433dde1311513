use std::str::Utf8Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error("type code '{code}' has no native mapping: {reason}")]
    UnsupportedKind { code: char, reason: &'static str },
    #[error("expected signature \"{expected}\", found \"{found}\"")]
    ProtocolMismatch { expected: String, found: String },
    #[error("read past end of buffer at index {0}")]
    IndexOutOfBounds(usize),
    #[error("array element ran to {0}, past array end {1}")]
    ArrayElementOverrun(usize, usize),
    #[error("array of {0} bytes exceeds the 64 MiB limit")]
    ArrayTooLong(usize),
    #[error("{0} bytes of leftover data")]
    LeftoverData(usize),
    #[error("boolean value {0} is neither 0 nor 1")]
    InvalidBoolValue(u32),
    #[error("string is not valid UTF-8")]
    Utf8(#[from] Utf8Error),
    #[error("text of {0} bytes does not fit its length prefix")]
    TextTooLong(usize),
    #[error("string is missing its nul terminator")]
    MissingNul,
    #[error("string contains an interior nul byte")]
    InteriorNul,
    #[error("invalid object path \"{0}\"")]
    InvalidObjectPath(String),
    #[error("variants nested deeper than {0} levels")]
    VariantDepth(usize),
    #[error("no generated procedure named {0}")]
    UnknownProcedure(String),
    #[error("value of signature \"{found}\" does not fit \"{expected}\"")]
    ValueShape { expected: String, found: String },
}

/// Malformed signature text. Offsets are byte offsets into the signature.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("signature is empty")]
    Empty,
    #[error("signature is {0} bytes long, the limit is 255")]
    TooLong(usize),
    #[error("unknown type code '{code}' at offset {offset}")]
    UnknownCode { code: char, offset: usize },
    #[error("'{open}' at offset {offset} is never closed")]
    Unbalanced { open: char, offset: usize },
    #[error("unexpected '{found}' at offset {offset}")]
    UnexpectedClose { found: char, offset: usize },
    #[error("array at offset {offset} has no element type")]
    MissingElement { offset: usize },
    #[error("dict entry at offset {offset} has {count} members, expected 2")]
    DictEntryArity { offset: usize, count: usize },
    #[error("dict entry at offset {offset} is not directly inside an array")]
    DictEntryOutsideArray { offset: usize },
    #[error("dict entry key at offset {offset} is not a basic type")]
    NonBasicKey { offset: usize },
    #[error("empty struct at offset {offset}")]
    EmptyStruct { offset: usize },
    #[error("{kind} nesting exceeds 32 levels at offset {offset}")]
    TooDeep { kind: &'static str, offset: usize },
    #[error("trailing input at offset {offset}")]
    Trailing { offset: usize },
}
