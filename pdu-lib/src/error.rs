/// Configuration problems detected while building or reconfiguring a
/// [Deframer](crate::deframer::Deframer).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unable to parse syncword '{pattern}' (must be base 2 or 16): invalid digit {digit:?}")]
    InvalidDigit { pattern: String, digit: char },

    #[error("syncword '{0}' has a base prefix but no digits")]
    MissingDigits(String),

    #[error("access code may only be empty in strict mode")]
    EmptyAccessCode,

    #[error("total burst length {burst_len} shorter than syncword(s) length {sync_len}")]
    BurstTooShort { burst_len: usize, sync_len: usize },

    #[error("burst length must be greater than zero")]
    ZeroBurstLength,

    #[error("unknown {kind} '{value}'")]
    UnknownName { kind: &'static str, value: String },
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
