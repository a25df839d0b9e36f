use std::fmt;

#[derive(Debug)]
pub enum PlanoError {
    Telegram(String),
    Llm { provider: String, message: String },
    Embedding(String),
    Database(String),
    Retrieval(String),
    Config(String),
    Server(String),
    Http { status: u16, body: String },
}

impl fmt::Display for PlanoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Telegram(msg) => write!(f, "telegram error: {msg}"),
            Self::Llm { provider, message } => write!(f, "llm error ({provider}): {message}"),
            Self::Embedding(msg) => write!(f, "embedding error: {msg}"),
            Self::Database(msg) => write!(f, "database error: {msg}"),
            Self::Retrieval(msg) => write!(f, "retrieval error: {msg}"),
            Self::Config(msg) => write!(f, "config error: {msg}"),
            Self::Server(msg) => write!(f, "server error: {msg}"),
            Self::Http { status, body } => write!(f, "http error ({status}): {body}"),
        }
    }
}

impl std::error::Error for PlanoError {}

pub type Result<T> = std::result::Result<T, PlanoError>;
