use teloxide::types::ChatId;
use thiserror::Error;

/// Failure to understand the arguments of an /ekle command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("bir tarih ve bir not bekliyorum")]
    MissingArguments,
    #[error("tarih anlasilamadi: {0:?}")]
    InvalidDate(String),
    #[error("saat anlasilamadi: {0:?}")]
    InvalidTime(String),
    #[error("{day:02}.{month:02}.{year} gecerli bir tarih degil")]
    NoSuchDate { day: u32, month: u32, year: i32 },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not read reminder file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("reminder file {path} is malformed")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not write reminder file {path}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
#[error("could not deliver message to chat {chat_id}")]
pub struct DeliveryError {
    pub chat_id: ChatId,
    #[source]
    pub source: teloxide::RequestError,
}
