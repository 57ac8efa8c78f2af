use serde::{Deserialize, Serialize};

/// Every response body: a human-readable status line and the payload, or
/// `null` when there is none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub message: String,
    pub body: Option<T>,
}

impl<T> Envelope<T> {
    pub fn success(operation: Operation, body: T) -> Self {
        Self {
            message: operation.success_message().to_string(),
            body: Some(body),
        }
    }
}

impl Envelope<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            body: None,
        }
    }
}

/// The four data operations a resource exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub fn success_message(self) -> &'static str {
        match self {
            Operation::List => "get data success",
            Operation::Insert => "post data success",
            Operation::Update => "put data success",
            Operation::Delete => "delete data success",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::List => "can't get data from database",
            Operation::Insert => "error post to db",
            Operation::Update => "error put to db",
            Operation::Delete => "error delete to db",
        }
    }
}
