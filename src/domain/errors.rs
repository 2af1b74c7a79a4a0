use std::fmt;

// Fallback shown when the backend gives no usable message.
const GENERIC_FAILURE: &str = "request failed";

/// Client-side checks that stop a request before it reaches the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    BlankContent,
    BlankAuthor,
    ContentTooLong { len: usize, max: usize },
    BlankEmail,
    BlankPassword,
    BlankNickname,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::BlankContent => write!(f, "content is required"),
            ValidationError::BlankAuthor => write!(f, "author is required"),
            ValidationError::ContentTooLong { len, max } => {
                write!(f, "content is {len} characters, the limit is {max}")
            }
            ValidationError::BlankEmail => write!(f, "email is required"),
            ValidationError::BlankPassword => write!(f, "password is required"),
            ValidationError::BlankNickname => write!(f, "nickname is required"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Failure of a backend or analysis call, as seen by the use cases.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The request never got a response (connect, timeout, TLS).
    Transport(String),
    /// Non-success status, with the envelope message when one could be parsed.
    Upstream {
        status: u16,
        message: Option<String>,
    },
    /// A success response whose body did not match the expected shape.
    Decode(String),
    Validation(ValidationError),
}

impl ClientError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(_) => "could not reach the server".to_string(),
            ClientError::Upstream {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ClientError::Upstream { .. } => GENERIC_FAILURE.to_string(),
            ClientError::Decode(_) => "unexpected response from the server".to_string(),
            ClientError::Validation(err) => err.to_string(),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(err) => write!(f, "transport error: {err}"),
            ClientError::Upstream { status, message } => {
                if let Some(message) = message {
                    write!(f, "upstream error {status}: {message}")
                } else {
                    write!(f, "upstream error {status}")
                }
            }
            ClientError::Decode(err) => write!(f, "response decode error: {err}"),
            ClientError::Validation(err) => write!(f, "validation error: {err}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Validation(err)
    }
}

/// Errors from the sign-up / log-in / log-out workflows.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    Client(ClientError),
    StorageFailure,
}

impl SessionError {
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Client(err) => err.user_message(),
            SessionError::StorageFailure => "could not access the saved session".to_string(),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Client(err) => write!(f, "{err}"),
            SessionError::StorageFailure => write!(f, "token storage failure"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ClientError> for SessionError {
    fn from(err: ClientError) -> Self {
        SessionError::Client(err)
    }
}

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        SessionError::Client(ClientError::Validation(err))
    }
}
