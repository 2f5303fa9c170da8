/// Error types for the Leadflow pipeline
use thiserror::Error;

/// Low-level failure classes reported by a mail transport.
///
/// The first four kinds are network-level conditions worth retrying; every
/// other kind is terminal for the message being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// Connection was refused by the SMTP host.
    ConnectionRefused,
    /// Connecting or talking to the SMTP host timed out.
    ConnectionTimedOut,
    /// The SMTP host name did not resolve.
    HostNotFound,
    /// Generic socket failure (reset, broken pipe, unexpected EOF).
    Socket,
    /// TLS negotiation failed.
    Tls,
    /// The server rejected the configured credentials.
    Auth,
    /// Sender or recipient address was rejected while building the message.
    BadAddress,
    /// The server answered with a rejection the client cannot repair.
    Response,
    /// Anything else.
    Other,
}

impl TransportErrorKind {
    /// Determines whether an error of this kind is worth another attempt
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionRefused | Self::ConnectionTimedOut | Self::HostNotFound | Self::Socket
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionRefused => "connection_refused",
            Self::ConnectionTimedOut => "connection_timed_out",
            Self::HostNotFound => "host_not_found",
            Self::Socket => "socket",
            Self::Tls => "tls",
            Self::Auth => "auth",
            Self::BadAddress => "bad_address",
            Self::Response => "response",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified mail-transport failure.
///
/// The message text is transport detail only (no lead content) and is safe
/// to log.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn is_retriable(&self) -> bool {
        self.kind.is_retriable()
    }

    /// Classifies a lettre SMTP error into the transport taxonomy.
    ///
    /// Network-level conditions are read off the std::io::Error in the
    /// source chain; server responses are terminal.
    pub fn from_smtp(err: lettre::transport::smtp::Error) -> Self {
        let kind = classify_smtp(&err);
        Self::new(kind, err.to_string())
    }
}

fn classify_smtp(err: &lettre::transport::smtp::Error) -> TransportErrorKind {
    if err.is_timeout() {
        return TransportErrorKind::ConnectionTimedOut;
    }
    if let Some(io_err) = find_io_error(err) {
        return classify_io(io_err);
    }
    if err.is_tls() {
        return TransportErrorKind::Tls;
    }
    if err.is_permanent() {
        // 535 = authentication credentials invalid
        let text = err.to_string();
        if text.contains("535") || text.to_ascii_lowercase().contains("auth") {
            return TransportErrorKind::Auth;
        }
        return TransportErrorKind::Response;
    }
    if err.is_transient() || err.is_response() {
        return TransportErrorKind::Response;
    }
    TransportErrorKind::Other
}

fn find_io_error<'a>(err: &'a (dyn std::error::Error + 'static)) -> Option<&'a std::io::Error> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<std::io::Error>() {
            return Some(io_err);
        }
        source = cause.source();
    }
    None
}

fn classify_io(err: &std::io::Error) -> TransportErrorKind {
    use std::io::ErrorKind;

    match err.kind() {
        ErrorKind::ConnectionRefused => TransportErrorKind::ConnectionRefused,
        ErrorKind::TimedOut | ErrorKind::WouldBlock => TransportErrorKind::ConnectionTimedOut,
        ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::BrokenPipe
        | ErrorKind::NotConnected
        | ErrorKind::UnexpectedEof => TransportErrorKind::Socket,
        _ => {
            // getaddrinfo failures surface as uncategorized io errors
            let text = err.to_string().to_ascii_lowercase();
            if text.contains("lookup") || text.contains("resolve") || text.contains("name") {
                TransportErrorKind::HostNotFound
            } else {
                TransportErrorKind::Socket
            }
        }
    }
}
