//! Error taxonomy for the PayDollar protocol layer.
//!
//! Configuration and parse failures are raised to the immediate caller and
//! never retried here; a processor-declined transaction is not an error but a
//! parsed response with `success == false`.

/// Type alias for `Result` with an [`error_stack::Report`] error.
pub type CustomResult<T, E> = Result<T, error_stack::Report<E>>;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PaydollarError {
    /// A required option was absent after merging call-site options over the
    /// gateway defaults. Checked before any network interaction.
    #[error("Missing required option: {option}")]
    MissingRequiredOption { option: &'static str },
    /// The transport collaborator reported a network or TLS failure.
    #[error("Transport request failed")]
    TransportFailed,
    #[error("Failed to encode request body")]
    RequestEncodingFailed,
    /// A query-string response carried neither `successcode` nor `resultCode`.
    #[error("Response carries no success indicator")]
    MissingSuccessIndicator,
    /// A query-string response carried no `errMsg` field.
    #[error("Response carries no errMsg field")]
    MissingMessageField,
    #[error("Failed to parse XML response")]
    XmlParsingFailed,
    /// The XML parsed but did not match the record or status shape.
    #[error("Response did not match any known shape")]
    UnrecognizedResponseShape,
    /// Static-token decryption failed; the plaintext must never be used.
    #[error("Failed to decrypt static token")]
    DecryptionFailed,
    /// The member-pay mint step succeeded but returned no one-time token.
    #[error("One-time token missing from member-pay response")]
    MissingOneTimeToken,
}
