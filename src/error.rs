use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("UNKNOWN_TEST_CASE_ATTEMPT: No started test case with ID '{0}'.")]
    UnknownTestCaseAttempt(String),

    #[error("UNKNOWN_TEST_CASE: Test case '{0}' was never announced in the message stream.")]
    UnknownTestCase(String),

    #[error("UNKNOWN_PICKLE: Pickle '{0}' was never announced in the message stream.")]
    UnknownPickle(String),

    #[error("UNKNOWN_DOCUMENT: Gherkin document '{0}' was never announced in the message stream.")]
    UnknownDocument(String),

    #[error("MALFORMED_MESSAGE: Line {line}: {source}")]
    MalformedMessage {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
