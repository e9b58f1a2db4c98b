//! Error types shared by the pipeline stages.

use std::path::PathBuf;

/// The input mapping table cannot be used; nothing can be processed.
#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    /// The mapping file could not be opened or read.
    #[error("problem reading mapping file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// The mapping file has no header row at all.
    #[error("mapping file {} has no header row", .path.display())]
    MissingHeader { path: PathBuf },
    /// The header row lacks the identifier column.
    #[error("no column named {column:?} in header of {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },
}

/// A query against the remote API did not produce a usable answer.
#[derive(thiserror::Error, Debug)]
pub enum RemoteQueryError {
    /// The request could not be sent or its body not be read.
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },
    /// The server answered with a non-success status.
    #[error("{endpoint} request failed ({status}): {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The response body lacks the structure the query relies on.
    #[error("unexpected response from {endpoint}: {message}")]
    Malformed { endpoint: String, message: String },
    /// The server reported more records than it was willing to hand out.
    #[error("{endpoint} returned {received} of {total} records")]
    Truncated {
        endpoint: String,
        received: usize,
        total: usize,
    },
}

/// Writing a report file failed.
#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    /// The output directory could not be created.
    #[error("problem creating output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The report file could not be written.
    #[error("problem writing report {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
