//! Request log output sink.
//!
//! Raw dumps and JSON records are the product output of the server, so they
//! go to a dedicated writer instead of the tracing pipeline.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared, append-only destination for request records.
#[derive(Clone)]
pub struct RequestLog {
    out: Arc<Mutex<dyn Write + Send>>,
}

impl RequestLog {
    /// Log to the process standard output.
    pub fn stdout() -> Self {
        Self::new(Arc::new(Mutex::new(io::stdout())))
    }

    pub fn new(out: Arc<Mutex<dyn Write + Send>>) -> Self {
        Self { out }
    }

    /// Write one complete record. Records from concurrent requests never interleave.
    pub fn write_record(&self, record: &[u8]) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.write_all(record).and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "Failed to write request log record");
        }
    }
}

impl Default for RequestLog {
    fn default() -> Self {
        Self::stdout()
    }
}

impl std::fmt::Debug for RequestLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLog").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_are_appended() {
        let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
        let log = RequestLog::new(buffer.clone());
        log.write_record(b"first\n");
        log.write_record(b"second\n");
        assert_eq!(&*buffer.lock().unwrap(), b"first\nsecond\n");
    }
}
