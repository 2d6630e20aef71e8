//! Observability helpers: in-process metrics and log-safe rendering of
//! opaque byte fields.

pub mod metrics;

use std::fmt;

/// Longest prefix of an opaque key written to logs.
const LOG_KEY_MAX: usize = 64;

/// Display adapter for opaque bytes (sharing keys, session ids).
///
/// Renders lossy UTF-8, escapes control characters, and truncates long
/// values so a hostile key cannot flood the log.
pub struct LogBytes<'a>(pub &'a [u8]);

impl fmt::Display for LogBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cut = self.0.len().min(LOG_KEY_MAX);
        for c in String::from_utf8_lossy(&self.0[..cut]).chars() {
            write!(f, "{}", c.escape_debug())?;
        }
        if self.0.len() > cut {
            write!(f, "...({} bytes)", self.0.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::LogBytes;

    #[test]
    fn truncates_and_escapes() {
        assert_eq!(LogBytes(b"k1\n").to_string(), "k1\\n");
        let long = vec![b'a'; 100];
        let s = LogBytes(&long).to_string();
        assert!(s.starts_with(&"a".repeat(64)));
        assert!(s.ends_with("...(100 bytes)"));
    }
}
