//! Server-sent events line framing

/// Splits a byte stream into SSE data payloads.
///
/// Bytes are held until a full line arrives, so payloads split across
/// network chunks or multi-byte characters come out whole. `data:`
/// payloads become units; blank lines, comments, other fields and the
/// `[DONE]` sentinel are dropped. Bare JSON lines, which some backends
/// send for errors, pass through as-is.
#[derive(Debug, Default)]
pub struct Lines {
    pending: Vec<u8>,
}

impl Lines {
    /// Create an empty framer
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of bytes, returning the payloads it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut units = Vec::new();
        while let Some(end) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            if let Some(unit) = payload(&line) {
                units.push(unit);
            }
        }
        units
    }

    /// End of body: flush a trailing line without a newline.
    pub fn finish(self) -> Option<String> {
        payload(&self.pending)
    }
}

fn payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(['\r', '\n']);
    let data = match line.strip_prefix("data:") {
        Some(data) => data.strip_prefix(' ').unwrap_or(data),
        None if line.trim_start().starts_with('{') => line,
        None => return None,
    };

    if data.trim().is_empty() || data.trim() == "[DONE]" {
        return None;
    }
    Some(data.to_owned())
}
