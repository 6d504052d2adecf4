use serde::Serialize;

use ppcboot_config::StopReason;

/// Outcome of one simulated boot.
#[derive(Debug, Clone, Serialize)]
pub struct BootReport {
    pub board: String,
    pub console: String,
    pub stop_reason: StopReason,
    /// Bytes the selected console transmitted.
    #[serde(serialize_with = "lossy_text")]
    pub transcript: Vec<u8>,
    /// Value written to the potato clock divisor, if any.
    pub clock_divisor: Option<u64>,
    pub status_polls: u64,
    pub bus_accesses: usize,
    pub faults: Vec<String>,
}

impl BootReport {
    pub fn transcript_text(&self) -> String {
        String::from_utf8_lossy(&self.transcript).into_owned()
    }
}

fn lossy_text<S: serde::Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&String::from_utf8_lossy(bytes))
}
