//! Spoken replies through whichever system TTS binary is installed.
//! Best-effort: a missing or failing synthesizer never interrupts chat.

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Candidate synthesizers, checked in order.
const SYNTHESIZERS: &[&str] = &["say", "espeak-ng", "espeak"];

const SPEAK_TIMEOUT: Duration = Duration::from_secs(30);

/// Voice output toggled from the REPL.
pub struct VoiceOutput {
    synthesizer: Option<&'static str>,
    enabled: bool,
}

impl VoiceOutput {
    pub fn new() -> Self {
        let synthesizer = SYNTHESIZERS.iter().copied().find(|bin| binary_exists(bin));
        if let Some(bin) = synthesizer {
            debug!(synthesizer = bin, "voice output available");
        }
        Self {
            synthesizer,
            enabled: false,
        }
    }

    /// Turn voice on. Fails (returns false) when no synthesizer exists.
    pub fn enable(&mut self) -> bool {
        if self.synthesizer.is_none() {
            return false;
        }
        self.enabled = true;
        true
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn status(&self) -> String {
        match (self.synthesizer, self.enabled) {
            (None, _) => "unavailable (no speech synthesizer found)".to_string(),
            (Some(bin), true) => format!("on (via {bin})"),
            (Some(bin), false) => format!("off (via {bin})"),
        }
    }

    /// Speak `text` if enabled. Failures are logged and swallowed.
    pub async fn speak(&self, text: &str) {
        let (Some(bin), true) = (self.synthesizer, self.enabled) else {
            return;
        };
        let run = Command::new(bin)
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match tokio::time::timeout(SPEAK_TIMEOUT, run).await {
            Ok(Ok(status)) if status.success() => {}
            Ok(Ok(status)) => warn!(synthesizer = bin, %status, "speech synthesis failed"),
            Ok(Err(e)) => warn!(synthesizer = bin, "failed to run synthesizer: {e}"),
            Err(_) => warn!(synthesizer = bin, "speech synthesis timed out"),
        }
    }
}

impl Default for VoiceOutput {
    fn default() -> Self {
        Self::new()
    }
}

fn binary_exists(bin: &str) -> bool {
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| dir.join(bin).is_file())
}
