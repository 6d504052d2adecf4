use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Behaviour of one simulated serial line.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SerialLineConfig {
    /// Bytes waiting to be received, in order.
    pub rx_input: String,
    /// Status polls that report the transmitter full before each byte is
    /// accepted.
    pub tx_stall_polls: u32,
    /// Status polls that report the receiver empty before each queued byte
    /// becomes visible.
    pub rx_delay_polls: u32,
}

/// A simulated board: which console the boot stub reports and how each
/// UART behaves.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BoardManifest {
    pub name: String,
    /// Value the boot stub passes in r3: running under QEMU.
    #[serde(default)]
    pub emulated: bool,
    #[serde(default)]
    pub potato: SerialLineConfig,
    #[serde(default)]
    pub qemu: SerialLineConfig,
}

impl Default for BoardManifest {
    fn default() -> Self {
        Self {
            name: "microwatt".to_string(),
            emulated: false,
            potato: SerialLineConfig::default(),
            qemu: SerialLineConfig::default(),
        }
    }
}

impl BoardManifest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open board manifest at {:?}", path.as_ref()))?;
        serde_yaml::from_reader(f).context("Failed to parse Board Manifest")
    }

    /// The serial line the console will use for the given boot flag.
    pub fn line(&self, emulated: bool) -> &SerialLineConfig {
        if emulated {
            &self.qemu
        } else {
            &self.potato
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TestInputs {
    /// Board manifest, relative to the script. Defaults to a bare board.
    #[serde(default)]
    pub board: Option<String>,
    /// Overrides the board's boot flag.
    #[serde(default)]
    pub emulated: Option<bool>,
    /// Bytes to read back and echo after the banner.
    #[serde(default)]
    pub echo: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TestLimits {
    /// Maximum status polls per wait before the run is stopped.
    pub max_polls: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Halt,
    PollTimeout,
    BusFault,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct UartContainsAssertion {
    pub uart_contains: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ClockDivisorAssertion {
    pub clock_divisor: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct StopReasonAssertion {
    pub expected_stop_reason: StopReason,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum TestAssertion {
    UartContains(UartContainsAssertion),
    ClockDivisor(ClockDivisorAssertion),
    ExpectedStopReason(StopReasonAssertion),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TestScript {
    pub schema_version: String,
    pub inputs: TestInputs,
    pub limits: TestLimits,
    #[serde(default)]
    pub assertions: Vec<TestAssertion>,
}

impl TestScript {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open test script at {:?}", path.as_ref()))?;
        let script: Self =
            serde_yaml::from_reader(f).context("Failed to parse Test Script YAML")?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != "1.0" {
            anyhow::bail!(
                "Unsupported schema_version '{}'. Supported versions: '1.0'",
                self.schema_version
            );
        }

        if let Some(board) = &self.inputs.board {
            if board.trim().is_empty() {
                anyhow::bail!("Input 'board' path cannot be empty");
            }
        }

        if self.limits.max_polls == 0 {
            anyhow::bail!("Limit 'max_polls' must be greater than zero");
        }

        Ok(())
    }
}
