//! Command-line configuration.
//!
//! Every option is read once at startup; nothing here changes while the
//! bridge loop runs.

use std::path::PathBuf;

use clap::Parser;

use crate::adapter::{BridgeConfig, SerialConfig, SolverConfig};

#[derive(Debug, Clone, Parser)]
#[command(name = "everdrive-tetris")]
#[command(version, about = "Play NES Tetris on an Everdrive N8 with an external move solver")]
pub struct Cli {
    /// Level reported to the solver instead of the one on screen
    #[arg(short, long, env = "EVERDRIVE_TETRIS_LEVEL")]
    pub level: Option<u32>,

    /// Solver input timeline (default "X......", 8 Hz tapping)
    #[arg(short = 'H', long = "hertz", env = "EVERDRIVE_TETRIS_TIMELINE")]
    pub timeline: Option<String>,

    /// Frames to display each move (ROM build define)
    #[arg(short, long)]
    pub frames: Option<u32>,

    /// Show the move as soon as possible (ROM build define)
    #[arg(short, long)]
    pub show_sooner: bool,

    /// Serial port of the cartridge (auto-detected if not specified)
    #[arg(short, long, env = "EVERDRIVE_PORT")]
    pub port: Option<String>,

    #[arg(long, default_value_t = 9600)]
    pub baud: u32,

    /// ROM image streamed as raw bytes over the serial link before starting.
    /// No Everdrive loader handshake is performed, so the cartridge must
    /// already be waiting for a raw image (otherwise launch the ROM from the
    /// cartridge menu and leave this unset)
    #[arg(long)]
    pub rom: Option<PathBuf>,

    #[arg(long, env = "EVERDRIVE_SOLVER_HOST", default_value = "127.0.0.1")]
    pub solver_host: String,

    #[arg(long, env = "EVERDRIVE_SOLVER_PORT", default_value_t = 3000)]
    pub solver_port: u16,

    #[arg(long, default_value_t = 1000)]
    pub solver_timeout_ms: u64,

    /// Append a JSON line per processed snapshot to this file
    #[arg(long, env = "EVERDRIVE_LOG_PATH")]
    pub log_path: Option<PathBuf>,

    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            level: self.level,
            timeline: self
                .timeline
                .clone()
                .filter(|t| !t.is_empty()),
        }
    }

    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            host: self.solver_host.clone(),
            port: self.solver_port,
            timeout_ms: self.solver_timeout_ms,
        }
    }

    pub fn serial_config(&self) -> SerialConfig {
        SerialConfig {
            port: self.port.clone(),
            baud_rate: self.baud,
            ..SerialConfig::default()
        }
    }

    /// Preprocessor defines for the ROM build matching `--frames` and
    /// `--show-sooner`.
    pub fn build_defines(&self) -> Vec<String> {
        let mut defines = Vec::new();
        if let Some(frames) = self.frames.filter(|f| *f > 0) {
            defines.push("-D".to_string());
            defines.push(format!("SRVEDATG_DISPLAY_FRAMES={frames}"));
        }
        if self.show_sooner {
            defines.push("-D".to_string());
            defines.push("SRVEDATG_SHOW_SOONER=1".to_string());
        }
        defines
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["everdrive-tetris"]);
        assert_eq!(cli.level, None);
        assert_eq!(cli.baud, 9600);
        assert!(cli.build_defines().is_empty());
        assert_eq!(cli.log_filter(), "info");
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from([
            "everdrive-tetris",
            "-l",
            "18",
            "-H",
            "X.....",
            "-f",
            "10",
            "-s",
            "-vv",
        ]);
        let config = cli.bridge_config();
        assert_eq!(config.level, Some(18));
        assert_eq!(config.timeline.as_deref(), Some("X....."));
        assert_eq!(
            cli.build_defines(),
            vec![
                "-D",
                "SRVEDATG_DISPLAY_FRAMES=10",
                "-D",
                "SRVEDATG_SHOW_SOONER=1"
            ]
        );
        assert_eq!(cli.log_filter(), "trace");
    }

    #[test]
    fn test_empty_timeline_uses_default() {
        let cli = Cli::parse_from(["everdrive-tetris", "--hertz", ""]);
        assert_eq!(cli.bridge_config().timeline, None);
    }

    #[test]
    fn test_rom_help_states_raw_upload() {
        use clap::CommandFactory;

        let cmd = Cli::command();
        let rom = cmd
            .get_arguments()
            .find(|a| a.get_id() == "rom")
            .unwrap();
        let help = rom.get_help().unwrap().to_string();
        assert!(help.contains("raw bytes"), "{help}");
        assert!(help.contains("handshake"), "{help}");
    }
}
