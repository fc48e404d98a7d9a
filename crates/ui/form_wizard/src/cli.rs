use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "form_wizard", version, about = "Fill in multi-section forms in the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Run the interactive TUI
    Run(RunArgs),
    /// Decode and check a form schema file, then print a summary
    Check {
        /// JSON file holding a form (bare or wrapped in `{"form": ...}`)
        file: PathBuf,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Serve the form from a local JSON file instead of the service
    #[arg(long, value_name = "FILE", conflicts_with = "api")]
    pub schema: Option<PathBuf>,

    /// Base url of the form service
    #[arg(long, value_name = "URL")]
    pub api: Option<String>,

    /// Pre-fill the login page
    #[arg(long, requires = "name")]
    pub roll_number: Option<String>,

    #[arg(long, requires = "roll_number")]
    pub name: Option<String>,

    /// Ticks per second
    #[arg(long)]
    pub tick_rate: Option<f64>,

    /// Frames per second
    #[arg(long)]
    pub frame_rate: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_accepts_prefilled_login() {
        let cli = Cli::try_parse_from([
            "form_wizard",
            "run",
            "--api",
            "http://localhost:3000/api",
            "--roll-number",
            "RA1",
            "--name",
            "Ada",
        ])
        .unwrap();
        let Cmd::Run(args) = cli.cmd else {
            panic!("expected run");
        };
        assert_eq!(args.api.as_deref(), Some("http://localhost:3000/api"));
        assert_eq!(args.roll_number.as_deref(), Some("RA1"));
        assert_eq!(args.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn roll_number_requires_name() {
        assert!(Cli::try_parse_from(["form_wizard", "run", "--roll-number", "RA1"]).is_err());
    }

    #[test]
    fn schema_and_api_are_exclusive() {
        assert!(
            Cli::try_parse_from(["form_wizard", "run", "--schema", "f.json", "--api", "http://x"])
                .is_err()
        );
    }

    #[test]
    fn check_takes_a_file() {
        let cli = Cli::try_parse_from(["form_wizard", "check", "form.json"]).unwrap();
        assert!(matches!(cli.cmd, Cmd::Check { file } if file == PathBuf::from("form.json")));
    }
}
