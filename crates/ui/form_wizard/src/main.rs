use clap::Parser;
use color_eyre::Result;
use form_wizard::cli::{Cli, Cmd};

#[tokio::main]
async fn main() -> Result<()> {
    form_wizard::errors::init()?;
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Run(args) => form_wizard::run(args).await,
        Cmd::Check { file } => form_wizard::check(&file),
    }
}
