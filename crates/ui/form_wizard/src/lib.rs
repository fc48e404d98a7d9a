pub mod action;
pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod errors;
pub mod executor;
pub mod logging;
pub mod pages;
pub mod services;
pub mod style;
pub mod tui;

use std::{path::Path, sync::Arc};

use color_eyre::{Result, eyre::WrapErr};
use forms::{FieldKind, FormSchema, decode_form};
use tracing::info;

use crate::{
    app::App, cli::RunArgs, config::Config, pages::LoginPage, services::Backend, style::Theme,
};

/// Run the interactive form flow. Submitted answers are printed to stdout as
/// JSON once the terminal is restored.
pub async fn run(args: RunArgs) -> Result<()> {
    let _guard = logging::init()?;

    let mut config = Config::new()?;
    if let Some(rate) = args.tick_rate {
        config.tick_rate = rate;
    }
    if let Some(rate) = args.frame_rate {
        config.frame_rate = rate;
    }

    let backend = Backend::select(&args, &config)?;
    info!("form service: {}", backend.describe());

    let theme = Theme::default();
    let mut login = LoginPage::new(theme.clone());
    if let (Some(roll_number), Some(name)) = (&args.roll_number, &args.name) {
        login = login.prefill(roll_number.as_str(), name.as_str());
    }

    let mut app = App::new(config, theme, login, Arc::new(backend));
    app.run().await?;

    if let Some(submission) = &app.submission {
        println!("{}", serde_json::to_string_pretty(submission)?);
    }
    Ok(())
}

/// Decode and check a schema file, then print what it contains.
pub fn check(path: &Path) -> Result<()> {
    let body = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let schema = decode_form(&body, &path.display().to_string())?;
    print!("{}", summary(&schema));
    Ok(())
}

fn summary(schema: &FormSchema) -> String {
    let mut out = format!(
        "{}: {} sections, {} fields\n",
        schema.title,
        schema.sections.len(),
        schema.field_count()
    );
    for (i, section) in schema.sections.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} ({} fields)\n",
            i + 1,
            section.title,
            section.fields.len()
        ));
        for field in section.fields.iter().filter(|f| matches!(f.kind, FieldKind::Unsupported { .. })) {
            out.push_str(&format!(
                "     unsupported field type `{}` on `{}`\n",
                field.kind.type_name(),
                field.field_id
            ));
        }
    }
    out
}
