//! Error and panic reporting.
//!
//! Crash reports name the page the user was on and point at the log file,
//! since the log holds the service details the pages never show.

#[allow(deprecated)]
use std::panic::PanicInfo;
use std::path::Path;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

use color_eyre::{Result, config::PanicHook};
use tracing::error;

use crate::{config, logging, pages::PageId};

static INIT: OnceLock<()> = OnceLock::new();

/// Page on screen, for the crash report. Updated by the app on every switch.
static CURRENT_PAGE: AtomicU8 = AtomicU8::new(0);

pub fn set_current_page(page: PageId) {
    CURRENT_PAGE.store(page as u8, Ordering::Relaxed);
}

fn current_page() -> &'static str {
    page_name(CURRENT_PAGE.load(Ordering::Relaxed))
}

fn page_name(raw: u8) -> &'static str {
    match raw {
        x if x == PageId::Form as u8 => "form",
        _ => "login",
    }
}

/// Footer of every panic report.
fn crash_note(page: &str, log_file: &Path) -> String {
    format!(
        "form_wizard crashed on the {page} page. Answers entered so far are lost.\n\
         Details are in {}",
        log_file.display()
    )
}

pub fn init() -> Result<()> {
    // idempotent: wenn schon initialisiert, tue nichts
    if INIT.get().is_some() {
        return Ok(());
    }

    let log_file = config::get_data_dir().join(logging::LOG_FILE.as_str());
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section(crash_note("current", &log_file))
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .try_into_hooks()?;
    eyre_hook.install()?;

    std::panic::set_hook(Box::new(move |panic_info| {
        on_panic(&panic_hook, panic_info, &log_file);
        std::process::exit(libc::EXIT_FAILURE);
    }));

    let _ = INIT.set(());
    Ok(())
}

#[allow(deprecated)]
fn on_panic(panic_hook: &PanicHook, panic_info: &PanicInfo<'_>, log_file: &Path) {
    // Terminal zuerst zurücksetzen, sonst ist die Ausgabe unlesbar
    if let Err(r) = crate::tui::restore() {
        error!("Unable to exit Terminal: {:?}", r);
    }

    let report = strip_ansi_escapes::strip_str(panic_hook.panic_report(panic_info).to_string());
    error!(page = current_page(), "panic: {report}");

    #[cfg(not(debug_assertions))]
    {
        use human_panic::{handle_dump, metadata, print_msg};
        let metadata = metadata!();
        let file_path = handle_dump(&metadata, panic_info);
        if let Err(e) = print_msg(file_path, &metadata) {
            eprintln!("human-panic: {e}");
        }
    }

    #[cfg(debug_assertions)]
    {
        better_panic::Settings::auto()
            .most_recent_first(false)
            .lineno_suffix(true)
            .verbosity(better_panic::Verbosity::Full)
            .create_panic_handler()(panic_info);
    }

    eprintln!("{}", crash_note(current_page(), log_file));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crash_note_names_page_and_log() {
        let note = crash_note("form", Path::new("/tmp/form_wizard.log"));
        assert!(note.contains("on the form page"));
        assert!(note.ends_with("/tmp/form_wizard.log"));
    }

    #[test]
    fn page_names() {
        assert_eq!(page_name(PageId::Form as u8), "form");
        assert_eq!(page_name(PageId::Login as u8), "login");
    }
}
