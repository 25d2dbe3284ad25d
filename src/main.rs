mod cli;

use formshift::batch::{Dpi, EntryOptions, EntryStatus};
use formshift::config::{self, Config};
use formshift::controller::{Controller, Event, Message};
use formshift::convert::Invoker;
use formshift::edit::{EditSession, EditSource, EditState};
use formshift::registry;
use formshift::settings::Settings;
use formshift_av::actions::PageSize;
use formshift_common::paths::{picker_extensions, sidecar_path};
use formshift_common::{MediaKind, Theme};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, Direction, EditAction};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "formshift=trace,formshift_av=debug,formshift_common=debug".to_string()
        } else {
            "formshift=info,formshift_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Convert {
            kind,
            to,
            dpi,
            page_size,
            grayscale,
            files,
        } => {
            let options = EntryOptions {
                dpi: dpi.parse::<Dpi>().map_err(anyhow::Error::msg)?,
                page_size: page_size.parse::<PageSize>()?,
                grayscale,
            };
            convert_files(&kind, to.as_deref(), options, files, config_path)
        }
        Commands::Formats { kind } => list_formats(&kind),
        Commands::Edit { action } => edit(action, config_path),
        Commands::Merge {
            output,
            page_size,
            images,
        } => merge(&images, &page_size, &output, config_path),
        Commands::Theme { theme } => theme_command(theme.as_deref(), config_path),
        Commands::CheckTools => check_tools(config_path),
        Commands::Validate {
            config: validate_path,
        } => {
            let path = validate_path.or_else(|| config_path.map(Path::to_path_buf));
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("formshift {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn convert_files(
    kind: &str,
    target: Option<&str>,
    options: EntryOptions,
    files: Vec<PathBuf>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let kind: MediaKind = kind.parse()?;

    let mut controller = Controller::new(kind, config.batch.capacity, Invoker::from_config(&config));

    let requested = files.len();
    let added = controller.dispatch(Message::AddFiles(files))?.len();
    if added < requested {
        println!(
            "Skipped {} file(s): duplicate, unsupported, unreadable or over the {} file limit",
            requested - added,
            config.batch.capacity
        );
    }
    if added == 0 {
        println!("Nothing to convert.");
        return Ok(());
    }

    if let Some(target) = target {
        controller.dispatch(Message::SetGlobalTarget(target.to_string()))?;
    }
    let ids: Vec<_> = controller.batch().entries().iter().map(|e| e.id).collect();
    for id in ids {
        controller.dispatch(Message::SetOptions(id, options.clone()))?;
    }

    let summary = controller
        .dispatch(Message::ConvertAll)?
        .into_iter()
        .find_map(|event| match event {
            Event::BatchFinished(summary) => Some(summary),
            _ => None,
        })
        .unwrap_or_default();

    println!();
    for entry in controller.batch().entries() {
        let choice = entry.choice.as_ref().map(|c| c.label()).unwrap_or_default();
        match &entry.status {
            EntryStatus::Done => {
                let output = entry
                    .output_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!(
                    "✓ {} [{}] {} -> {} ({})",
                    entry.file_name(),
                    choice,
                    entry.source_size_display(),
                    output,
                    entry.output_size_display()
                );
            }
            EntryStatus::Failed(reason) => {
                println!("✗ {} [{}]: {}", entry.file_name(), choice, reason);
            }
            other => println!("- {} [{}]: {}", entry.file_name(), choice, other),
        }
    }

    println!();
    println!(
        "{} of {} converted ({}%)",
        summary.done,
        summary.total(),
        controller.batch().progress()
    );

    Ok(())
}

fn list_formats(kind: &str) -> Result<()> {
    let kind: MediaKind = kind.parse()?;

    println!("{} conversions:\n", kind);
    for ext in picker_extensions(kind) {
        let choices = registry::choices_for(kind, ext);
        if choices.is_empty() {
            println!("  .{}: (no conversions)", ext);
        } else {
            let labels: Vec<_> = choices.iter().map(|c| c.label()).collect();
            println!("  .{}: {}", ext, labels.join(", "));
        }
    }

    println!("\nTargets: {}", registry::targets(kind).join(", "));
    Ok(())
}

fn open_session(files: Vec<PathBuf>, config: &Config) -> Result<EditSession> {
    let source = EditSource::from_paths(files)?;
    let session = EditSession::open(source, &config.tools, &config.sidecar.suffix)
        .context("Failed to open edit session")?;
    Ok(session)
}

fn page_index(page: usize) -> Result<usize> {
    page.checked_sub(1)
        .ok_or_else(|| anyhow::anyhow!("Page numbers start at 1"))
}

fn edit(action: EditAction, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    match action {
        EditAction::Show { target } => {
            let session = open_session(target.files, &config)?;
            print_session(&session);
        }
        EditAction::Rotate {
            page,
            direction,
            target,
        } => {
            let mut session = open_session(target.files, &config)?;
            session.go_to(page_index(page)?)?;
            let angle = match direction {
                Direction::Left => session.rotate_left()?,
                Direction::Right => session.rotate_right()?,
            };
            session.save()?;
            println!("Page {} rotated to {}°", page, angle);
        }
        EditAction::Delete { page, target } => {
            let mut session = open_session(target.files, &config)?;
            session.go_to(page_index(page)?)?;
            session.delete_current();
            session.save()?;
            println!(
                "Page {} deleted ({} of {} remain)",
                page,
                session.visible_count(),
                session.page_count()
            );
        }
        EditAction::Restore { target } => {
            let mut session = open_session(target.files, &config)?;
            session.restore_all();
            session.save()?;
            println!("All {} pages restored", session.page_count());
        }
        EditAction::Next { page, back, target } => {
            let mut session = open_session(target.files, &config)?;
            session.go_to(page_index(page)?)?;
            let next = if back { session.prev() } else { session.next() };
            match next {
                Some(index) => println!("{}", index + 1),
                None => println!("All pages removed"),
            }
            session.cancel();
        }
    }

    Ok(())
}

fn print_session(session: &EditSession) {
    println!("Sidecar: {}", session.sidecar_path().display());
    println!(
        "Pages: {} ({} visible)",
        session.page_count(),
        session.visible_count()
    );
    if session.all_removed() {
        println!("All pages removed");
    }

    let state = session.state();
    for index in 0..session.page_count() {
        let mut line = format!("  page {}", index + 1);
        let angle = state.angle(index);
        if angle != 0 {
            line.push_str(&format!(" rotated {}°", angle));
        }
        if state.is_deleted(index) {
            line.push_str(" [deleted]");
        }
        println!("{}", line);
    }

    let stale = state.stale_indices(session.page_count());
    if !stale.is_empty() {
        let pages: Vec<_> = stale.iter().map(|i| (i + 1).to_string()).collect();
        println!("Ignored edits for missing pages: {}", pages.join(", "));
    }
}

fn merge(images: &[PathBuf], page_size: &str, output: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let page_size: PageSize = page_size.parse()?;

    let first = images
        .first()
        .ok_or_else(|| anyhow::anyhow!("No images given"))?;
    let state = EditState::load(&sidecar_path(first, &config.sidecar.suffix));

    let invoker = Invoker::from_config(&config);
    let result = invoker
        .merge_images_to_pdf(images, &state, page_size, output)
        .context("Failed to assemble PDF")?;

    println!(
        "Wrote {} ({})",
        result.output_path.display(),
        formshift::batch::format_megabytes(Some(result.output_size_bytes))
    );
    Ok(())
}

fn theme_command(theme: Option<&str>, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let path = config.paths.settings_file();

    match theme {
        None => {
            let settings = Settings::load(&path);
            println!("{}", settings.theme);
        }
        Some(name) => {
            let theme: Theme = name.parse()?;
            let mut settings = Settings::load(&path);
            settings.theme = theme;
            settings
                .save(&path)
                .with_context(|| format!("Failed to save settings to {:?}", path))?;
            println!("Theme set to {}", theme);
        }
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    println!("Checking external tools...\n");

    let tools = formshift_av::check_tools(&config.tools);
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable all features.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Settings file: {}", config.paths.settings_file().display());
    println!("  Batch capacity: {}", config.batch.capacity);
    println!("  Sidecar suffix: {}", config.sidecar.suffix);
    println!("  PDF engine: {}", config.document.pdf_engine);
    println!("  Default DPI: {}", config.pdf.default_dpi);

    Ok(())
}
