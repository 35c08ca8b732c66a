use clap::Parser;
use color_eyre::Result;
use csvview::{AppConfig, Args, ConfigManager, APP_NAME};
use std::io::Write;

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        match ConfigManager::new(APP_NAME) {
            Ok(config_manager) => match config_manager.write_default_config(args.force) {
                Ok(config_path) => {
                    println!("Configuration file written to: {}", config_path.display());
                    return Ok(Some(()));
                }
                Err(e) => {
                    eprintln!("Error writing configuration file: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error initializing config manager: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

fn run(args: &Args, config: &AppConfig) -> Result<()> {
    let session = csvview::session_from_args_and_config(args, config)?;
    if let Some(path) = &args.save_csv {
        csvview::save_selected_csv(&session, path)?;
    }
    let html = csvview::render_session(&session, config)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, html)?;
            tracing::info!(path = %path.display(), files = session.file_count(), "wrote page");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    let config = AppConfig::load(APP_NAME)?;
    csvview::logging::init(args.debug || config.debug.enabled);

    if let Err(e) = run(&args, &config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
