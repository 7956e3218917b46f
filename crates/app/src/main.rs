use std::process;

mod headless;
mod logging;
mod obj;
mod scene;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let parsed = match headless::parse_args(&args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("blobsurf: {err}");
            headless::print_help();
            process::exit(2);
        }
    };
    if parsed.help {
        headless::print_help();
        return;
    }

    let level = match logging::resolve_level(parsed.log_level.as_deref()) {
        Ok(level) => level,
        Err(err) => {
            eprintln!("blobsurf: {err}");
            process::exit(2);
        }
    };
    logging::setup_tracing(level);
    tracing::info!("blobsurf starting");

    let summary = match headless::run(&parsed) {
        Ok(summary) => summary,
        Err(err) => {
            tracing::error!("blobsurf: {err}");
            process::exit(1);
        }
    };

    if parsed.print {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                tracing::error!("blobsurf: {err}");
                process::exit(1);
            }
        }
    }
}
