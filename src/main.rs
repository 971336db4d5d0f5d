use clap::Parser;
use layer_publish::{Publisher, Result, exit_code};

mod args;
use args::{Args, convert_source_type};

#[tokio::main]
async fn main() {
    // Initialize logging; warnings about kept output must reach the CI log
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command-line arguments
    let args = Args::parse();

    let result = match build_publisher(&args) {
        Ok(publisher) => publisher.publish().await,
        Err(e) => Err(e),
    };

    match &result {
        Ok(outcome) if args.json => match serde_json::to_string(outcome) {
            Ok(json) => println!("{json}"),
            Err(e) => ::log::error!("Failed to serialize outcome: {}", e),
        },
        Ok(_) => {}
        Err(e) => eprintln!("{e}"),
    }

    std::process::exit(exit_code(&result));
}

/// Apply the config file and CLI overrides, in that order
fn build_publisher(args: &Args) -> Result<Publisher> {
    let mut publisher = Publisher::new(&args.layer, &args.source)
        .with_source_kind(convert_source_type(args.source_type));

    if let Some(path) = &args.config {
        publisher = publisher.with_config_file(path)?;
    }
    if let Some(template) = &args.template {
        publisher = publisher.with_template_path(template);
    }
    if let Some(dir) = &args.out_dir {
        publisher = publisher.with_output_dir(dir);
    }
    if let Some(min) = args.min_chars {
        publisher = publisher.with_min_chars(min);
    }
    if args.no_keep_previous {
        publisher = publisher.with_keep_previous(false);
    }

    ::log::debug!(
        "Template {:?}, output {:?}",
        publisher.config().template_path,
        publisher.output_path()
    );
    Ok(publisher)
}
