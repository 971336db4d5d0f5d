use clap::{Parser, ValueEnum};
use layer_publish::SourceKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "layer-publish")]
#[command(about = "Splices the text of one external page into an HTML template")]
#[command(version)]
pub struct Args {
    /// Layer name (e.g. L1..L5); picks the output file and minimum length
    pub layer: String,

    /// Page URL, or page ID for the content API
    pub source: String,

    /// How the source is fetched
    #[arg(short = 's', long = "source-type", value_enum, default_value_t = SourceTypeArg::Api)]
    pub source_type: SourceTypeArg,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Template containing <pre id="content"> (may be the output file itself)
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// Directory receiving <LAYER>.html
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Minimum normalized length for this layer
    #[arg(long)]
    pub min_chars: Option<usize>,

    /// Fail instead of keeping the previous output when fetching goes wrong
    #[arg(long)]
    pub no_keep_previous: bool,

    /// Print the outcome as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceTypeArg {
    Raw,
    Html,
    Rendered,
    Api,
}

/// Convert from CLI argument source type to internal source kind
pub fn convert_source_type(arg_type: SourceTypeArg) -> SourceKind {
    match arg_type {
        SourceTypeArg::Raw => SourceKind::Raw,
        SourceTypeArg::Html => SourceKind::Html,
        SourceTypeArg::Rendered => SourceKind::Rendered,
        SourceTypeArg::Api => SourceKind::Api,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_layer_and_source() {
        let args = Args::try_parse_from(["layer-publish", "L2", "abc123"]).unwrap();
        assert_eq!(args.layer, "L2");
        assert_eq!(args.source, "abc123");
        assert_eq!(args.source_type, SourceTypeArg::Api);
        assert!(!args.no_keep_previous);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "layer-publish",
            "L1",
            "https://example.org/page",
            "--source-type",
            "html",
            "-t",
            "docs/L1.html",
            "--min-chars",
            "50",
            "--no-keep-previous",
        ])
        .unwrap();
        assert_eq!(convert_source_type(args.source_type), SourceKind::Html);
        assert_eq!(args.template, Some(PathBuf::from("docs/L1.html")));
        assert_eq!(args.min_chars, Some(50));
        assert!(args.no_keep_previous);
    }

    #[test]
    fn test_missing_source_is_usage_error() {
        assert!(Args::try_parse_from(["layer-publish", "L1"]).is_err());
    }
}
