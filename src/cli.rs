use clap::Parser;

/// Aggregate RSS/Atom feeds by category, enrich each article with an image
/// and body text, and write a single JSON snapshot.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML file listing categories, feeds and tunables
    #[arg(short, long, default_value = "feeds.yaml")]
    pub config: String,

    /// Where to write the JSON snapshot (replaced atomically)
    #[arg(short, long, default_value = "news.json")]
    pub output: String,
}
