use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "shopscrape-cli", about = "Run one incremental product scrape and print its summary", version)]
pub struct Args {
    /// Number of listing pages to scrape (default: configured default_pages)
    #[arg(short, long)]
    pub pages: Option<u32>,

    /// Proxy URL used for both http and https requests
    #[arg(long, env = "SHOPSCRAPE_PROXY")]
    pub proxy: Option<String>,

    /// Override the listing base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Print the summary as compact JSON instead of pretty JSON
    #[arg(long)]
    pub compact: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
