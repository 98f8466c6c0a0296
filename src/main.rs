use clap::{Parser, Subcommand};
use smallpress::{serve, site};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "smallpress")]
#[command(about = "Static site generator for personal blogs")]
#[command(long_about = "\
Static site generator for personal blogs

Your filesystem is the data source. Subdirectories are post categories,
dated markdown files are posts, and top-level markdown files are pages.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── css/                         # Static assets → copied to output
  │   └── site.css
  ├── about.md                     # Standalone page → /about.html, in nav
  ├── tech/                        # Category
  │   ├── 2024-03-05-hello-world.md   # Post → /tech/2024/03/05/hello-world.html
  │   └── 2023-11-20-older-post.md
  └── ramblings/
      └── 2024-01-15-on-walking.md

Posts carry their publication date in the filename and their title in the
first level-1 heading. The index at / lists every category newest-first.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "out", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site: render posts and pages, write the index, copy assets
    Build,
    /// Validate content without writing output
    Check,
    /// Serve the output directory locally
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            println!("==> Building {}", cli.source.display());
            let summary = site::build(&cli.source, &cli.output)?;
            println!(
                "==> Build complete: {} ({} post(s), {} page(s){})",
                cli.output.display(),
                summary.posts,
                summary.pages,
                if summary.skipped > 0 {
                    format!(", {} skipped", summary.skipped)
                } else {
                    String::new()
                }
            );
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let summary = site::check(&cli.source)?;
            println!(
                "==> Content is valid ({} post(s), {} page(s))",
                summary.posts, summary.pages
            );
        }
        Command::Serve { port } => {
            serve::serve(&cli.output, port)?;
        }
    }

    Ok(())
}
