//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::commands::new::NewContent;
use folio::content::{ContentKind, Drafts};
use folio::Folio;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author = "Erich Simon")]
#[command(version)]
#[command(about = "Blog and portfolio content engine: posts, projects, reviews, recommendations and bookmarks", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Include draft content
    #[arg(long, global = true)]
    drafts: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new content file
    New {
        /// Kind of content (post, review, project, recommendation, bookmark)
        #[arg(short, long, default_value = "post")]
        kind: ContentKind,

        /// Title (a recommendation's name)
        title: String,

        /// Slug, derived from the title when omitted
        #[arg(short, long)]
        slug: Option<String>,

        #[arg(long)]
        category: Option<String>,

        /// Tag, may be repeated
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        #[arg(short, long)]
        excerpt: Option<String>,

        /// Product name of a review
        #[arg(long)]
        product: Option<String>,

        /// Product or bookmark URL
        #[arg(long)]
        url: Option<String>,

        /// Write a `.draft.md` file
        #[arg(long)]
        draft: bool,
    },

    /// List site content
    List {
        /// What to list (post, review, project, recommendation, bookmark, categories, tags)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Validate every content file
    Check,

    /// Generate the feed, sitemap and robots.txt
    #[command(alias = "g")]
    Generate,

    /// Clean the public folder
    Clean,

    /// Start the HTTP server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Display version information
    Version,
}

fn load(base_dir: &Path, drafts: bool) -> Result<Folio> {
    let folio = Folio::new(base_dir)?;
    Ok(if drafts {
        folio.with_drafts(Drafts::Include)
    } else {
        folio
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            folio::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New {
            kind,
            title,
            slug,
            category,
            tags,
            excerpt,
            product,
            url,
            draft,
        } => {
            let site = load(&base_dir, cli.drafts)?;
            tracing::info!("Creating new {} with title: {}", kind, title);
            let request = NewContent {
                slug,
                category,
                tags,
                excerpt,
                product,
                url,
                draft,
                ..NewContent::new(kind, title)
            };
            let path = folio::commands::new::create(&site, &request)?;
            println!("Created: {:?}", path);
        }

        Commands::List { r#type } => {
            let site = load(&base_dir, cli.drafts)?;
            folio::commands::list::run(&site, &r#type)?;
        }

        Commands::Check => {
            let site = load(&base_dir, cli.drafts)?;
            folio::commands::check::run(&site)?;
        }

        Commands::Generate => {
            let site = load(&base_dir, cli.drafts)?;
            tracing::info!("Generating feed, sitemap and robots.txt...");
            for path in site.generate()? {
                println!("Generated: {:?}", path);
            }
            println!("Generated successfully!");
        }

        Commands::Clean => {
            let site = load(&base_dir, cli.drafts)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Server { port, ip } => {
            let site = load(&base_dir, cli.drafts)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio::server::start(&site, &ip, port).await?;
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
