//! lum-catalog - Browse the book catalog

use anyhow::Result;
use clap::{Parser, Subcommand};
use liblumina::logging::LoggingConfig;
use liblumina::service::LuminaService;
use liblumina::{Book, LuminaError};

#[derive(Parser)]
#[command(name = "lum-catalog")]
#[command(version, about = "Browse the Lumina book catalog")]
#[command(long_about = r#"Browse the built-in catalog, search the external book catalog, or look
a book up by ISBN.

EXAMPLES:
    # Built-in books
    lum-catalog seed

    # Free-text search (needs an ISBNdb API key)
    lum-catalog search "grande sertão"
    lum-catalog search dune --page 2 --format json

    # Single book by ISBN
    lum-catalog lookup 978-85-359-0277-8

EXIT CODES:
    0 - Success (including empty results)
    1 - Error (configuration, database)
    4 - Book not found (lookup)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in catalog
    Seed,

    /// Search the external catalog
    Search {
        /// Search terms
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Result page, starting at 1
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Look a book up by ISBN-10 or ISBN-13
    Lookup {
        isbn: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env(cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        let code = e
            .downcast_ref::<LuminaError>()
            .map_or(1, LuminaError::exit_code);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let service = LuminaService::new().await?;
    let json = cli.format == "json";

    match cli.command {
        Commands::Seed => print_books(&service.catalog().seed_books(), json)?,
        Commands::Search { query, page } => {
            let query = query.join(" ");
            if !service.catalog().is_configured() && !query.trim().is_empty() {
                tracing::warn!("no catalog API key configured; search results will be empty");
            }
            let books = service.catalog().search_page(&query, page).await;
            print_books(&books, json)?;
        }
        Commands::Lookup { isbn } => {
            let book = service
                .catalog()
                .lookup_isbn(&isbn)
                .await
                .ok_or_else(|| LuminaError::NotFound(format!("no book with ISBN {}", isbn)))?;
            print_books(std::slice::from_ref(&book), json)?;
        }
    }

    Ok(())
}

fn print_books(books: &[Book], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(books)?);
        return Ok(());
    }

    for book in books {
        println!("{}  {} by {}", book.id, book.title, book.author);
        let mut details = Vec::new();
        if book.pages > 0 {
            details.push(format!("{} pages", book.pages));
        }
        if let Some(publisher) = &book.publisher {
            details.push(publisher.clone());
        }
        if let Some(date) = &book.published_date {
            details.push(date.clone());
        }
        if !details.is_empty() {
            println!("    {}", details.join(", "));
        }
    }
    Ok(())
}
