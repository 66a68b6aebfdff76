//! lum-shelf - Manage your reading shelf

use anyhow::Result;
use clap::{Parser, Subcommand};
use liblumina::logging::LoggingConfig;
use liblumina::service::LuminaService;
use liblumina::{Book, LuminaError, ShelfStatus};

#[derive(Parser)]
#[command(name = "lum-shelf")]
#[command(version, about = "Manage your Lumina reading shelf")]
#[command(long_about = r#"Track the books you want to read, are reading and have read.

EXAMPLES:
    # Show the shelf, or only one status
    lum-shelf list
    lum-shelf list --status reading

    # Shelve a built-in book, one found by ISBN, or any id listed by
    # lum-catalog search
    lum-shelf add dom-casmurro
    lum-shelf add 9780441013593 --status reading
    lum-shelf add sertao-sem-fim

    # Move through want -> reading -> read -> want
    lum-shelf next dom-casmurro

    # Set a status directly
    lum-shelf status dom-casmurro read

    # Record the page you are on (clamped to the page count)
    lum-shelf progress dom-casmurro 120

    lum-shelf remove dom-casmurro

EXIT CODES:
    0 - Success
    1 - Error (configuration, database)
    2 - Not signed in (see lum-account login)
    3 - Invalid input
    4 - Book not found
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
    /// List shelved books
    List {
        /// Only show books with this status (want, reading, read)
        #[arg(short, long)]
        status: Option<ShelfStatus>,
    },

    /// Put a book on the shelf
    Add {
        /// Seed book id, ISBN, or an id from `lum-catalog search`
        book_id: String,

        /// Initial status
        #[arg(short, long, default_value = "want")]
        status: ShelfStatus,
    },

    /// Set a book's status
    Status {
        book_id: String,

        /// want, reading or read
        status: ShelfStatus,
    },

    /// Advance a book to its next status, shelving it if needed
    Next {
        book_id: String,
    },

    /// Record reading progress
    Progress {
        book_id: String,

        /// Current page
        #[arg(allow_hyphen_values = true)]
        page: String,
    },

    /// Take a book off the shelf
    Remove {
        book_id: String,
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
    let books = service.books();

    match cli.command {
        Commands::List { status } => {
            if service.auth().current_user().is_none() {
                return Err(LuminaError::NotAuthenticated.into());
            }
            books.load_shelf().await?;
            let shelf = match status {
                Some(status) => books.shelf_by_status(status),
                None => books.shelf(),
            };
            print_books(&shelf, json)?;
        }
        Commands::Add { book_id, status } => {
            let book = resolve_book(&service, &book_id).await?;
            let book = books.add_to_shelf(book, status).await?;
            print_books(std::slice::from_ref(&book), json)?;
        }
        Commands::Status { book_id, status } => {
            let book = books.set_status(&book_id, status).await?;
            print_books(std::slice::from_ref(&book), json)?;
        }
        Commands::Next { book_id } => {
            let book = match books.get(&book_id).await? {
                Some(book) => book,
                None => resolve_book(&service, &book_id).await?,
            };
            let book = books.advance_book(book).await?;
            print_books(std::slice::from_ref(&book), json)?;
        }
        Commands::Progress { book_id, page } => {
            let page = service.validation().parse_page(&page)?;
            match books.set_progress(&book_id, page).await? {
                Some(book) => print_books(std::slice::from_ref(&book), json)?,
                None => eprintln!("Negative page ignored; progress unchanged"),
            }
        }
        Commands::Remove { book_id } => {
            if !books.remove_from_shelf(&book_id).await? {
                return Err(
                    LuminaError::NotFound(format!("'{}' is not on your shelf", book_id)).into(),
                );
            }
            if !json {
                println!("Removed {}", book_id);
            }
        }
    }

    Ok(())
}

/// Find a book in the built-in catalog, by ISBN or by catalog search
async fn resolve_book(service: &LuminaService, book_id: &str) -> Result<Book> {
    service
        .catalog()
        .find(book_id)
        .await
        .ok_or_else(|| LuminaError::NotFound(format!("no book with id '{}'", book_id)).into())
}

fn print_books(books: &[Book], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(books)?);
        return Ok(());
    }

    for book in books {
        let progress = match book.progress_percent() {
            Some(percent) => format!("{}/{} pages, {}%", book.current_page, book.pages, percent),
            None => format!("page {}", book.current_page),
        };
        println!(
            "[{}] {}  {} by {} ({})",
            book.status.label(),
            book.id,
            book.title,
            book.author,
            progress
        );
    }
    Ok(())
}
