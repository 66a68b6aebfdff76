//! lum-review - Read and write book reviews

use anyhow::Result;
use clap::{Parser, Subcommand};
use liblumina::logging::LoggingConfig;
use liblumina::service::reviews::NewReview;
use liblumina::service::LuminaService;
use liblumina::store::CommentThread;
use liblumina::{Comment, LuminaError, Review};
use std::io::{self, Read};

#[derive(Parser)]
#[command(name = "lum-review")]
#[command(version, about = "Read and write Lumina book reviews")]
#[command(long_about = r#"Read reviews of a book, publish your own, and discuss them in threads.

EXAMPLES:
    # Reviews of a book
    lum-review list dom-casmurro

    # Publish a review (text from the argument or stdin)
    lum-review add dom-casmurro --rating 5 --title "Capitu" "Olhos de ressaca."
    cat review.txt | lum-review add 1984 --rating 4.5 --title "Atual" --spoilers

    # Read a review's comment thread
    lum-review comments <REVIEW_ID>

    # Comment, or reply to a comment
    lum-review comment <REVIEW_ID> "Concordo!"
    lum-review comment <REVIEW_ID> "Eu também." --reply-to <COMMENT_ID>

EXIT CODES:
    0 - Success
    1 - Error (configuration, database)
    2 - Not signed in (see lum-account login)
    3 - Invalid input
    4 - Review not found
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
    /// List the reviews of a book
    List {
        book_id: String,
    },

    /// Publish a review
    Add {
        book_id: String,

        /// Rating from 0 to 5
        #[arg(short, long)]
        rating: f64,

        /// Review title
        #[arg(short, long)]
        title: String,

        /// Mark the review as containing spoilers
        #[arg(long)]
        spoilers: bool,

        /// Review text (reads from stdin if not provided)
        text: Option<String>,
    },

    /// Show the comment thread of a review
    Comments {
        review_id: String,
    },

    /// Comment on a review
    Comment {
        review_id: String,

        text: String,

        /// Reply to this comment instead of the review
        #[arg(long, value_name = "COMMENT_ID")]
        reply_to: Option<String>,
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
        Commands::List { book_id } => {
            let reviews = service.reviews().list_for_book(&book_id).await?;
            print_reviews(&reviews, json)?;
        }
        Commands::Add {
            book_id,
            rating,
            title,
            spoilers,
            text,
        } => {
            let text = match text {
                Some(text) => text,
                None => read_stdin()?,
            };

            // Warnings are shown but never block
            let check = service.validation().validate_review(&title, &text, rating);
            for warning in &check.warnings {
                eprintln!("Warning: {}", warning);
            }
            check.into_result()?;

            let review = service
                .reviews()
                .add_review(NewReview {
                    book_id,
                    rating,
                    title,
                    text,
                    contains_spoilers: spoilers,
                })
                .await?;
            print_reviews(std::slice::from_ref(&review), json)?;
        }
        Commands::Comments { review_id } => {
            let review = service
                .reviews()
                .get(&review_id)
                .await?
                .ok_or_else(|| LuminaError::NotFound(format!("review '{}'", review_id)))?;
            let comments = service.comments().list_comments(&review.id).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&comments)?);
            } else {
                print_reviews(std::slice::from_ref(&review), false)?;
                let thread = CommentThread::from_comments(comments);
                for comment in &thread.top_level {
                    print_comment(&thread, comment, 1);
                }
            }
        }
        Commands::Comment {
            review_id,
            text,
            reply_to,
        } => {
            service.validation().validate_comment(&text).into_result()?;
            let comment = service
                .comments()
                .add_comment(&review_id, &text, reply_to.as_deref())
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&comment)?);
            } else {
                println!("Comment {} added", comment.id);
            }
        }
    }

    Ok(())
}

fn read_stdin() -> Result<String> {
    if atty::is(atty::Stream::Stdin) {
        return Err(LuminaError::InvalidInput(
            "Review text missing: pass it as an argument or pipe it on stdin".to_string(),
        )
        .into());
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn print_reviews(reviews: &[Review], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reviews)?);
        return Ok(());
    }

    for review in reviews {
        let spoilers = if review.contains_spoilers { " [spoilers]" } else { "" };
        println!(
            "{}  {:.1}/5  {}{}",
            review.id, review.rating, review.title, spoilers
        );
        println!(
            "    by {}, {} likes, {} comments",
            review.user_name, review.likes, review.comments_count
        );
        if !review.contains_spoilers {
            println!("    {}", review.text);
        }
    }
    Ok(())
}

fn print_comment(thread: &CommentThread, comment: &Comment, depth: usize) {
    let indent = "    ".repeat(depth);
    println!("{}{} ({}): {}", indent, comment.user_name, comment.id, comment.text);
    for reply in thread.replies_to(&comment.id) {
        print_comment(thread, reply, depth + 1);
    }
}
