//! lum-account - Accounts, profile and preferences

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use liblumina::config::expand_path;
use liblumina::logging::LoggingConfig;
use liblumina::service::profile::{PhotoUpload, ProfileUpdate};
use liblumina::service::LuminaService;
use liblumina::{LuminaError, ThemePreference};
use secrecy::SecretString;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lum-account")]
#[command(version, about = "Manage your Lumina account, profile and theme")]
#[command(long_about = r#"Sign up, sign in and out, edit your profile and pick a theme.

EXAMPLES:
    lum-account signup --name "Ana" --email ana@example.com
    lum-account login --email ana@example.com

    # Non-interactive (password on stdin)
    echo "$PASSWORD" | lum-account login --email ana@example.com --stdin

    lum-account whoami
    lum-account profile --name "Ana Clara" --photo ~/me.png
    lum-account theme toggle
    lum-account logout

EXIT CODES:
    0 - Success
    1 - Error (configuration, database, storage)
    2 - Not signed in
    3 - Invalid input (bad password, malformed email, unsupported photo)
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
    /// Create an account and sign in
    Signup {
        /// Display name
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Read the password from stdin (for automation)
        #[arg(long)]
        stdin: bool,
    },

    /// Sign in
    Login {
        #[arg(long)]
        email: String,

        /// Read the password from stdin (for automation)
        #[arg(long)]
        stdin: bool,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Show or edit your profile
    Profile {
        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// Profile photo (jpg, png or webp)
        #[arg(long, value_name = "FILE")]
        photo: Option<PathBuf>,
    },

    /// Show or change the color theme
    Theme {
        action: Option<ThemeAction>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeAction {
    Light,
    Dark,
    Toggle,
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
        Commands::Signup { name, email, stdin } => {
            let password = read_password(stdin, true)?;
            let user = service.auth().sign_up(&name, &email, &password).await?;
            print_json_or(json, &user, || {
                println!("Welcome, {}! You are signed in.", user.display_name)
            })?;
        }
        Commands::Login { email, stdin } => {
            let password = read_password(stdin, false)?;
            let user = service.auth().sign_in(&email, &password).await?;
            print_json_or(json, &user, || {
                println!("Signed in as {}", user.display_name)
            })?;
        }
        Commands::Logout => {
            service.auth().sign_out()?;
            if !json {
                println!("Signed out");
            }
        }
        Commands::Whoami => {
            let user = service
                .auth()
                .current_user()
                .ok_or(LuminaError::NotAuthenticated)?;
            print_json_or(json, &user, || {
                println!("{} <{}>", user.display_name, user.email);
                if let Some(url) = &user.photo_url {
                    println!("Photo: {}", url);
                }
            })?;
        }
        Commands::Profile { name, photo } => {
            if name.is_none() && photo.is_none() {
                let profile = service.profile().current_profile().await?;
                print_json_or(json, &profile, || {
                    println!("{} <{}>", profile.display_name, profile.email);
                    println!(
                        "Photo: {}",
                        profile.photo_url.as_deref().unwrap_or("(none)")
                    );
                })?;
                return Ok(());
            }

            let photo = photo
                .map(|path| PhotoUpload::from_path(&expand_path(&path.to_string_lossy())))
                .transpose()?;
            let user = service
                .profile()
                .update_profile(ProfileUpdate {
                    display_name: name,
                    photo,
                })
                .await?;
            print_json_or(json, &user, || println!("Profile updated"))?;
        }
        Commands::Theme { action } => {
            let preference = match action {
                None => service.theme().preference(),
                Some(ThemeAction::Toggle) => service.toggle_theme()?,
                Some(ThemeAction::Light) => {
                    service.set_theme(ThemePreference::Light)?;
                    ThemePreference::Light
                }
                Some(ThemeAction::Dark) => {
                    service.set_theme(ThemePreference::Dark)?;
                    ThemePreference::Dark
                }
            };
            let palette = service.palette();
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "theme": preference,
                        "palette": palette,
                    }))?
                );
            } else {
                println!("Theme: {}", preference);
                println!(
                    "  background {}  text {}  primary {}",
                    palette.background, palette.text, palette.primary
                );
            }
        }
    }

    Ok(())
}

fn print_json_or<T, F>(json: bool, value: &T, text: F) -> Result<()>
where
    T: serde::Serialize,
    F: FnOnce(),
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text();
    }
    Ok(())
}

/// Read a password from stdin or an interactive prompt
fn read_password(use_stdin: bool, confirm: bool) -> Result<SecretString> {
    let value = if use_stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer.trim_end_matches(['\r', '\n']).to_string()
    } else {
        if !atty::is(atty::Stream::Stdin) {
            anyhow::bail!("Not a TTY. Use --stdin to read the password from stdin.");
        }
        let password = rpassword::prompt_password("Password: ")?;
        if confirm && rpassword::prompt_password("Confirm password: ")? != password {
            return Err(LuminaError::InvalidInput("Passwords do not match".to_string()).into());
        }
        password
    };

    if value.is_empty() {
        return Err(LuminaError::InvalidInput("Password cannot be empty".to_string()).into());
    }
    Ok(SecretString::from(value))
}
