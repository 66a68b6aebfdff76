//! Service layer for Lumina
//!
//! `LuminaService` is the single entry point used by the command-line tools.
//! It owns the shared resources and hands out specialized sub-services:
//!
//! - `BookService`: the signed-in user's shelf, status and progress
//! - `CatalogService`: seed catalog, search and ISBN lookup
//! - `ReviewService` / `CommentService`: reviews and threaded comments
//! - `AuthService` / `ProfileService`: accounts, session and profile
//! - `ValidationService`: input checks used before submitting
//! - `EventBus`: change notifications
//!
//! # Example
//!
//! ```no_run
//! use liblumina::service::LuminaService;
//! use liblumina::ShelfStatus;
//!
//! # async fn example() -> liblumina::Result<()> {
//! let service = LuminaService::new().await?;
//!
//! if let Some(book) = service.catalog().find("dom-casmurro").await {
//!     service.books().add_to_shelf(book, ShelfStatus::Reading).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod books;
pub mod catalog;
pub mod comments;
pub mod events;
pub mod profile;
pub mod reviews;
pub mod validation;

use std::sync::Arc;

use self::auth::AuthService;
use self::books::BookService;
use self::catalog::CatalogService;
use self::comments::CommentService;
use self::events::{Event, EventBus, EventReceiver};
use self::profile::ProfileService;
use self::reviews::ReviewService;
use self::validation::ValidationService;
use crate::blob::{BlobStorage, FsBlobStorage};
use crate::catalog::isbndb::IsbnDbClient;
use crate::catalog::CatalogSource;
use crate::config::{expand_path, DEFAULT_PAGE_SIZE};
use crate::error::{ConfigError, LuminaError};
use crate::local_state::LocalStateManager;
use crate::store::{BookStore, CommentStore, ReviewStore, SessionStore, ThemeStore};
use crate::theme::{Palette, ThemePreference};
use crate::{Config, Database, Result};

/// Main service facade
///
/// Sub-services share one `Arc<Database>`, one local state file and one
/// event bus. Stores are shared by cloning their handles.
pub struct LuminaService {
    db: Arc<Database>,
    config: Arc<Config>,
    books: BookService,
    catalog: CatalogService,
    reviews: ReviewService,
    comments: CommentService,
    auth: AuthService,
    profile: ProfileService,
    validation: ValidationService,
    theme: ThemeStore,
    event_bus: EventBus,
}

impl LuminaService {
    /// Create a service from the configuration file
    pub async fn new() -> Result<Self> {
        let config = Config::load()?;
        Self::from_config(config).await
    }

    /// Create a service from `config`
    ///
    /// The ISBNdb client is only set up when `[catalog]` is present and an
    /// API key is available; otherwise catalog searches come back empty.
    pub async fn from_config(config: Config) -> Result<Self> {
        let page_size = config
            .catalog
            .as_ref()
            .map_or(DEFAULT_PAGE_SIZE, |catalog| catalog.page_size);

        let source: Option<Arc<dyn CatalogSource>> = match &config.catalog {
            Some(catalog) => match IsbnDbClient::from_config(catalog) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    tracing::debug!(error = %e, "external catalog disabled");
                    None
                }
            },
            None => None,
        };

        Self::build(config, source, page_size).await
    }

    /// Create a service that searches `source` instead of ISBNdb
    pub async fn with_catalog(config: Config, source: Arc<dyn CatalogSource>) -> Result<Self> {
        let page_size = config
            .catalog
            .as_ref()
            .map_or(DEFAULT_PAGE_SIZE, |catalog| catalog.page_size);
        Self::build(config, Some(source), page_size).await
    }

    async fn build(
        config: Config,
        source: Option<Arc<dyn CatalogSource>>,
        page_size: usize,
    ) -> Result<Self> {
        let db_path = expand_path(&config.database.path);
        let db_path_str = db_path.to_str().ok_or_else(|| {
            LuminaError::Config(ConfigError::MissingField(
                "Invalid database path".to_string(),
            ))
        })?;
        let db = Arc::new(Database::new(db_path_str).await?);

        let state = LocalStateManager::open(expand_path(&config.storage.state_file))?;
        let blobs: Arc<dyn BlobStorage> =
            Arc::new(FsBlobStorage::new(expand_path(&config.storage.blob_dir)));
        let config = Arc::new(config);
        let event_bus = EventBus::new(100);

        // Shared stores
        let session = SessionStore::new(state.clone());
        let theme = ThemeStore::new(state);
        let book_store = BookStore::new();
        let review_store = ReviewStore::new();

        let validation = ValidationService::new();
        let books = BookService::new(
            Arc::clone(&db),
            book_store.clone(),
            session.clone(),
            event_bus.clone(),
        );
        let catalog = CatalogService::new(source, page_size);
        let reviews = ReviewService::new(
            Arc::clone(&db),
            review_store.clone(),
            session.clone(),
            validation.clone(),
            event_bus.clone(),
        );
        let comments = CommentService::new(
            Arc::clone(&db),
            CommentStore::new(),
            review_store,
            session.clone(),
            validation.clone(),
            event_bus.clone(),
        );
        let profile = ProfileService::new(
            Arc::clone(&db),
            session.clone(),
            blobs,
            event_bus.clone(),
        );
        let auth = AuthService::new(
            Arc::clone(&db),
            session,
            book_store,
            profile.clone(),
            event_bus.clone(),
        );

        Ok(Self {
            db,
            config,
            books,
            catalog,
            reviews,
            comments,
            auth,
            profile,
            validation,
            theme,
            event_bus,
        })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn books(&self) -> &BookService {
        &self.books
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    pub fn reviews(&self) -> &ReviewService {
        &self.reviews
    }

    pub fn comments(&self) -> &CommentService {
        &self.comments
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn profile(&self) -> &ProfileService {
        &self.profile
    }

    pub fn validation(&self) -> &ValidationService {
        &self.validation
    }

    /// Theme store; `set_theme` and `toggle_theme` also notify subscribers
    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    pub fn palette(&self) -> Palette {
        self.theme.palette()
    }

    pub fn set_theme(&self, preference: ThemePreference) -> Result<()> {
        self.theme.set(preference)?;
        self.event_bus.emit(Event::ThemeChanged { preference });
        Ok(())
    }

    /// Flip the theme and return the new preference
    pub fn toggle_theme(&self) -> Result<ThemePreference> {
        let preference = self.theme.toggle()?;
        self.event_bus.emit(Event::ThemeChanged { preference });
        Ok(preference)
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> EventReceiver {
        self.event_bus.subscribe()
    }
}
