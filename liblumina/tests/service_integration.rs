//! Integration tests for LuminaService
//!
//! Exercises the service layer as a whole against a temporary database and
//! an in-memory catalog.

use std::sync::Arc;

use liblumina::catalog::mock::MockCatalog;
use liblumina::catalog::ExternalBook;
use liblumina::service::events::Event;
use liblumina::service::profile::{PhotoUpload, ProfileUpdate};
use liblumina::service::reviews::NewReview;
use liblumina::service::LuminaService;
use liblumina::store::CommentThread;
use liblumina::{Book, Config, LuminaError, ShelfStatus, ThemePreference};
use secrecy::SecretString;
use tempfile::TempDir;

fn dune_record() -> ExternalBook {
    ExternalBook {
        isbn13: Some("9780441013593".to_string()),
        isbn: Some("0441013597".to_string()),
        title: Some("Dune".to_string()),
        authors: Some(vec!["Frank Herbert".to_string()]),
        pages: Some(688),
        ..Default::default()
    }
}

/// Setup test service with a temporary directory and a mock catalog
async fn setup_test_service() -> (LuminaService, MockCatalog, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::in_dir(temp_dir.path());
    let mock = MockCatalog::with_books(vec![dune_record()]);

    let service = LuminaService::with_catalog(config, Arc::new(mock.clone()))
        .await
        .unwrap();

    (service, mock, temp_dir)
}

fn password() -> SecretString {
    SecretString::from("correct horse".to_string())
}

async fn sign_up(service: &LuminaService, name: &str) {
    service
        .auth()
        .sign_up(name, &format!("{}@example.com", name.to_lowercase()), &password())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_shelf_mutations_require_session() {
    let (service, _mock, _temp_dir) = setup_test_service().await;
    let book = service.catalog().find("dom-casmurro").await.unwrap();

    let result = service.books().add_to_shelf(book, ShelfStatus::Want).await;
    assert!(matches!(result, Err(LuminaError::NotAuthenticated)));

    let result = service.books().set_progress("dom-casmurro", 10).await;
    assert!(matches!(result, Err(LuminaError::NotAuthenticated)));

    assert_eq!(LuminaError::NotAuthenticated.exit_code(), 2);
    assert!(service.books().load_shelf().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_progress_clamped_and_negative_ignored() {
    let (service, _mock, _temp_dir) = setup_test_service().await;
    sign_up(&service, "Ana").await;

    let mut book = Book::new(
        "test-book".to_string(),
        "Test Book".to_string(),
        "Someone".to_string(),
        300,
    );
    book.current_page = 100;
    service
        .books()
        .add_to_shelf(book, ShelfStatus::Reading)
        .await
        .unwrap();

    let updated = service.books().set_progress("test-book", 450).await.unwrap().unwrap();
    assert_eq!(updated.current_page, 300);
    assert_eq!(updated.status, ShelfStatus::Reading);

    let rejected = service.books().set_progress("test-book", -5).await.unwrap();
    assert!(rejected.is_none());

    // Both the cache and the database still hold 300
    let reloaded = service.books().load_shelf().await.unwrap();
    assert_eq!(reloaded[0].current_page, 300);
}

#[tokio::test]
async fn test_updates_on_unloaded_shelf_reach_store() {
    let temp_dir = TempDir::new().unwrap();

    {
        let service = LuminaService::from_config(Config::in_dir(temp_dir.path()))
            .await
            .unwrap();
        sign_up(&service, "Ana").await;
        let book = service.catalog().find("dom-casmurro").await.unwrap();
        service
            .books()
            .add_to_shelf(book, ShelfStatus::Want)
            .await
            .unwrap();
    }

    // Fresh process: nothing loaded into the store yet
    let service = LuminaService::from_config(Config::in_dir(temp_dir.path()))
        .await
        .unwrap();
    assert!(service.books().shelf().is_empty());

    let book = service
        .books()
        .set_status("dom-casmurro", ShelfStatus::Reading)
        .await
        .unwrap();
    assert_eq!(book.status, ShelfStatus::Reading);

    let pages = i64::from(book.pages);
    let book = service
        .books()
        .set_progress("dom-casmurro", pages + 50)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(i64::from(book.current_page), pages);

    let shelf = service.books().shelf();
    assert_eq!(shelf.len(), 1);
    assert_eq!(shelf[0].status, ShelfStatus::Reading);
    assert_eq!(shelf[0].current_page, book.current_page);
}

#[tokio::test]
async fn test_status_cycle_keeps_progress() {
    let (service, _mock, _temp_dir) = setup_test_service().await;
    sign_up(&service, "Ana").await;

    let book = service.catalog().find("a-hora-da-estrela").await.unwrap();
    let shelved = service.books().advance_book(book).await.unwrap();
    assert_eq!(shelved.status, ShelfStatus::Want);

    service.books().set_progress(&shelved.id, 40).await.unwrap();

    let reading = service.books().advance_status(&shelved.id).await.unwrap();
    assert_eq!(reading.status, ShelfStatus::Reading);
    assert_eq!(reading.current_page, 40);

    let read = service.books().advance_status(&shelved.id).await.unwrap();
    assert_eq!(read.status, ShelfStatus::Read);

    let want = service.books().advance_status(&shelved.id).await.unwrap();
    assert_eq!(want.status, ShelfStatus::Want);
    assert_eq!(want.current_page, 40);

    // Setting the same status twice leaves one document
    service.books().set_status(&shelved.id, ShelfStatus::Read).await.unwrap();
    service.books().set_status(&shelved.id, ShelfStatus::Read).await.unwrap();
    let shelf = service.books().load_shelf().await.unwrap();
    assert_eq!(shelf.len(), 1);
    assert_eq!(service.books().shelf_by_status(ShelfStatus::Read).len(), 1);
}

#[tokio::test]
async fn test_unknown_shelf_book_is_not_found() {
    let (service, _mock, _temp_dir) = setup_test_service().await;
    sign_up(&service, "Ana").await;

    let result = service.books().set_status("nope", ShelfStatus::Read).await;
    assert!(matches!(result, Err(LuminaError::NotFound(_))));
    assert!(!service.books().remove_from_shelf("nope").await.unwrap());
}

#[tokio::test]
async fn test_shelves_are_private_per_user() {
    let (service, _mock, _temp_dir) = setup_test_service().await;

    sign_up(&service, "Ana").await;
    let book = service.catalog().find("1984").await.unwrap();
    service.books().add_to_shelf(book, ShelfStatus::Read).await.unwrap();
    assert_eq!(service.books().shelf().len(), 1);

    service.auth().sign_out().unwrap();
    assert!(service.books().shelf().is_empty());

    sign_up(&service, "Bruno").await;
    assert!(service.books().load_shelf().await.unwrap().is_empty());

    service.auth().sign_out().unwrap();
    service
        .auth()
        .sign_in("ana@example.com", &password())
        .await
        .unwrap();
    assert_eq!(service.books().load_shelf().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_sign_in_rejects_wrong_password() {
    let (service, _mock, _temp_dir) = setup_test_service().await;
    sign_up(&service, "Ana").await;
    service.auth().sign_out().unwrap();

    let wrong = SecretString::from("wrong password".to_string());
    let result = service.auth().sign_in("ana@example.com", &wrong).await;
    assert!(matches!(result, Err(LuminaError::InvalidInput(_))));
    assert!(service.auth().current_user().is_none());

    let duplicate = service
        .auth()
        .sign_up("Ana Again", "ANA@example.com", &password())
        .await;
    assert!(matches!(duplicate, Err(LuminaError::InvalidInput(_))));
}

#[tokio::test]
async fn test_session_survives_restart() {
    let temp_dir = TempDir::new().unwrap();

    {
        let service = LuminaService::from_config(Config::in_dir(temp_dir.path()))
            .await
            .unwrap();
        sign_up(&service, "Ana").await;
        service.set_theme(ThemePreference::Dark).unwrap();
    }

    let service = LuminaService::from_config(Config::in_dir(temp_dir.path()))
        .await
        .unwrap();
    let user = service.auth().current_user().unwrap();
    assert_eq!(user.display_name, "Ana");
    assert_eq!(service.theme().preference(), ThemePreference::Dark);
    assert_eq!(service.toggle_theme().unwrap(), ThemePreference::Light);
}

#[tokio::test]
async fn test_catalog_search_through_service() {
    let (service, mock, _temp_dir) = setup_test_service().await;

    assert!(service.catalog().search("  ").await.is_empty());
    assert_eq!(mock.search_calls(), 0);

    let results = service.catalog().search("dune").await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "9780441013593");
    assert_eq!(results[0].status, ShelfStatus::Want);
    assert_eq!(mock.search_calls(), 1);
}

#[tokio::test]
async fn test_review_and_comment_thread() {
    let (service, _mock, _temp_dir) = setup_test_service().await;
    sign_up(&service, "Ana").await;

    let review = service
        .reviews()
        .add_review(NewReview {
            book_id: "dom-casmurro".to_string(),
            rating: 5.0,
            title: "Capitu".to_string(),
            text: "Olhos de cigana oblíqua e dissimulada.".to_string(),
            contains_spoilers: false,
        })
        .await
        .unwrap();
    assert_eq!(review.user_name, "Ana");
    assert_eq!(review.comments_count, 0);

    let top = service
        .comments()
        .add_comment(&review.id, "Traiu ou não traiu?", None)
        .await
        .unwrap();
    let reply = service
        .comments()
        .add_comment(&review.id, "Nunca saberemos.", Some(&top.id))
        .await
        .unwrap();

    let thread: CommentThread = service.comments().thread(&review.id).await.unwrap();
    assert_eq!(thread.top_level.len(), 1);
    assert_eq!(thread.top_level[0].id, top.id);
    assert_eq!(thread.replies_to(&top.id).len(), 1);
    assert_eq!(thread.replies_to(&top.id)[0].id, reply.id);
    assert!(thread.replies_to(&reply.id).is_empty());

    let reviews = service.reviews().list_for_book("dom-casmurro").await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].comments_count, 2);

    // Listing refreshes the caches
    assert_eq!(service.reviews().cached_for_book("dom-casmurro"), reviews);
    assert_eq!(service.comments().cached_count(&review.id), 2);
}

#[tokio::test]
async fn test_reply_parent_must_share_review() {
    let (service, _mock, _temp_dir) = setup_test_service().await;
    sign_up(&service, "Ana").await;

    let new_review = |book_id: &str| NewReview {
        book_id: book_id.to_string(),
        rating: 4.0,
        title: "Muito bom".to_string(),
        text: "Recomendo a todo mundo que gosta de clássicos.".to_string(),
        contains_spoilers: false,
    };
    let first = service.reviews().add_review(new_review("1984")).await.unwrap();
    let second = service.reviews().add_review(new_review("1984")).await.unwrap();

    let comment = service
        .comments()
        .add_comment(&first.id, "Concordo", None)
        .await
        .unwrap();

    let cross = service
        .comments()
        .add_comment(&second.id, "Resposta", Some(&comment.id))
        .await;
    assert!(matches!(cross, Err(LuminaError::InvalidInput(_))));

    let missing = service
        .comments()
        .add_comment(&first.id, "Resposta", Some("no-such-comment"))
        .await;
    assert!(matches!(missing, Err(LuminaError::InvalidInput(_))));
}

#[tokio::test]
async fn test_comment_on_unknown_review_is_not_found() {
    let (service, _mock, _temp_dir) = setup_test_service().await;
    sign_up(&service, "Ana").await;

    let result = service
        .comments()
        .add_comment("no-such-review", "Olá", None)
        .await;
    assert!(matches!(result, Err(LuminaError::NotFound(_))));
    assert_eq!(service.comments().cached_count("no-such-review"), 0);
}

#[tokio::test]
async fn test_cached_reviews_track_new_comments() {
    let (service, _mock, _temp_dir) = setup_test_service().await;
    sign_up(&service, "Ana").await;

    let review = service
        .reviews()
        .add_review(NewReview {
            book_id: "1984".to_string(),
            rating: 5.0,
            title: "Atual".to_string(),
            text: "Continua assustadoramente atual, décadas depois.".to_string(),
            contains_spoilers: false,
        })
        .await
        .unwrap();
    service.reviews().list_for_book("1984").await.unwrap();

    service
        .comments()
        .add_comment(&review.id, "oi", None)
        .await
        .unwrap();

    let cached = service.reviews().cached_for_book("1984");
    let live = service.reviews().list_for_book("1984").await.unwrap();
    assert_eq!(cached[0].comments_count, 1);
    assert_eq!(cached[0].comments_count, live[0].comments_count);
}

#[tokio::test]
async fn test_invalid_review_rejected() {
    let (service, _mock, _temp_dir) = setup_test_service().await;
    sign_up(&service, "Ana").await;

    let result = service
        .reviews()
        .add_review(NewReview {
            book_id: "1984".to_string(),
            rating: 3.0,
            title: "Sem texto".to_string(),
            text: "   ".to_string(),
            contains_spoilers: false,
        })
        .await;
    assert!(matches!(result, Err(LuminaError::InvalidInput(_))));
    assert!(service.reviews().list_for_book("1984").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_update_uploads_photo() {
    let (service, _mock, temp_dir) = setup_test_service().await;
    sign_up(&service, "Ana").await;

    let user = service
        .profile()
        .update_profile(ProfileUpdate {
            display_name: Some("Ana Clara".to_string()),
            photo: Some(PhotoUpload {
                extension: "png".to_string(),
                bytes: vec![0x89, b'P', b'N', b'G'],
            }),
        })
        .await
        .unwrap();

    assert_eq!(user.display_name, "Ana Clara");
    let url = user.photo_url.clone().unwrap();
    assert!(url.starts_with("file://"));

    let photo = temp_dir
        .path()
        .join("blobs")
        .join("profile-photos")
        .join(format!("{}.png", user.id));
    assert!(photo.exists());

    assert_eq!(service.auth().current_user().unwrap(), user);
    let profile = service.profile().current_profile().await.unwrap();
    assert_eq!(profile.display_name, "Ana Clara");
    assert_eq!(profile.photo_url, Some(url));
}

#[tokio::test]
async fn test_new_photo_format_replaces_old_file() {
    let (service, _mock, temp_dir) = setup_test_service().await;
    sign_up(&service, "Ana").await;

    let upload = |extension: &str| ProfileUpdate {
        display_name: None,
        photo: Some(PhotoUpload {
            extension: extension.to_string(),
            bytes: vec![1, 2, 3],
        }),
    };

    let user = service.profile().update_profile(upload("png")).await.unwrap();
    let photos = temp_dir.path().join("blobs").join("profile-photos");
    let png = photos.join(format!("{}.png", user.id));
    assert!(png.exists());

    let user = service.profile().update_profile(upload("jpg")).await.unwrap();
    assert!(!png.exists());
    assert!(photos.join(format!("{}.jpg", user.id)).exists());
    assert!(user.photo_url.unwrap().ends_with(".jpg"));
}

#[tokio::test]
async fn test_events_emitted_for_mutations() {
    let (service, _mock, _temp_dir) = setup_test_service().await;
    let mut events = service.subscribe();

    sign_up(&service, "Ana").await;
    let book = service.catalog().find("o-pequeno-principe").await.unwrap();
    service.books().add_to_shelf(book, ShelfStatus::Reading).await.unwrap();
    service.books().set_progress("o-pequeno-principe", 12).await.unwrap();

    assert!(matches!(
        events.recv().await.unwrap(),
        Event::SessionChanged { user_id: Some(_) }
    ));
    assert_eq!(
        events.recv().await.unwrap(),
        Event::ShelfUpdated {
            book_id: "o-pequeno-principe".to_string(),
            status: ShelfStatus::Reading,
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        Event::ProgressUpdated {
            book_id: "o-pequeno-principe".to_string(),
            current_page: 12,
        }
    );
}
