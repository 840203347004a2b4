use catalog_core::db::migrations::latest_version;
use catalog_core::db::open_db_in_memory;
use catalog_core::{
    AuthorDraft, AuthorRepository, BookDraft, BookListQuery, BookRepository,
    CatalogValidationError, GenreRepository, LanguageRepository, ListPage, RepoError,
    SqliteAuthorRepository, SqliteBookRepository, SqliteLabelRepository,
};
use chrono::NaiveDate;
use rusqlite::Connection;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

#[test]
fn genres_and_languages_list_by_name() {
    let conn = setup();
    let labels = SqliteLabelRepository::try_new(&conn).unwrap();

    labels.create_genre("Science Fiction").unwrap();
    labels.create_genre("Fantasy").unwrap();
    let english = labels.create_language("English").unwrap();

    let names: Vec<_> = labels
        .list_genres()
        .unwrap()
        .into_iter()
        .map(|genre| genre.name)
        .collect();
    assert_eq!(names, vec!["Fantasy", "Science Fiction"]);

    let loaded = labels.get_language(english.id).unwrap().unwrap();
    assert_eq!(loaded.to_string(), "English");
}

#[test]
fn blank_genre_name_is_rejected() {
    let conn = setup();
    let labels = SqliteLabelRepository::try_new(&conn).unwrap();

    let err = labels.create_genre("  ").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(CatalogValidationError::BlankField { .. })
    ));
}

#[test]
fn rename_and_delete_missing_label_return_not_found() {
    let conn = setup();
    let labels = SqliteLabelRepository::try_new(&conn).unwrap();

    assert!(matches!(
        labels.rename_genre(42, "Drama").unwrap_err(),
        RepoError::NotFound { entity: "genre", .. }
    ));
    assert!(matches!(
        labels.delete_language(42).unwrap_err(),
        RepoError::NotFound {
            entity: "language",
            ..
        }
    ));
}

#[test]
fn authors_list_by_last_name_with_pagination() {
    let conn = setup();
    let authors = SqliteAuthorRepository::try_new(&conn).unwrap();

    authors
        .create_author(&AuthorDraft::new("Leo", "Tolstoy"))
        .unwrap();
    authors
        .create_author(&AuthorDraft::new("Jane", "Austen"))
        .unwrap();
    authors
        .create_author(&AuthorDraft::new("Miguel", "Cervantes"))
        .unwrap();

    let all: Vec<_> = authors
        .list_authors(&ListPage::default())
        .unwrap()
        .into_iter()
        .map(|author| author.last_name)
        .collect();
    assert_eq!(all, vec!["Austen", "Cervantes", "Tolstoy"]);

    let page = authors
        .list_authors(&ListPage {
            limit: Some(1),
            offset: 1,
        })
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].last_name, "Cervantes");

    let tail = authors
        .list_authors(&ListPage {
            limit: None,
            offset: 2,
        })
        .unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].last_name, "Tolstoy");
}

#[test]
fn author_dates_roundtrip_and_update() {
    let conn = setup();
    let authors = SqliteAuthorRepository::try_new(&conn).unwrap();

    let born = NaiveDate::from_ymd_opt(1775, 12, 16).unwrap();
    let died = NaiveDate::from_ymd_opt(1817, 7, 18).unwrap();
    let mut author = authors
        .create_author(&AuthorDraft::new("Jane", "Austen").born(born))
        .unwrap();

    author.date_of_death = Some(died);
    authors.update_author(&author).unwrap();

    let loaded = authors.get_author(author.id).unwrap().unwrap();
    assert_eq!(loaded.date_of_birth, Some(born));
    assert_eq!(loaded.date_of_death, Some(died));
    assert_eq!(loaded.to_string(), format!("{}, Austen, Jane", author.id));
}

#[test]
fn book_keeps_genres_in_association_order() {
    let conn = setup();
    let labels = SqliteLabelRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let drama = labels.create_genre("Drama").unwrap();
    let adventure = labels.create_genre("Adventure").unwrap();
    let fantasy = labels.create_genre("Fantasy").unwrap();

    let mut draft = BookDraft::new("The Hobbit");
    draft.genres = vec![fantasy.id, adventure.id, drama.id, fantasy.id];
    let book = books.create_book(&draft).unwrap();

    let names: Vec<_> = book.genres.iter().map(|genre| genre.name.as_str()).collect();
    assert_eq!(names, vec!["Fantasy", "Adventure", "Drama"]);
    assert_eq!(book.display_genre(), "Fantasy, Adventure, Drama");
    assert_eq!(
        books.display_genre(book.id).unwrap(),
        "Fantasy, Adventure, Drama"
    );
}

#[test]
fn display_genre_shows_at_most_three_names() {
    let conn = setup();
    let labels = SqliteLabelRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let mut draft = BookDraft::new("Anthology");
    for name in ["A", "B", "C", "D", "E"] {
        draft.genres.push(labels.create_genre(name).unwrap().id);
    }
    let book = books.create_book(&draft).unwrap();
    assert_eq!(book.genres.len(), 5);
    assert_eq!(books.display_genre(book.id).unwrap(), "A, B, C");

    let bare = books.create_book(&BookDraft::new("No genres")).unwrap();
    assert_eq!(books.display_genre(bare.id).unwrap(), "");
    assert_eq!(bare.display_genre(), "");
}

#[test]
fn update_book_replaces_genre_set() {
    let conn = setup();
    let labels = SqliteLabelRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let poetry = labels.create_genre("Poetry").unwrap();
    let drama = labels.create_genre("Drama").unwrap();

    let mut draft = BookDraft::new("Collected Works");
    draft.genres = vec![poetry.id];
    let book = books.create_book(&draft).unwrap();

    let mut changed = book.to_draft();
    changed.title = "Collected Plays".to_string();
    changed.genres = vec![drama.id];
    let updated = books.update_book(book.id, &changed).unwrap();

    assert_eq!(updated.title, "Collected Plays");
    assert_eq!(updated.genres, vec![drama]);
}

#[test]
fn book_with_missing_reference_is_rejected_without_partial_write() {
    let conn = setup();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let mut draft = BookDraft::new("Orphan");
    draft.author = Some(404);
    let err = books.create_book(&draft).unwrap_err();
    assert!(matches!(
        err,
        RepoError::MissingReference {
            entity: "author",
            ..
        }
    ));
    assert_eq!(books.count_books().unwrap(), 0);
}

#[test]
fn overlong_summary_is_rejected() {
    let conn = setup();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let mut draft = BookDraft::new("Verbose");
    draft.summary = "x".repeat(1001);
    let err = books.create_book(&draft).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(CatalogValidationError::FieldTooLong {
            field: "book.summary",
            ..
        })
    ));
}

#[test]
fn deleting_author_keeps_book_and_clears_reference() {
    let conn = setup();
    let authors = SqliteAuthorRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let author = authors
        .create_author(&AuthorDraft::new("Jane", "Austen"))
        .unwrap();
    let mut draft = BookDraft::new("Emma");
    draft.author = Some(author.id);
    let book = books.create_book(&draft).unwrap();

    authors.delete_author(author.id).unwrap();

    let loaded = books.get_book(book.id).unwrap().expect("book survives");
    assert_eq!(loaded.author, None);
    assert_eq!(loaded.title, "Emma");
}

#[test]
fn deleting_language_and_genre_keeps_book() {
    let conn = setup();
    let labels = SqliteLabelRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let spanish = labels.create_language("Spanish").unwrap();
    let novel = labels.create_genre("Novel").unwrap();
    let mut draft = BookDraft::new("Don Quijote");
    draft.language = Some(spanish.id);
    draft.genres = vec![novel.id];
    let book = books.create_book(&draft).unwrap();

    labels.delete_language(spanish.id).unwrap();
    labels.delete_genre(novel.id).unwrap();

    let loaded = books.get_book(book.id).unwrap().unwrap();
    assert_eq!(loaded.language, None);
    assert!(loaded.genres.is_empty());
}

#[test]
fn list_books_filters_by_author_and_orders_by_title() {
    let conn = setup();
    let authors = SqliteAuthorRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let austen = authors
        .create_author(&AuthorDraft::new("Jane", "Austen"))
        .unwrap();
    for title in ["Persuasion", "Emma"] {
        let mut draft = BookDraft::new(title);
        draft.author = Some(austen.id);
        books.create_book(&draft).unwrap();
    }
    books.create_book(&BookDraft::new("Ulysses")).unwrap();

    let titles: Vec<_> = books
        .list_books(&BookListQuery {
            author: Some(austen.id),
            ..BookListQuery::default()
        })
        .unwrap()
        .into_iter()
        .map(|book| book.title)
        .collect();
    assert_eq!(titles, vec!["Emma", "Persuasion"]);
    assert_eq!(books.count_books().unwrap(), 3);
}

#[test]
fn display_genre_for_missing_book_is_not_found() {
    let conn = setup();
    let books = SqliteBookRepository::try_new(&conn).unwrap();
    assert!(matches!(
        books.display_genre(7).unwrap_err(),
        RepoError::NotFound { entity: "book", .. }
    ));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteBookRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE authors (
            id INTEGER PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteAuthorRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "authors",
            column: "date_of_birth"
        })
    ));
}
