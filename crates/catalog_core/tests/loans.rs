use catalog_core::db::open_db_in_memory;
use catalog_core::{
    AuthorDraft, AuthorRepository, BookDraft, BookInstance, BookRef, BookRepository,
    CatalogService, GenreRepository, IdentityRepository, InstanceRepository, LanguageRepository,
    LoanService, LoanServiceError, LoanStatus, RouteTable, SqliteAuthorRepository,
    SqliteBookRepository, SqliteIdentityRepository, SqliteInstanceRepository,
    SqliteLabelRepository,
};
use chrono::NaiveDate;
use rusqlite::Connection;
use uuid::Uuid;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

fn stored_copy(
    conn: &Connection,
    status: LoanStatus,
    borrower: Option<i64>,
    due_back: Option<NaiveDate>,
) -> Uuid {
    let repo = SqliteInstanceRepository::try_new(conn).unwrap();
    let mut copy = BookInstance::new(None, "imprint");
    copy.status = status;
    copy.borrower = borrower;
    copy.due_back = due_back;
    repo.create_instance(&copy).unwrap()
}

fn loans(conn: &Connection) -> LoanService<SqliteInstanceRepository<'_>> {
    LoanService::new(SqliteInstanceRepository::try_new(conn).unwrap())
}

#[test]
fn loaned_books_by_user_lists_only_that_borrowers_loans() {
    let conn = setup();
    let identities = SqliteIdentityRepository::try_new(&conn).unwrap();
    identities.register_borrower(1, "alice").unwrap();
    identities.register_borrower(2, "bob").unwrap();

    let later = stored_copy(&conn, LoanStatus::OnLoan, Some(1), Some(date(3, 20)));
    let sooner = stored_copy(&conn, LoanStatus::OnLoan, Some(1), Some(date(3, 5)));
    stored_copy(&conn, LoanStatus::OnLoan, Some(2), Some(date(3, 1)));
    stored_copy(&conn, LoanStatus::Reserved, Some(1), Some(date(3, 1)));

    let ids: Vec<_> = loans(&conn)
        .loaned_books_by_user(1)
        .unwrap()
        .iter()
        .map(BookInstance::id)
        .collect();
    assert_eq!(ids, vec![sooner, later]);
}

#[test]
fn all_borrowed_lists_every_copy_on_loan() {
    let conn = setup();
    let identities = SqliteIdentityRepository::try_new(&conn).unwrap();
    identities.register_borrower(1, "alice").unwrap();
    identities.register_borrower(2, "bob").unwrap();

    stored_copy(&conn, LoanStatus::OnLoan, Some(1), Some(date(3, 20)));
    stored_copy(&conn, LoanStatus::OnLoan, Some(2), Some(date(3, 5)));
    stored_copy(&conn, LoanStatus::Available, None, None);

    let borrowed = loans(&conn).all_borrowed().unwrap();
    assert_eq!(borrowed.len(), 2);
    assert!(borrowed
        .iter()
        .all(|copy| copy.status == LoanStatus::OnLoan));
    assert_eq!(borrowed[0].due_back, Some(date(3, 5)));
}

#[test]
fn overdue_uses_strictly_past_due_dates() {
    let conn = setup();
    let past = stored_copy(&conn, LoanStatus::OnLoan, None, Some(date(3, 9)));
    stored_copy(&conn, LoanStatus::OnLoan, None, Some(date(3, 10)));
    stored_copy(&conn, LoanStatus::Available, None, None);

    let overdue = loans(&conn).overdue(date(3, 10)).unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id(), past);
}

#[test]
fn lend_puts_copy_on_loan() {
    let conn = setup();
    let identities = SqliteIdentityRepository::try_new(&conn).unwrap();
    identities.register_borrower(5, "reader").unwrap();
    let id = stored_copy(&conn, LoanStatus::Available, None, None);

    let service = loans(&conn);
    service.lend(id, 5, date(4, 1)).unwrap();

    let borrowed = service.loaned_books_by_user(5).unwrap();
    assert_eq!(borrowed.len(), 1);
    assert_eq!(borrowed[0].id(), id);
    assert_eq!(borrowed[0].due_back, Some(date(4, 1)));
}

#[test]
fn lend_to_unknown_borrower_is_rejected() {
    let conn = setup();
    let id = stored_copy(&conn, LoanStatus::Available, None, None);

    let err = loans(&conn).lend(id, 77, date(4, 1)).unwrap_err();
    assert!(matches!(err, LoanServiceError::Repo(_)));
}

#[test]
fn renew_moves_due_date_within_window() {
    let conn = setup();
    let id = stored_copy(&conn, LoanStatus::OnLoan, None, Some(date(3, 1)));
    let repo = SqliteInstanceRepository::try_new(&conn).unwrap();

    let renewed = loans(&conn).renew(id, date(3, 29), date(3, 1)).unwrap();
    assert_eq!(renewed.due_back, Some(date(3, 29)));
    assert_eq!(
        repo.get_instance(id).unwrap().unwrap().due_back,
        Some(date(3, 29))
    );
}

#[test]
fn renew_outside_window_leaves_copy_unchanged() {
    let conn = setup();
    let id = stored_copy(&conn, LoanStatus::OnLoan, None, Some(date(3, 1)));
    let repo = SqliteInstanceRepository::try_new(&conn).unwrap();
    let service = loans(&conn);

    assert!(matches!(
        service.renew(id, date(3, 30), date(3, 1)).unwrap_err(),
        LoanServiceError::RenewalTooFar { .. }
    ));
    assert!(matches!(
        service.renew(id, date(2, 28), date(3, 1)).unwrap_err(),
        LoanServiceError::RenewalInPast { .. }
    ));
    assert_eq!(
        repo.get_instance(id).unwrap().unwrap().due_back,
        Some(date(3, 1))
    );
}

#[test]
fn mark_returned_makes_copy_available() {
    let conn = setup();
    let identities = SqliteIdentityRepository::try_new(&conn).unwrap();
    identities.register_borrower(3, "carol").unwrap();
    let id = stored_copy(&conn, LoanStatus::OnLoan, Some(3), Some(date(2, 1)));

    let service = loans(&conn);
    let returned = service.mark_returned(id).unwrap();
    assert_eq!(returned.status, LoanStatus::Available);
    assert_eq!(returned.borrower, None);
    assert_eq!(returned.due_back, None);
    assert!(!returned.is_overdue_on(date(3, 1)));
    assert!(service.loaned_books_by_user(3).unwrap().is_empty());
}

#[test]
fn operations_on_unknown_copy_return_not_found() {
    let conn = setup();
    let service = loans(&conn);
    let missing = Uuid::new_v4();

    assert!(matches!(
        service.mark_returned(missing).unwrap_err(),
        LoanServiceError::InstanceNotFound(id) if id == missing
    ));
    assert!(matches!(
        service.renew(missing, date(3, 2), date(3, 1)).unwrap_err(),
        LoanServiceError::InstanceNotFound(_)
    ));
}

#[test]
fn austen_emma_walkthrough() {
    let conn = setup();
    let labels = SqliteLabelRepository::try_new(&conn).unwrap();
    let authors = SqliteAuthorRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();
    let instances = SqliteInstanceRepository::try_new(&conn).unwrap();
    let routes = RouteTable::catalog_defaults();

    let romance = labels.create_genre("Romance").unwrap();
    let english = labels.create_language("English").unwrap();
    let austen = authors
        .create_author(&AuthorDraft::new("Jane", "Austen"))
        .unwrap();
    assert_eq!(austen.to_string(), format!("{}, Austen, Jane", austen.id));
    assert_eq!(
        austen.absolute_url(&routes).unwrap(),
        format!("/catalog/author/{}", austen.id)
    );

    let mut draft = BookDraft::new("Emma");
    draft.author = Some(austen.id);
    draft.language = Some(english.id);
    draft.isbn = "9780141439587".to_string();
    draft.genres = vec![romance.id];
    let emma = books.create_book(&draft).unwrap();
    assert_eq!(emma.to_string(), "Emma");
    assert_eq!(emma.display_genre(), "Romance");
    assert_eq!(
        emma.absolute_url(&routes).unwrap(),
        format!("/catalog/book/{}", emma.id)
    );

    let mut copy = BookInstance::new(
        Some(BookRef {
            id: emma.id,
            title: emma.title.clone(),
        }),
        "Penguin Classics, 2003",
    );
    copy.status = LoanStatus::OnLoan;
    copy.due_back = Some(date(1, 1));
    let copy_id = instances.create_instance(&copy).unwrap();

    let stored = instances.get_instance(copy_id).unwrap().unwrap();
    assert!(stored.is_overdue_on(date(1, 2)));
    assert!(stored.is_overdue());
    assert_eq!(stored.to_string(), format!("{copy_id} (Emma)"));

    let catalog = CatalogService::new(
        SqliteBookRepository::try_new(&conn).unwrap(),
        SqliteInstanceRepository::try_new(&conn).unwrap(),
        SqliteAuthorRepository::try_new(&conn).unwrap(),
    );
    let summary = catalog.summary().unwrap();
    assert_eq!(summary.num_books, 1);
    assert_eq!(summary.num_instances, 1);
    assert_eq!(summary.num_instances_available, 0);
    assert_eq!(summary.num_authors, 1);

    let detail = catalog.book_detail(emma.id).unwrap().unwrap();
    assert_eq!(detail.copies.len(), 1);
    let author_detail = catalog.author_detail(austen.id).unwrap().unwrap();
    assert_eq!(author_detail.books, vec![emma.clone()]);

    authors.delete_author(austen.id).unwrap();
    let orphaned = books.get_book(emma.id).unwrap().unwrap();
    assert_eq!(orphaned.author, None);
    assert!(catalog.author_detail(austen.id).unwrap().is_none());
}

#[test]
fn catalog_detail_for_missing_records_is_none() {
    let conn = setup();
    let catalog = CatalogService::new(
        SqliteBookRepository::try_new(&conn).unwrap(),
        SqliteInstanceRepository::try_new(&conn).unwrap(),
        SqliteAuthorRepository::try_new(&conn).unwrap(),
    );
    assert!(catalog.book_detail(1).unwrap().is_none());
    assert!(catalog.author_detail(1).unwrap().is_none());
    let summary = catalog.summary().unwrap();
    assert_eq!(summary.num_books, 0);
    assert_eq!(summary.num_instances_available, 0);
}
