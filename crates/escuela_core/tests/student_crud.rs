use escuela_core::{
    open_db_in_memory, NewStudent, PersistenceError, SequenceReset, SqliteStudentRepository,
    StudentFilter, StudentRepository, StudentService, StudentUpdate, StudentValidationError,
};
use rusqlite::Connection;
use std::collections::BTreeSet;

const SEED: &[(&str, i64)] = &[
    ("Juan", 10),
    ("Maria", 12),
    ("Jose", 10),
    ("Ana", 18),
    ("Isabel", 16),
    ("Rubén", 19),
    ("Iñigo", 16),
    ("Sergio", 20),
    ("Pepe", 14),
];

fn seed_students() -> Vec<NewStudent> {
    SEED.iter()
        .map(|(name, age)| NewStudent::new(*name, *age))
        .collect()
}

fn seeded_repo(conn: &Connection) -> SqliteStudentRepository<'_> {
    let repo = SqliteStudentRepository::try_new(conn).unwrap();
    repo.clear_all().unwrap();
    repo.insert_many(&seed_students()).unwrap();
    repo
}

fn names(students: &[escuela_core::Student]) -> BTreeSet<String> {
    students.iter().map(|student| student.name.clone()).collect()
}

#[test]
fn list_is_empty_after_schema_and_clear() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    repo.ensure_schema().unwrap();
    repo.insert(&NewStudent::new("Juan", 10)).unwrap();

    assert_eq!(repo.clear_all().unwrap(), 1);
    assert!(repo.list_all().unwrap().is_empty());
}

#[test]
fn batch_insert_assigns_contiguous_ids_from_one() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    let ids: Vec<_> = repo.list_all().unwrap().iter().map(|s| s.id).collect();
    assert_eq!(ids, (1..=9).collect::<Vec<i64>>());
}

#[test]
fn clear_resets_sequence_with_both_strategies() {
    for strategy in [SequenceReset::SqliteSequence, SequenceReset::RecreateTable] {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteStudentRepository::try_new(&conn)
            .unwrap()
            .with_sequence_reset(strategy);
        repo.insert_many(&seed_students()).unwrap();

        assert_eq!(repo.clear_all().unwrap(), SEED.len(), "{strategy:?}");
        let first = repo.insert(&NewStudent::new("Ana", 18)).unwrap();
        assert_eq!(first.id, 1, "{strategy:?}");
    }
}

#[test]
fn ids_are_not_reused_without_reset() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    repo.delete_where(&StudentFilter::All).unwrap();
    let next = repo.insert(&NewStudent::new("Ana", 18)).unwrap();
    assert_eq!(next.id, 10);
}

#[test]
fn filter_adults_returns_exact_set() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    let adults = repo.filter(&StudentFilter::age_at_least(18)).unwrap();
    let expected: BTreeSet<String> = ["Ana", "Rubén", "Sergio"].map(String::from).into();
    assert_eq!(names(&adults), expected);
    assert_eq!(repo.count(&StudentFilter::age_at_least(18)).unwrap(), 3);
}

#[test]
fn delete_jose_reduces_count_by_one() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);
    let before = repo.list_all().unwrap().len();

    let removed = repo.delete_where(&StudentFilter::name_eq("Jose")).unwrap();

    let after = repo.list_all().unwrap();
    assert_eq!(removed, 1);
    assert_eq!(after.len(), before - 1);
    assert!(!names(&after).contains("Jose"));
}

#[test]
fn find_first_then_delete_by_identity_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    let jose = repo
        .find_first(&StudentFilter::name_eq("Jose"))
        .unwrap()
        .unwrap();
    assert_eq!((jose.id, jose.age), (3, 10));

    assert!(repo.delete(&jose).unwrap());
    assert!(!repo.delete(&jose).unwrap());
    assert!(repo.get(jose.id).unwrap().is_none());
    assert!(repo
        .find_first(&StudentFilter::name_eq("Jose"))
        .unwrap()
        .is_none());
}

#[test]
fn delete_minors_removes_exactly_the_young_rows() {
    let expected_removed: BTreeSet<String> =
        ["Juan", "Maria", "Jose", "Pepe"].map(String::from).into();
    let expected_kept: BTreeSet<String> = ["Ana", "Isabel", "Rubén", "Iñigo", "Sergio"]
        .map(String::from)
        .into();

    for jose_removed_first in [false, true] {
        let conn = open_db_in_memory().unwrap();
        let repo = seeded_repo(&conn);
        if jose_removed_first {
            repo.delete_where(&StudentFilter::name_eq("Jose")).unwrap();
        }
        let young = names(&repo.filter(&StudentFilter::age_below(16)).unwrap());

        repo.delete_where(&StudentFilter::age_below(16)).unwrap();

        let remaining = names(&repo.list_all().unwrap());
        assert_eq!(remaining, expected_kept);
        assert!(young.is_subset(&expected_removed));
        assert!(remaining.is_disjoint(&expected_removed));
    }
}

#[test]
fn increment_update_adds_one_and_keeps_identity() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);
    let before = repo.list_all().unwrap();

    let updated = repo
        .update_where(&StudentFilter::All, &StudentUpdate::IncrementAge(1))
        .unwrap();

    let after = repo.list_all().unwrap();
    assert_eq!(updated, before.len());
    assert_eq!(after.len(), before.len());
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(new.id, old.id);
        assert_eq!(new.name, old.name);
        assert_eq!(new.age, old.age + 1);
    }
}

#[test]
fn update_is_pushed_down_and_leaves_snapshots_stale() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);
    let snapshot = repo.get(4).unwrap().unwrap();

    repo.update_where(
        &StudentFilter::age_at_least(18),
        &StudentUpdate::SetAge(30),
    )
    .unwrap();

    assert_eq!(snapshot.age, 18);
    assert_eq!(repo.get(4).unwrap().unwrap().age, 30);
    assert_eq!(repo.get(1).unwrap().unwrap().age, 10);
}

#[test]
fn increment_below_zero_is_rejected_and_leaves_rows_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);
    let before = repo.list_all().unwrap();

    let err = repo
        .update_where(&StudentFilter::All, &StudentUpdate::IncrementAge(-12))
        .unwrap_err();

    assert!(matches!(
        err,
        PersistenceError::Validation(StudentValidationError::NegativeAge(-2))
    ));
    assert_eq!(repo.list_all().unwrap(), before);
}

#[test]
fn increment_is_checked_only_against_matching_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    let updated = repo
        .update_where(
            &StudentFilter::age_at_least(18),
            &StudentUpdate::IncrementAge(-18),
        )
        .unwrap();

    assert_eq!(updated, 3);
    assert_eq!(repo.get(4).unwrap().unwrap().age, 0);
    assert_eq!(repo.get(1).unwrap().unwrap().age, 10);
}

#[test]
fn overflowing_increment_is_rejected_and_table_stays_readable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let juan = repo.insert(&NewStudent::new("Juan", 10)).unwrap();

    let err = repo
        .update_where(&StudentFilter::All, &StudentUpdate::IncrementAge(i64::MAX))
        .unwrap_err();

    assert!(matches!(
        err,
        PersistenceError::Validation(StudentValidationError::AgeOverflow {
            age: 10,
            delta: i64::MAX
        })
    ));
    assert_eq!(repo.list_all().unwrap(), vec![juan]);

    let mut at_limit = repo.insert(&NewStudent::new("Ana", 0)).unwrap();
    repo.update_where(
        &StudentFilter::name_eq("Ana"),
        &StudentUpdate::IncrementAge(i64::MAX),
    )
    .unwrap();
    StudentUpdate::IncrementAge(i64::MAX)
        .apply(&mut at_limit)
        .unwrap();
    assert_eq!(repo.get(at_limit.id).unwrap(), Some(at_limit));
}

#[test]
fn roundtrip_by_id_preserves_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let inserted = repo.insert(&NewStudent::new("Iñigo", 16)).unwrap();
    let loaded = repo.get(inserted.id).unwrap().unwrap();

    assert_eq!(loaded, inserted);
    assert_eq!(loaded.name, "Iñigo");
    assert_eq!(loaded.age, 16);
}

#[test]
fn invalid_records_are_rejected_before_storage() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let err = repo.insert(&NewStudent::new("  ", 10)).unwrap_err();
    assert!(matches!(
        err,
        PersistenceError::Validation(StudentValidationError::BlankName)
    ));

    let batch = vec![NewStudent::new("Ana", 18), NewStudent::new("Pepe", -1)];
    let err = repo.insert_many(&batch).unwrap_err();
    assert!(matches!(
        err,
        PersistenceError::Validation(StudentValidationError::NegativeAge(-1))
    ));
    assert!(repo.list_all().unwrap().is_empty());

    let err = repo
        .update_where(&StudentFilter::All, &StudentUpdate::Rename(String::new()))
        .unwrap_err();
    assert!(matches!(err, PersistenceError::Validation(_)));
}

#[test]
fn invalid_persisted_rows_are_reported() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO Alumnos (Nombre, Edad) VALUES ('', 3);", [])
        .unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let err = repo.list_all().unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}

#[test]
fn repository_rejects_connection_without_students_table() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteStudentRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(PersistenceError::MissingRequiredTable("Alumnos"))
    ));
}

#[test]
fn repository_rejects_table_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE Alumnos (
            Id INTEGER PRIMARY KEY AUTOINCREMENT,
            Nombre TEXT NOT NULL
        );",
    )
    .unwrap();

    let result = SqliteStudentRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(PersistenceError::MissingRequiredColumn {
            table: "Alumnos",
            column: "Edad"
        })
    ));
}

#[test]
fn service_wraps_repository_calls() {
    let conn = open_db_in_memory().unwrap();
    let service = StudentService::new(SqliteStudentRepository::try_new(&conn).unwrap());

    service.ensure_schema().unwrap();
    service.clear_all().unwrap();
    service.insert_many(&seed_students()[..8]).unwrap();
    let pepe = service.insert(&NewStudent::new("Pepe", 14)).unwrap();
    assert_eq!(pepe.id, 9);

    assert_eq!(service.delete_where(&StudentFilter::age_below(16)).unwrap(), 4);
    assert_eq!(
        service
            .update_where(&StudentFilter::All, &StudentUpdate::IncrementAge(1))
            .unwrap(),
        5
    );
    assert_eq!(service.get(8).unwrap().unwrap().age, 21);
    assert_eq!(service.count(&StudentFilter::All).unwrap(), 5);
}

#[test]
fn hand_built_student_is_not_persisted_until_inserted() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);
    let detached = escuela_core::Student {
        id: 42,
        name: "Juan".to_string(),
        age: 10,
    };

    assert!(repo.get(detached.id).unwrap().is_none());
    assert!(!repo.delete(&detached).unwrap());
    assert_eq!(repo.count(&StudentFilter::All).unwrap(), 9);
}
