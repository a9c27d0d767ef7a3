//! The fixed walkthrough over the student store.
//!
//! Every step prints a status line and, where relevant, the rows it read
//! back. Listings are always re-fetched so bulk changes are visible.

use escuela_core::{
    NewStudent, Student, StudentFilter, StudentRepository, StudentService, StudentUpdate,
};
use log::debug;
use std::error::Error;
use std::io::Write;

/// Students inserted as one batch.
pub const BATCH: &[(&str, i64)] = &[
    ("Juan", 10),
    ("Maria", 12),
    ("Jose", 10),
    ("Ana", 18),
    ("Isabel", 16),
    ("Rubén", 19),
    ("Iñigo", 16),
    ("Sergio", 20),
];

/// Inserted on its own after the batch.
pub const LATE_ARRIVAL: (&str, i64) = ("Pepe", 14);

const ADULT_AGE: i64 = 18;
const MINIMUM_AGE: i64 = 16;
const TARGET_NAME: &str = "Jose";

/// Runs the walkthrough against `service`, writing console lines to `out`.
pub fn run<R, W>(service: &StudentService<R>, out: &mut W) -> Result<(), Box<dyn Error>>
where
    R: StudentRepository,
    W: Write,
{
    service.ensure_schema()?;
    writeln!(out, "Base de datos creada exitosamente!")?;

    service.clear_all()?;
    writeln!(out, "Base de datos limpiada exitosamente!")?;

    let batch: Vec<NewStudent> = BATCH
        .iter()
        .map(|(name, age)| NewStudent::new(*name, *age))
        .collect();
    service.insert_many(&batch)?;
    service.insert(&NewStudent::new(LATE_ARRIVAL.0, LATE_ARRIVAL.1))?;
    writeln!(out, "\nAlumnos agregados exitosamente!")?;
    print_all(service, out)?;

    writeln!(out, "\nAlumnos mayores de {ADULT_AGE}:")?;
    print_students(out, &service.filter(&StudentFilter::age_at_least(ADULT_AGE))?)?;

    writeln!(out, "\nBorramos a {TARGET_NAME}")?;
    if let Some(target) = service.find_first(&StudentFilter::name_eq(TARGET_NAME))? {
        writeln!(out, "{target}\n")?;
        service.delete(&target)?;
    }
    let snapshot = print_all(service, out)?;

    writeln!(
        out,
        "\nBorramos todos los alumnos con menos de {MINIMUM_AGE} años."
    )?;
    let minors = StudentFilter::age_below(MINIMUM_AGE);
    let removed = service.delete_where(&minors)?;
    let expected: Vec<Student> = snapshot
        .into_iter()
        .filter(|student| !minors.matches(student))
        .collect();
    let snapshot = print_all(service, out)?;
    ensure_consistent("delete_where", removed, &expected, &snapshot)?;

    writeln!(out, "Aumentando la edad de todos los alumnos...")?;
    let birthday = StudentUpdate::IncrementAge(1);
    let updated = service.update_where(&StudentFilter::All, &birthday)?;
    let mut expected = snapshot;
    for student in &mut expected {
        birthday.apply(student)?;
    }
    writeln!(out, "Edades actualizadas. Lista de alumnos:")?;
    let refreshed = print_all(service, out)?;
    ensure_consistent("update_where", updated, &expected, &refreshed)?;

    Ok(())
}

/// Prints a fresh listing and hands it back as the new snapshot.
fn print_all<R: StudentRepository, W: Write>(
    service: &StudentService<R>,
    out: &mut W,
) -> Result<Vec<Student>, Box<dyn Error>> {
    let students = service.list_all()?;
    print_students(out, &students)?;
    Ok(students)
}

/// Compares the re-fetched rows with the snapshot the step was applied to.
fn ensure_consistent(
    step: &str,
    affected: usize,
    expected: &[Student],
    refreshed: &[Student],
) -> Result<(), Box<dyn Error>> {
    if expected != refreshed {
        return Err(format!(
            "{step} affected {affected} rows but the stored rows differ from the updated snapshot"
        )
        .into());
    }
    debug!("event=walkthrough_step module=cli step={step} status=ok affected={affected}");
    Ok(())
}

fn print_students<W: Write>(out: &mut W, students: &[Student]) -> std::io::Result<()> {
    for student in students {
        writeln!(out, "{student}")?;
    }
    Ok(())
}
