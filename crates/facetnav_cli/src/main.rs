//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `facetnav_core` linkage.
//! - List one namespace path of a database given on the command line.
//!
//! Usage: `facetnav_cli [<db-path> [<namespace-path>]]`

use facetnav_core::{open_db, Namespace, PropertyValue, SqliteDomainStore};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("facetnav_core version={}", facetnav_core::core_version());

    let mut args = std::env::args().skip(1);
    let Some(db_path) = args.next() else {
        return ExitCode::SUCCESS;
    };
    let nav_path = args.next().unwrap_or_default();

    match list(&db_path, &nav_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn list(db_path: &str, nav_path: &str) -> Result<(), Box<dyn Error>> {
    let conn = open_db(db_path)?;
    let store = SqliteDomainStore::try_new(&conn)?;
    let namespace = Namespace::new(&store);

    for item in namespace.list(nav_path)? {
        let marker = if item.is_container { "+" } else { "-" };
        let id = match item.properties.get("Id") {
            Some(PropertyValue::Value(value)) => value.to_string(),
            _ => String::new(),
        };
        println!("{marker} {:<24} {:<22} {id}", item.name, item.item_type);
    }
    Ok(())
}
