#![allow(dead_code)]

use csvview::{Args, CellValue, Table};
use std::fs;
use std::path::{Path, PathBuf};

/// A table with an `id` column of 1..=rows and a `name` column.
pub fn numbered_table(rows: usize) -> Table {
    Table::from_rows(
        vec!["id".to_string(), "name".to_string()],
        (1..=rows)
            .map(|i| vec![CellValue::Int(i as i64), CellValue::from(format!("row {}", i))])
            .collect(),
    )
    .unwrap()
}

pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Args with every option unset.
pub fn args_for(paths: Vec<PathBuf>) -> Args {
    Args {
        paths,
        encoding: None,
        delimiter: None,
        no_header: None,
        rows_per_page: None,
        page: None,
        theme: None,
        view: None,
        select: None,
        compare: None,
        diff_algorithm: None,
        set: Vec::new(),
        save_csv: None,
        output: None,
        debug: false,
        generate_config: false,
        force: false,
    }
}
