//! Test utilities and module declarations for storage tests.

use std::path::PathBuf;
use std::time::Duration;

use mission_chat_core::MISSIONS_SCHEMA;
use tempfile::TempDir;

use crate::{MissionDataset, load_records};

pub const HEADERS: [&str; 6] =
    ["ORGANISATION", "LOCATION", "DATE", "DETAIL", "ROCKET_STATUS", "MISSION_STATUS"];

pub fn fixture_rows() -> Vec<Vec<String>> {
    [
        ["SpaceX", "LC-39A, Kennedy Space Center, Florida", "Fri Aug 04, 2023", "Falcon 9 Block 5 | Starlink Group 6-20", "Active", "Success"],
        ["SpaceX", "SLC-40, Cape Canaveral SFS, Florida", "Sat Aug 26, 2023", "Falcon 9 Block 5 | Crew-7", "Active", "Success"],
        ["ISRO", "Satish Dhawan Space Centre, India", "Fri Jul 14, 2023", "LVM3 | Chandrayaan-3", "Active", "Success"],
        ["Roscosmos", "Satish Dhawan Space Centre, India", "Tue Mar 01, 2022", "Soyuz 2.1b | Test", "Retired", ""],
    ]
    .iter()
    .map(|row| row.iter().map(|v| (*v).to_owned()).collect())
    .collect()
}

pub fn write_fixture_db() -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("missions.db");
    let headers: Vec<String> = HEADERS.iter().map(|h| (*h).to_owned()).collect();
    load_records(&db_path, &MISSIONS_SCHEMA, &headers, &fixture_rows()).unwrap();
    (db_path, temp_dir)
}

pub fn create_test_dataset() -> (MissionDataset, TempDir) {
    let (db_path, temp_dir) = write_fixture_db();
    (MissionDataset::new(db_path, Duration::from_secs(5)), temp_dir)
}
