use std::fs;

use tempfile::tempdir;
use tracelog_core::increments;
use tracelog_core::reconcile::ReconcileMiss;
use tracelog_core::roots::DEFAULT_EXCLUDED_MARKER;
use tracelog_core::serial::SerialError;
use tracelog_core::table::{self, FileRecord, UserActivityRecord};
use tracelog_core::{build_filenames, derive_roots, UserIds};

fn file(cell_name: &str, file_name: &str, num_nodes: i64, cell_id: i64, file_id: i64) -> FileRecord {
    FileRecord {
        cell_name: cell_name.to_string(),
        file_name: file_name.to_string(),
        id: file_id,
        num_nodes,
        time_ms: num_nodes * 1000,
        cell_id,
        file_id,
    }
}

fn activity(cell_name: &str, user_name: &str, date: &str, files: &str) -> UserActivityRecord {
    UserActivityRecord {
        cell_name: cell_name.to_string(),
        user_name: user_name.to_string(),
        date: date.to_string(),
        files: files.to_string(),
    }
}

fn make_files() -> Vec<FileRecord> {
    vec![
        file("768_061_ch00", "target.1.nml", 0, 0, 0),
        file("768_061_ch00", "skeleton-031215.001.nml", 140, 0, 1),
        file("768_061_ch00", "skeleton-031215.002.nml", 180, 0, 2),
        file("768_061_ch00", "skeleton-031215.003.nml", 260, 0, 3),
        file("878_067_GM", "skel-gm.118.xml", 20, 1, 4),
        file("878_067_GM", "skel-gm.119.xml", 35, 1, 5),
    ]
}

#[test]
fn test_reconcile_orders_by_row_then_serial() {
    let files = make_files();
    let roots = derive_roots(&files, DEFAULT_EXCLUDED_MARKER);
    let users = vec![
        activity("768_061_ch00", "rh", "3/09/16", "001-002"),
        activity("878_067_GM", "jm", "3/10/16", "118-119"),
        activity("768_061_ch00", "rh", "3/11/16", "003"),
    ];

    let mut ids = UserIds::new();
    let result = build_filenames(&files, &users, &roots, &mut ids);

    let names: Vec<&str> = result.records.iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "skeleton-031215.001.nml",
            "skeleton-031215.002.nml",
            "skel-gm.118.xml",
            "skel-gm.119.xml",
            "skeleton-031215.003.nml",
        ]
    );
    let user_ids: Vec<i64> = result.records.iter().map(|r| r.user_id).collect();
    assert_eq!(user_ids, vec![0, 0, 1, 1, 0]);
    assert_eq!(result.records[2].cell_id, 1);
    assert_eq!(result.records[2].file_id, 4);
    assert_eq!(result.records[4].date, "3/11/16");
    assert!(result.misses.is_empty());
}

#[test]
fn test_misses_are_reported_not_fatal() {
    let files = make_files();
    let roots = derive_roots(&files, DEFAULT_EXCLUDED_MARKER);
    let users = vec![
        activity("768_061_ch00", "rh", "3/09/16", "003-004"),
        activity("999_000_XX", "ak", "3/09/16", "001"),
        activity("878_067_GM", "jm", "3/09/16", "x-y"),
        activity("878_067_GM", "jm", "3/09/16", "119"),
    ];

    let mut ids = UserIds::new();
    let result = build_filenames(&files, &users, &roots, &mut ids);

    assert_eq!(result.records.len(), 2);
    assert_eq!(
        result.misses,
        vec![
            ReconcileMiss::NoMatch {
                row: 0,
                file_name: "skeleton-031215.004.nml".to_string()
            },
            ReconcileMiss::UnknownCell {
                row: 1,
                cell_name: "999_000_XX".to_string()
            },
            ReconcileMiss::BadSerial {
                row: 2,
                error: SerialError::NotNumeric("x-y".to_string())
            },
        ]
    );
    // Only users with at least one matched file get an id.
    assert_eq!(ids.get("ak"), None);
    assert_eq!(ids.get("jm"), Some(1));
}

#[test]
fn test_user_ids_carry_across_calls() {
    let files = make_files();
    let roots = derive_roots(&files, DEFAULT_EXCLUDED_MARKER);
    let mut ids = UserIds::new();

    build_filenames(
        &files,
        &[activity("878_067_GM", "jm", "1/1/16", "118")],
        &roots,
        &mut ids,
    );
    let second = build_filenames(
        &files,
        &[
            activity("768_061_ch00", "rh", "1/2/16", "001"),
            activity("878_067_GM", "jm", "1/2/16", "119"),
        ],
        &roots,
        &mut ids,
    );

    let user_ids: Vec<i64> = second.records.iter().map(|r| r.user_id).collect();
    assert_eq!(user_ids, vec![1, 0]);
}

#[test]
fn test_csv_round_through_files() {
    let dir = tempdir().unwrap();
    let files_csv = dir.path().join("nodes.csv");
    let users_csv = dir.path().join("users.csv");
    let out_csv = dir.path().join("reconciled.csv");

    fs::write(
        &files_csv,
        "cellname,filename,id,num_nodes,time_ms,cell_id,file_id\n\
         768_061_ch00,target.1.nml,0,0,0,0,0\n\
         768_061_ch00,skeleton-031215-1410.001.nml,1,140,595065,0,1\n\
         768_061_ch00,skeleton-031215-1410.002.nml,2,190,795065,0,2\n",
    )
    .unwrap();
    fs::write(
        &users_csv,
        "cell_name,user_name,date,files\n768_061_ch00, rh ,3/09/16,001-002\n",
    )
    .unwrap();

    let files = table::read_file_records(&files_csv).unwrap();
    let users = table::read_user_activity(&users_csv).unwrap();
    assert_eq!(files[1].cell_name, "768_061_ch00");
    assert_eq!(users[0].user_name, "rh");

    let roots = derive_roots(&files, DEFAULT_EXCLUDED_MARKER);
    let result = build_filenames(&files, &users, &roots, &mut UserIds::new());
    table::write_reconciled(&result.records, &out_csv).unwrap();

    assert_eq!(
        fs::read_to_string(&out_csv).unwrap(),
        "cell_name,file_name,date,user_name,user_id,cell_id,file_id\n\
         768_061_ch00,skeleton-031215-1410.001.nml,3/09/16,rh,0,0,1\n\
         768_061_ch00,skeleton-031215-1410.002.nml,3/09/16,rh,0,0,2\n"
    );
}

#[test]
fn test_increments_written_alongside_file_columns() {
    let dir = tempdir().unwrap();
    let out_csv = dir.path().join("increments.csv");
    let files = make_files();

    let rows = increments::increment_records(&files);
    table::write_increments(&rows, &out_csv).unwrap();

    let contents = fs::read_to_string(&out_csv).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("cell_name,file_name,id,num_nodes,time_ms,cell_id,file_id,nodes_added,time_elapsed_ms")
    );
    assert_eq!(lines.nth(2), Some("768_061_ch00,skeleton-031215.002.nml,2,180,180000,0,2,40,40000"));
    assert_eq!(lines.nth(1), Some("878_067_GM,skel-gm.118.xml,4,20,20000,1,4,20,0"));
}
