use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use price_forecast::data::{
    concat_series, partition_by_item, write_csv, write_csv_file, DataLoader, Observation, Series,
    Timestamp,
};
use price_forecast::PriceError;
use std::fs;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

fn ts(day: u32, hour: u32, minute: u32) -> Timestamp {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

const RAW_EXPORT: &str = "\
name,date,delay,price,time
Anchor,2024-03-04,0,1250,09:15:00
Hunter,2024-03-04,3,480.5,09:15:00
Anchor,2024-03-05,1,1300,10:02:00
";

#[test]
fn test_data_loader_from_csv() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", RAW_EXPORT).unwrap();

    let data = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(data.len(), 3);
    assert_eq!(data[0], Observation::new("Anchor", ts(4, 9, 15), 1250.0));
    assert_eq!(data[1], Observation::new("Hunter", ts(4, 9, 15), 480.5));
    assert_eq!(data[2], Observation::new("Anchor", ts(5, 10, 2), 1300.0));
}

#[test]
fn test_data_loader_trims_fields() {
    let raw = "name,date,delay,price,time\n Anchor , 04/03/2024 ,0, 1250 , 09:15\n";

    let data = DataLoader::from_reader(raw.as_bytes()).unwrap();

    assert_eq!(data, vec![Observation::new("Anchor", ts(4, 9, 15), 1250.0)]);
}

#[test]
fn test_data_loader_rejects_bad_price() {
    let raw = "name,date,delay,price,time\nAnchor,2024-03-04,0,lots,09:15:00\n";

    let result = DataLoader::from_reader(raw.as_bytes());

    assert!(matches!(result, Err(PriceError::ParseError(_))));
}

#[test]
fn test_data_loader_rejects_bad_timestamp() {
    let raw = "name,date,delay,price,time\nAnchor,last tuesday,0,1250,09:15:00\n";

    let result = DataLoader::from_reader(raw.as_bytes());

    assert!(matches!(result, Err(PriceError::ParseError(_))));
}

#[test]
fn test_data_loader_missing_file() {
    let result = DataLoader::from_csv("/definitely/not/here.csv");

    assert!(matches!(result, Err(PriceError::IoError(_))));
}

#[test]
fn test_data_loader_from_directory() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("b_export.csv"),
        "name,date,delay,price,time\nHunter,2024-03-05,0,500,12:00:00\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("a_export.csv"),
        "name,date,delay,price,time\nAnchor,2024-03-04,0,1200,12:00:00\n",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not an export").unwrap();

    let data = DataLoader::from_path(dir.path()).unwrap();

    // Files are read in name order
    assert_eq!(data.len(), 2);
    assert_eq!(data[0].item_id, "Anchor");
    assert_eq!(data[1].item_id, "Hunter");
}

#[test]
fn test_data_loader_empty_directory() {
    let dir = tempdir().unwrap();

    let result = DataLoader::from_directory(dir.path());

    assert!(matches!(result, Err(PriceError::DataError(_))));
}

#[test]
fn test_partition_orders_items_and_points() {
    let observations = vec![
        Observation::new("Hunter", ts(5, 0, 0), 2.0),
        Observation::new("Anchor", ts(6, 0, 0), 3.0),
        Observation::new("Hunter", ts(4, 0, 0), 1.0),
        Observation::new("Anchor", ts(4, 0, 0), 4.0),
    ];

    let partition = partition_by_item(observations).unwrap();

    let items: Vec<&String> = partition.keys().collect();
    assert_eq!(items, vec!["Anchor", "Hunter"]);
    assert_eq!(partition["Hunter"].prices(), &[1.0, 2.0]);
    assert_eq!(partition["Anchor"].prices(), &[4.0, 3.0]);
}

#[test]
fn test_concat_series_keeps_item_order() {
    let a = Series::new("Anchor", vec![(ts(4, 0, 0), 1.0), (ts(5, 0, 0), 2.0)]).unwrap();
    let b = Series::new("Basic", vec![(ts(4, 0, 0), 3.0)]).unwrap();

    let rows = concat_series([&a, &b]);

    let names: Vec<&str> = rows.iter().map(|o| o.item_id.as_str()).collect();
    assert_eq!(names, vec!["Anchor", "Anchor", "Basic"]);
}

#[test]
fn test_write_csv_uses_normalized_header() {
    let rows = vec![
        Observation::new("Anchor", ts(4, 9, 15), 1250.0),
        Observation::new("Hunter", ts(4, 9, 15), 480.5),
    ];
    let mut buffer = Vec::new();

    write_csv(&mut buffer, &rows).unwrap();

    let text = String::from_utf8(buffer).unwrap();
    assert_eq!(
        text,
        "Item_name,Date_time,Price\n\
         Anchor,2024-03-04 09:15:00,1250.0\n\
         Hunter,2024-03-04 09:15:00,480.5\n"
    );
}

#[test]
fn test_write_csv_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("repaired.csv");
    let rows = vec![Observation::new("Basic", ts(4, 0, 0), 50.0)];

    write_csv_file(&path, &rows).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("Item_name,Date_time,Price\n"));
    assert!(text.contains("Basic,2024-03-04 00:00:00,50.0"));
}
