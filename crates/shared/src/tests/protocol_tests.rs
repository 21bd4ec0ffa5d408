use super::*;

#[test]
fn report_record_maps_lon_lat_coordinates_into_location() {
    let raw = r#"{
        "_id": "r1",
        "disaster_type": "flood",
        "description": "Street flooding",
        "imageUrl": "/uploads/street.jpg",
        "created_at": "Mon, 01 Jan 2024 00:00:00 GMT",
        "location": { "type": "Point", "coordinates": [-75.01, 40.01] },
        "distance": 412.5
    }"#;

    let record: ReportRecord = serde_json::from_str(raw).expect("decode");
    let report = Report::try_from(record).expect("valid report");

    assert_eq!(report.id, ReportId("r1".into()));
    assert_eq!(report.location, Location { lat: 40.01, lon: -75.01 });
    assert_eq!(report.image_url, "/uploads/street.jpg");
    assert_eq!(report.distance_m, Some(412.5));
}

#[test]
fn report_record_without_optional_fields_decodes() {
    let raw = r#"{
        "_id": "r2",
        "disaster_type": "fire",
        "description": "Brush fire",
        "imageUrl": "/uploads/fire.png",
        "location": { "coordinates": [10.0, 20.0] }
    }"#;

    let record: ReportRecord = serde_json::from_str(raw).expect("decode");
    let report = Report::try_from(record).expect("valid report");
    assert_eq!(report.location, Location { lat: 20.0, lon: 10.0 });
    assert_eq!(report.distance_m, None);
}

#[test]
fn report_record_with_swapped_out_of_range_coordinates_is_rejected() {
    let record = ReportRecord {
        id: "bad".into(),
        disaster_type: "flood".into(),
        description: "x".into(),
        image_url: "/uploads/x.png".into(),
        location: GeoPoint {
            kind: None,
            coordinates: [10.0, 120.0],
        },
        distance: None,
    };

    let err = Report::try_from(record).expect_err("latitude 120 is invalid");
    assert_eq!(
        err,
        RecordError::InvalidCoordinates {
            id: "bad".into(),
            coordinates: [10.0, 120.0]
        }
    );
}

#[test]
fn red_zone_record_keeps_distance_and_clamps_negative() {
    let raw = r#"[
        { "_id": "z1", "disaster_type": "flood", "description": "Flood-prone basin", "distance": 1.234 },
        { "_id": "z2", "disaster_type": "fire", "description": "", "distance": -0.5 }
    ]"#;

    let records: Vec<RedZoneRecord> = serde_json::from_str(raw).expect("decode");
    let zones: Vec<RedZone> = records.into_iter().map(RedZone::from).collect();

    assert_eq!(zones[0].distance_km, 1.234);
    assert_eq!(zones[0].description, "Flood-prone basin");
    assert_eq!(zones[1].distance_km, 0.0);
}

#[test]
fn geo_point_from_location_orders_lon_first() {
    let point = GeoPoint::from_location(Location { lat: 40.0, lon: -75.0 });
    assert_eq!(point.coordinates, [-75.0, 40.0]);
    assert_eq!(point.kind.as_deref(), Some("Point"));
}
