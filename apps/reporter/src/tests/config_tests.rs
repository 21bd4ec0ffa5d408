use super::*;

use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_point_at_local_api() {
    let settings = Settings::default();
    assert_eq!(settings.api_base_url, "http://localhost:5000");
    assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    assert_eq!(settings.location(), None);
}

#[test]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("reporter.toml");
    fs::write(
        &path,
        "api_base_url = \"https://reports.example.org\"\nrequest_timeout_secs = 5\nlatitude = 40.0\nlongitude = -75.0\n",
    )
    .expect("write config");

    let mut settings = Settings::default();
    apply_file(&mut settings, &path);

    assert_eq!(settings.api_base_url, "https://reports.example.org");
    assert_eq!(settings.request_timeout_secs, 5);
    assert_eq!(settings.location(), Location::new(40.0, -75.0));
}

#[test]
fn malformed_or_missing_file_keeps_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("reporter.toml");
    fs::write(&path, "request_timeout_secs = \"soon\"").expect("write config");

    let mut settings = Settings::default();
    apply_file(&mut settings, &path);
    apply_file(&mut settings, &dir.path().join("missing.toml"));

    assert_eq!(settings, Settings::default());
}

#[test]
fn env_overrides_file_and_prefixed_name_wins() {
    let mut settings = Settings {
        api_base_url: "http://from-file".into(),
        ..Settings::default()
    };

    apply_env(
        &mut settings,
        env_from(&[
            ("API_BASE_URL", "http://plain"),
            ("APP__API_BASE_URL", "http://prefixed"),
            ("APP__REQUEST_TIMEOUT_SECS", "not-a-number"),
            ("APP__LATITUDE", "12.5"),
            ("APP__LONGITUDE", "99.25"),
        ]),
    );

    assert_eq!(settings.api_base_url, "http://prefixed");
    assert_eq!(settings.request_timeout_secs, 30);
    assert_eq!(settings.location(), Location::new(12.5, 99.25));
}

#[test]
fn out_of_range_coordinates_yield_no_location() {
    let settings = Settings {
        latitude: Some(123.0),
        longitude: Some(0.0),
        ..Settings::default()
    };
    assert_eq!(settings.location(), None);
}

#[test]
fn unparsable_env_coordinates_keep_file_values() {
    let mut settings = Settings {
        latitude: Some(40.0),
        longitude: Some(-75.0),
        ..Settings::default()
    };

    apply_env(
        &mut settings,
        env_from(&[("APP__LATITUDE", "north"), ("APP__LONGITUDE", "")]),
    );

    assert_eq!(settings.location(), Location::new(40.0, -75.0));
}
