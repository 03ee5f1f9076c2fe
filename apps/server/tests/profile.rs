use std::path::Path;

fn workspace_manifest() -> toml::Table {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../Cargo.toml");
    let text = std::fs::read_to_string(&path).unwrap();
    text.parse().unwrap()
}

#[test]
fn every_profile_unwinds_on_panic() {
    let manifest = workspace_manifest();
    let profiles = manifest["profile"].as_table().unwrap();
    assert!(profiles.contains_key("release"));

    for (name, profile) in profiles {
        let strategy = profile.get("panic").and_then(toml::Value::as_str).unwrap_or("unwind");
        assert_eq!(strategy, "unwind", "profile.{name} must unwind for panic isolation");
    }
}

#[test]
fn test_binary_unwinds() {
    let caught = std::panic::catch_unwind(|| panic!("contained"));
    assert!(caught.is_err());
    assert!(cfg!(panic = "unwind"));
}
