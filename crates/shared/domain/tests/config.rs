use svcd_domain::config::{ApiConfig, DatabaseConfig, LogConfig, LogRotation, ServerConfig};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 8000);
    assert!(server.ssl.is_none());

    let db = DatabaseConfig::default();
    assert_eq!(db.url, "mongodb://localhost:27017");
    assert_eq!(db.name, "servicedomains");
    assert_eq!(db.connect_retries, 3);

    let log = LogConfig::default();
    assert_eq!(log.level, "info");
    assert!(log.directory.is_none());
    assert_eq!(log.rotation, LogRotation::Daily);
    assert_eq!(log.max_files, 10);

    let cfg = ApiConfig::default();
    assert!(cfg.domains.contains_key("customer-offer"));
}

#[test]
fn api_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 8080 },
        "database": { "url": "mem://", "name": "test" },
        "log": { "level": "debug", "json": true, "rotation": "hourly", "max_files": 48 },
        "domains": {
            "party-reference": {
                "record": "party-reference-profile",
                "qualifiers": ["demographics", "relationships"]
            }
        }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.database.url, "mem://");
    assert_eq!(cfg.database.connect_retries, 3);
    assert!(cfg.log.json);
    assert_eq!(cfg.log.rotation, LogRotation::Hourly);
    assert_eq!(cfg.log.max_files, 48);
    assert_eq!(cfg.domains.len(), 1);
    assert_eq!(cfg.domains["party-reference"].qualifiers, ["demographics", "relationships"]);
}

#[test]
fn unknown_domain_keys_are_rejected() {
    let raw = json!({
        "domains": { "x": { "record": "y", "colour": "blue" } }
    });
    assert!(serde_json::from_value::<ApiConfig>(raw).is_err());
}

#[test]
fn unknown_log_rotation_is_rejected() {
    let raw = json!({ "log": { "rotation": "weekly" } });
    assert!(serde_json::from_value::<ApiConfig>(raw).is_err());
}
