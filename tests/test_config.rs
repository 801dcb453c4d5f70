use mimic::config::Config;
use std::io::Write;
use std::path::PathBuf;

#[test]
fn test_config_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.listen_addr, "127.0.0.1:9919");
    assert_eq!(cfg.routes_file, PathBuf::from("routes.mock"));
    assert_eq!(cfg.debug_routes_path.as_deref(), Some("/mimic/debug/routes"));
}

#[test]
fn test_config_partial_yaml_keeps_defaults() {
    let cfg = Config::from_yaml_str("listen_addr: 0.0.0.0:3000\n").unwrap();
    assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
    assert_eq!(cfg.routes_file, PathBuf::from("routes.mock"));
}

#[test]
fn test_config_yaml_disables_debug_listing() {
    let cfg = Config::from_yaml_str("routes_file: mocks/api.mock\ndebug_routes_path: null\n").unwrap();
    assert_eq!(cfg.routes_file, PathBuf::from("mocks/api.mock"));
    assert_eq!(cfg.debug_routes_path, None);
}

#[test]
fn test_config_invalid_yaml() {
    assert!(Config::from_yaml_str("listen_addr: [1, 2").is_err());
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1, cfg2);
}

// Environment variables are process-wide, so every env-driven case lives in
// this one test.
#[test]
fn test_config_env_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "listen_addr: 127.0.0.1:7000").unwrap();
    writeln!(file, "routes_file: from-file.mock").unwrap();

    unsafe {
        std::env::remove_var("LISTEN");
        std::env::remove_var("ROUTES_FILE");
        std::env::set_var("MIMIC_CONFIG", file.path());
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.listen_addr, "127.0.0.1:7000");
    assert_eq!(cfg.routes_file, PathBuf::from("from-file.mock"));

    unsafe {
        std::env::set_var("LISTEN", "0.0.0.0:5000");
        std::env::set_var("ROUTES_FILE", "override.mock");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.listen_addr, "0.0.0.0:5000");
    assert_eq!(cfg.routes_file, PathBuf::from("override.mock"));

    unsafe {
        std::env::set_var("MIMIC_CONFIG", "/definitely/not/here.yaml");
    }
    assert!(Config::load().is_err());

    unsafe {
        std::env::remove_var("MIMIC_CONFIG");
        std::env::remove_var("LISTEN");
        std::env::remove_var("ROUTES_FILE");
    }
    assert_eq!(Config::load().unwrap(), Config::default());
}
