use assert_cmd::Command;

fn catalog(config_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("catalog").unwrap();
    cmd.env("CATALOG_CONFIG_DIR", config_dir)
        .env("CATALOG_ENV", "local")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    let output = catalog(dir.path()).arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for subcommand in ["serve", "openapi", "config"] {
        assert!(stdout.contains(subcommand), "missing {subcommand} in {stdout}");
    }
}

#[test]
fn openapi_documents_book_routes() {
    let dir = tempfile::tempdir().unwrap();
    let output = catalog(dir.path()).arg("openapi").output().unwrap();

    assert!(output.status.success());
    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(document["paths"]["/api/books"]["post"].is_object());
    assert!(document["paths"]["/api/books/{id}"]["put"].is_object());
    assert!(document["components"]["schemas"]["Book"].is_object());
}

#[test]
fn config_reflects_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("base.toml"), "[server]\nport = 6123\n").unwrap();

    let output = catalog(dir.path()).arg("config").output().unwrap();

    assert!(output.status.success());
    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["server"]["port"], 6123);
    assert_eq!(settings["database"]["backend"], "memory");
}

#[test]
fn unknown_environment_fails() {
    let dir = tempfile::tempdir().unwrap();
    catalog(dir.path())
        .env("CATALOG_ENV", "qa")
        .arg("config")
        .assert()
        .failure();
}
