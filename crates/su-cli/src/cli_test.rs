use super::*;
use clap::CommandFactory;
use serial_test::serial;

#[test]
fn verify_cli_args() {
    Cli::command().debug_assert();
}

#[test]
fn test_long_help_explains_naming_and_version_table() {
    let help = Cli::command().render_long_help().to_string();

    assert!(help.contains("002somethingelse.sql"));
    assert!(help.contains(
        "CREATE TABLE version(id INTEGER PRIMARY KEY NOT NULL, file TEXT, checksum TEXT);"
    ));
    assert!(help.contains("--create-db"));
}

#[test]
fn test_defaults() {
    let cli = Cli::try_parse_from(["schema-upgrader"]).unwrap();
    let config = cli.to_run_config().unwrap();

    assert_eq!(config, RunConfig::default());
    assert_eq!(cli.output, OutputFormat::Text);
    assert!(!cli.verbose);
}

#[test]
fn test_flags_map_to_config() {
    let cli = Cli::try_parse_from([
        "schema-upgrader",
        "--sqlhost",
        "db.internal",
        "--sqlport",
        "3307",
        "--sqlusername",
        "deploy",
        "--sqlpassword",
        "s3cret",
        "--sqldb",
        "shop",
        "--sqlversion-table",
        "schema_version",
        "--scripts-path",
        "/srv/sql",
        "--create-db",
        "--backend",
        "duckdb",
        "--duckdb-path",
        "/tmp/main.duckdb",
    ])
    .unwrap();

    let config = cli.to_run_config().unwrap();
    assert_eq!(config.sql_host, "db.internal");
    assert_eq!(config.sql_port, 3307);
    assert_eq!(config.sql_username, "deploy");
    assert_eq!(config.sql_password, "s3cret");
    assert_eq!(config.database, "shop");
    assert_eq!(config.version_table, "schema_version");
    assert_eq!(config.scripts_path, PathBuf::from("/srv/sql"));
    assert!(config.create_database);
    assert_eq!(config.backend, Backend::DuckDb);
    assert_eq!(config.duckdb_path, "/tmp/main.duckdb");
}

#[test]
fn test_short_v_is_version() {
    let err = Cli::try_parse_from(["schema-upgrader", "-v"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
}

#[test]
fn test_invalid_port_rejected() {
    assert!(Cli::try_parse_from(["schema-upgrader", "--sqlport", "70000"]).is_err());
}

#[test]
fn test_invalid_identifier_rejected() {
    let cli = Cli::try_parse_from(["schema-upgrader", "--sqldb", "bad-name"]).unwrap();
    assert!(cli.to_run_config().is_err());
}

#[test]
#[serial]
fn test_environment_ignored_without_toggle() {
    std::env::set_var("SQL_DB", "from_env");
    let cli = Cli::try_parse_from(["schema-upgrader", "--sqldb", "from_flag"]).unwrap();
    let config = cli.to_run_config();
    std::env::remove_var("SQL_DB");

    assert_eq!(config.unwrap().database, "from_flag");
}

#[test]
#[serial]
fn test_environment_overrides_flags_with_toggle() {
    std::env::set_var("SQL_DB", "from_env");
    std::env::set_var("CREATE_DB", "T");
    let cli = Cli::try_parse_from([
        "schema-upgrader",
        "--sqldb",
        "from_flag",
        "--use-environment-variables",
    ])
    .unwrap();
    let config = cli.to_run_config();
    std::env::remove_var("SQL_DB");
    std::env::remove_var("CREATE_DB");

    let config = config.unwrap();
    assert_eq!(config.database, "from_env");
    assert!(config.create_database);
}
