use std::collections::HashMap;

use camino::Utf8Path;
use clap::error::ErrorKind;
use pwgr_config::{Config, ConfigError, LogFormat, Transport};
use rstest::rstest;

fn no_env(_: &str) -> Option<String> {
    None
}

fn load(
    transport: Transport,
    args: &[&str],
    env: &HashMap<&str, &str>,
) -> Result<Config, ConfigError> {
    Config::load_with_env(transport, args.iter().copied(), |key| {
        env.get(key).map(|value| (*value).to_owned())
    })
}

#[rstest]
#[case(Transport::SeqPacket, "pwgrd")]
#[case(Transport::Datagram, "pwgrd-uid")]
fn single_positional_becomes_endpoint(#[case] transport: Transport, #[case] program: &str) {
    let config = Config::load_with_env(transport, [program, "/run/pwgr.sock"], no_env)
        .expect("config loads");

    assert_eq!(config.transport(), transport);
    assert_eq!(config.endpoint().path(), Utf8Path::new("/run/pwgr.sock"));
    assert_eq!(config.log_filter(), "info");
    assert_eq!(config.log_format(), LogFormat::Compact);
}

#[rstest]
#[case::missing(&["pwgrd"])]
#[case::surplus(&["pwgrd", "/run/a.sock", "/run/b.sock"])]
#[case::unknown_flag(&["pwgrd", "--verbose", "/run/a.sock"])]
fn wrong_argument_count_is_a_usage_error(#[case] args: &[&str]) {
    let error = load(Transport::SeqPacket, args, &HashMap::new()).expect_err("usage error");

    assert!(matches!(error, ConfigError::Usage(_)));
    assert!(!error.is_informational());
}

#[rstest]
#[case("--help", ErrorKind::DisplayHelp)]
#[case("--version", ErrorKind::DisplayVersion)]
fn help_and_version_are_informational(#[case] flag: &str, #[case] kind: ErrorKind) {
    let error = load(Transport::Datagram, &["pwgrd-uid", flag], &HashMap::new())
        .expect_err("informational exit");

    let ConfigError::Usage(inner) = &error else {
        panic!("expected usage error, got {error:?}");
    };
    assert_eq!(inner.kind(), kind);
    assert!(error.is_informational());
}

#[test]
fn help_names_the_binary() {
    let error = load(Transport::Datagram, &["whatever", "--help"], &HashMap::new())
        .expect_err("help output");

    assert!(error.to_string().contains("pwgrd-uid"));
}

#[test]
fn environment_overrides_logging() {
    let env = HashMap::from([("PWGR_LOG", "pwgrd=debug"), ("PWGR_LOG_FORMAT", "JSON")]);
    let config = load(Transport::SeqPacket, &["pwgrd", "/tmp/p.sock"], &env).expect("config");

    assert_eq!(config.log_filter(), "pwgrd=debug");
    assert_eq!(config.log_format(), LogFormat::Json);
}

#[test]
fn blank_filter_falls_back_to_default() {
    let env = HashMap::from([("PWGR_LOG", "  ")]);
    let config = load(Transport::SeqPacket, &["pwgrd", "/tmp/p.sock"], &env).expect("config");

    assert_eq!(config.log_filter(), "info");
}

#[test]
fn unknown_log_format_is_rejected() {
    let env = HashMap::from([("PWGR_LOG_FORMAT", "yaml")]);
    let error = load(Transport::SeqPacket, &["pwgrd", "/tmp/p.sock"], &env)
        .expect_err("bad format");

    assert!(matches!(&error, ConfigError::LogFormat { value, .. } if value == "yaml"));
    assert!(error.to_string().contains("PWGR_LOG_FORMAT"));
}
