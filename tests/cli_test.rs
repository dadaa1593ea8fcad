use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

const HEADER: &str =
    "reference,state,provider_reference,response_code,response_message,device_fingerprint,state_message";

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("cybs-checkout"));
    cmd.arg("tests/fixtures/checkout_request.json")
        .arg("--partners")
        .arg("tests/fixtures/partners.csv")
        .arg("--simulate")
        .arg("AUTHORIZED");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(HEADER))
        .stdout(predicate::str::contains(
            "S00001,done,cybersource-S00001,AUTHORIZED,AUTHORIZED,2510190001,",
        ))
        // Card data never reaches the logs
        .stderr(predicate::str::contains("4111111111111111").not());

    Ok(())
}

#[test]
fn test_cli_sales_seed_resolves_order_partner() {
    let mut cmd = Command::new(cargo_bin!("cybs-checkout"));
    cmd.arg("tests/fixtures/checkout_request.json")
        .arg("--partners")
        .arg("tests/fixtures/partners.csv")
        .arg("--sales")
        .arg("tests/fixtures/sales.csv")
        .arg("--simulate")
        .arg("AUTHORIZED");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("S00001,done,"))
        .stderr(predicate::str::contains("billing source unavailable").not());
}

#[test]
fn test_cli_without_sales_seed_skips_order() {
    let mut cmd = Command::new(cargo_bin!("cybs-checkout"));
    cmd.arg("tests/fixtures/checkout_request.json")
        .arg("--partners")
        .arg("tests/fixtures/partners.csv")
        .arg("--simulate")
        .arg("AUTHORIZED");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("billing source unavailable"));
}

#[test]
fn test_cli_declined() {
    let mut cmd = Command::new(cargo_bin!("cybs-checkout"));
    cmd.arg("tests/fixtures/checkout_request.json")
        .arg("--simulate")
        .arg("DECLINED");

    cmd.assert().success().stdout(predicate::str::contains(
        "S00001,canceled,cybersource-S00001,DECLINED,DECLINED,2510190001,Payment was declined: DECLINED",
    ));
}

#[test]
fn test_cli_step_up_simulation() {
    let mut cmd = Command::new(cargo_bin!("cybs-checkout"));
    cmd.arg("tests/fixtures/checkout_request.json")
        .arg("--simulate")
        .arg("CONSUMER_AUTHENTICATION_REQUIRED");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("S00001,done,"));
}

#[test]
fn test_cli_config_file_manual_capture() {
    let mut cmd = Command::new(cargo_bin!("cybs-checkout"));
    cmd.arg("tests/fixtures/checkout_request.json")
        .arg("--config")
        .arg("tests/fixtures/gateway.toml")
        .arg("--simulate")
        .arg("AUTHORIZED");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("S00001,authorized,"));
}

#[test]
fn test_cli_generates_missing_fingerprint() {
    let mut request = tempfile::NamedTempFile::new().unwrap();
    write!(
        request,
        r#"{{
            "reference": "S00007",
            "values": {{"amount": 20, "currency": "EUR"}},
            "customer_input": {{"card_num": "4000000000000002", "exp_month": "1", "exp_year": "2030", "cvv": "123"}},
            "sale_order_id": 7
        }}"#
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("cybs-checkout"));
    cmd.arg(request.path()).arg("--simulate").arg("AUTHORIZED");

    cmd.assert()
        .success()
        .stdout(predicate::str::is_match(r"S00007,done,cybersource-S00007,AUTHORIZED,AUTHORIZED,\d{6}7000,").unwrap());
}

#[test]
fn test_cli_processing_error_keeps_draft() {
    // Without --simulate the HTTP processor is used; point it nowhere reachable.
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "[provider]\nrun_environment = \"127.0.0.1:1\"\ntimeout_ms = 200").unwrap();
    let mut cmd = Command::new(cargo_bin!("cybs-checkout"));
    cmd.arg("tests/fixtures/checkout_request.json")
        .arg("--config")
        .arg(config.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("S00001,draft,,,,,"))
        .stderr(predicate::str::contains("Error processing checkout"));
}

#[test]
fn test_cli_missing_request_file() {
    let mut cmd = Command::new(cargo_bin!("cybs-checkout"));
    cmd.arg("tests/fixtures/does_not_exist.json")
        .arg("--simulate")
        .arg("AUTHORIZED");

    cmd.assert().failure();
}
