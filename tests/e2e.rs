use std::process::Command;

fn run_with(fixture: &str, envs: &[(&str, &str)]) -> (String, String, bool) {
    let path = format!("tests/fixtures/{fixture}");
    let mut command = Command::new(env!("CARGO_BIN_EXE_vending"));
    command
        .arg(&path)
        .env("RUST_LOG", "warn")
        .env_remove("VENDING_ADMIN_PASSWORD");
    for (key, value) in envs {
        command.env(key, value);
    }
    let output = command.output().expect("failed to run binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn run(fixture: &str) -> (String, String, bool) {
    run_with(fixture, &[])
}

#[test]
fn purchases_with_change() {
    let (stdout, stderr, success) = run("purchases.csv");

    assert!(success);
    assert!(stderr.is_empty());

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "index,name,price,stock",
            "1,Cone with boiled condensed milk,85.00,4",
            "2,Ham and cheese sandwich,145.00,2",
            "3,Orange juice,90.00,10",
            "4,Milka chocolate,75.00,8",
            "denomination,count",
            "100.00,5",
            "50.00,6",
            "10.00,9",
            "5.00,8",
            "1.00,20",
            "balance,profit,inserted",
            "950.00,230.00,0.00",
        ]
    );
}

#[test]
fn collect_restores_float() {
    let (stdout, stderr, success) = run("collect.csv");

    assert!(success);
    assert!(stderr.is_empty());

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[2], "2,Ham and cheese sandwich,145.00,7");
    assert_eq!(
        &lines[5..],
        &[
            "denomination,count",
            "100.00,3",
            "50.00,5",
            "10.00,10",
            "5.00,10",
            "1.00,20",
            "balance,profit,inserted",
            "720.00,0.00,0.00",
        ]
    );
}

#[test]
fn admin_password_comes_from_env() {
    let (stdout, _, success) = run_with("collect.csv", &[("VENDING_ADMIN_PASSWORD", "s3cret")]);

    assert!(success);
    // authentication failed, so nothing was collected or restocked
    assert!(stdout.contains("2,Ham and cheese sandwich,145.00,2"));
    assert!(stdout.contains("950.00,230.00,0.00"));
}

#[test]
fn errors_warn_but_do_not_block() {
    let (stdout, stderr, success) = run("with_errors.csv");

    assert!(success);
    assert!(stderr.contains("unrecognized command"));
    assert!(stderr.contains("insert missing coin"));

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[1], "1,Cone with boiled condensed milk,85.00,4");
    assert_eq!(lines.last(), Some(&"805.00,85.00,0.00"));
}

#[test]
fn rust_log_enables_command_events() {
    let (_, stderr, success) = run_with("purchases.csv", &[("RUST_LOG", "info")]);

    assert!(success);
    assert!(stderr.contains("select product applied"));
    assert!(stderr.contains("change dispensed"));
}

#[test]
fn restock_overflow_is_skipped() {
    let (stdout, _, success) = run("restock_overflow.csv");

    assert!(success);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[1], "1,Cone with boiled condensed milk,85.00,6");
}

#[test]
fn missing_script_fails() {
    let (_, stderr, success) = run("does_not_exist.csv");

    assert!(!success);
    assert!(stderr.contains("failed to open script"));
}
