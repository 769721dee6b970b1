//! The `templator` binary.

use assert_cmd::Command;
use predicates::prelude::*;

use super::common::write_tree;

fn templator() -> Command {
    Command::cargo_bin("templator").expect("binary is built")
}

#[test]
fn test_check_success() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    write_tree(temp.path(), &[
        ("templates/home.html", "<h1>{{ Title }}</h1>"),
        ("templates/about/team.html", "{% for m in Members %}{{ m }}{% endfor %}"),
    ])?;

    templator()
        .arg("check")
        .arg("--dir")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("about/team"))
        .stdout(predicate::str::contains("2 template(s) compiled"));
    Ok(())
}

#[test]
fn test_check_reports_failures() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    write_tree(temp.path(), &[
        ("templates/home.html", "<h1>{{ Title }}</h1>"),
        ("templates/broken.html", "{% if %}"),
    ])?;

    templator()
        .args(["--quiet", "check", "--dir"])
        .arg(temp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("broken"))
        .stderr(predicate::str::contains("1 of 2 template(s) failed"));
    Ok(())
}

#[test]
fn test_check_against_sample_data_as_json() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    write_tree(temp.path(), &[
        ("templates/home.html", "{{ Title }}"),
        ("templates/bad.html", "{{ Subtitle }}"),
        ("sample.json", r#"{"Title": "Welcome"}"#),
    ])?;

    let output = templator()
        .args(["check", "--format", "json", "--dir"])
        .arg(temp.path())
        .arg("--data")
        .arg(temp.path().join("sample.json"))
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output)?;
    assert_eq!(report["valid"], false);
    assert_eq!(report["checked"], 2);
    assert_eq!(report["errors"][0]["template"], "bad");
    Ok(())
}

#[test]
fn test_check_uses_config_file() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    write_tree(temp.path(), &[
        ("templator.toml", "base_path = \"views\"\nextension = \"txt\"\n"),
        ("views/mail.txt", "Dear {{ Name }}"),
    ])?;

    templator()
        .arg("check")
        .arg("--dir")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("mail"));
    Ok(())
}

#[test]
fn test_render_to_stdout() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    write_tree(temp.path(), &[
        ("templates/home.html", "<h1>{{ Title }}</h1><p>{{ Content }}</p>"),
        ("home.json", r#"{"Title": "Welcome", "Content": "Hello, World!"}"#),
    ])?;

    templator()
        .args(["render", "home", "--dir"])
        .arg(temp.path())
        .arg("--data")
        .arg(temp.path().join("home.json"))
        .assert()
        .success()
        .stdout(predicate::eq("<h1>Welcome</h1><p>Hello, World!</p>"));
    Ok(())
}

#[test]
fn test_render_missing_template() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    std::fs::create_dir_all(temp.path().join("templates"))?;

    templator()
        .args(["render", "nonexistent", "--dir"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("template 'nonexistent' not found"))
        .stderr(predicate::str::contains("suggestion"));
    Ok(())
}

#[test]
fn test_render_zero_timeout() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    write_tree(temp.path(), &[("templates/home.html", "static")])?;

    templator()
        .args(["render", "home", "--timeout-ms", "0", "--dir"])
        .arg(temp.path())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("context deadline exceeded"));
    Ok(())
}
