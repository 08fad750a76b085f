use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

const IS_A_GRAMMAR: &str = r#"
fact = { (var | ident) ~ " is " ~ (var | ident) }
var = @{ __var__ }
ident = @{ ASCII_ALPHA+ }
"#;

const BOLD_ITALIC_GRAMMAR: &str = r#"
fact = { bold | italic }
bold = { "((" ~ (var | v_content) ~ "))" }
italic = { "''" ~ (var | v_content) ~ "''" }
var = @{ __var__ }
v_content = @{ (!("))" | "''") ~ ANY)+ }
"#;

fn write_temp(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn run_derives_and_prints_query_result() {
    let grammar = write_temp(IS_A_GRAMMAR, ".pest");
    let script = write_temp(
        "tell X1 is X2 ; X2 is mortal -> X1 is mortal\n\
         tell human is mortal\n\
         tell socrates is human\n\
         query socrates is mortal\n",
        ".txt",
    );

    Command::cargo_bin("factum")
        .unwrap()
        .arg("run")
        .arg(grammar.path())
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("true"));
}

#[test]
fn run_derives_variable_consequence_through_a_var_range_fact() {
    let grammar = write_temp(BOLD_ITALIC_GRAMMAR, ".pest");
    let script = write_temp(
        "tell ((X1)) -> ''X1''\n\
         tell ((ho ho))\n\
         query ''ho ho''\n\
         query ((hi hi))\n",
        ".txt",
    );

    Command::cargo_bin("factum")
        .unwrap()
        .arg("run")
        .arg(grammar.path())
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("true"))
        .stdout(predicate::str::contains("false"));
}

#[test]
fn bench_reports_activation_count() {
    let grammar = write_temp(IS_A_GRAMMAR, ".pest");
    let script = write_temp("tell socrates is human\n", ".txt");

    Command::cargo_bin("factum")
        .unwrap()
        .arg("bench")
        .arg(grammar.path())
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("activations:"));
}
