use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

fn solcst(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_solcst"))
        .args(["--color", "never"])
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn parse_prints_tree() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("C.sol");
    fs::write(&file, "contract C { function f() public { } }").unwrap();

    let output = solcst(&["parse", path_str(&file), "--tree"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "(sourceUnit (contractDefinition contract (identifier C) { (contractPart \
         (functionDefinition (functionDescriptor function (identifier f)) (parameterList ( )) \
         (modifierList public) (block { }))) }) <EOF>)\n"
    );
    assert_eq!(stderr(&output), "");
}

#[test]
fn parse_prints_json_and_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("A.sol");
    fs::write(&file, "// hi\nenum E { A }").unwrap();

    let output = solcst(&["parse", path_str(&file), "--tree", "--tree-format", "json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["rule"], "sourceUnit");
    assert_eq!(json["children"][0]["rule"], "enumDefinition");

    let output = solcst(&["parse", path_str(&file), "--tokens"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let stdout = stdout(&output);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines[0], "[@0,0:5='// hi',<LineComment>,channel=hidden,1:0]");
    assert_eq!(lines[1], "[@1,6:10='enum',<Enum>,2:0]");
    assert!(lines.last().unwrap().contains("<Eof>"), "{stdout}");
}

#[test]
fn parse_reports_syntax_errors() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Bad.sol");
    fs::write(&file, "contract C {\n    uint x = 1\n}\n").unwrap();

    let output = solcst(&["parse", path_str(&file)]);
    assert!(!output.status.success());
    let stderr = stderr(&output);
    assert!(stderr.contains("error: missing `;` at `}`"), "{stderr}");
    assert!(stderr.contains("Bad.sol:3:1"), "{stderr}");
    assert!(stderr.contains("aborting due to 1 previous error"), "{stderr}");
    assert_eq!(stdout(&output), "");
}

#[test]
fn parse_reports_json_errors() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Bad.sol");
    fs::write(&file, "contract C { # }").unwrap();

    let output = solcst(&["--error-format", "json", "parse", path_str(&file)]);
    assert!(!output.status.success());
    let stderr = stderr(&output);
    let first: serde_json::Value = serde_json::from_str(stderr.lines().next().unwrap()).unwrap();
    assert_eq!(first["message"], "token recognition error at: '#'");
}

#[test]
fn missing_file() {
    let output = solcst(&["parse", "does/not/exist.sol"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("couldn't read does/not/exist.sol"));
}

#[test]
fn check_prints_findings() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("services")).unwrap();
    let service = dir.path().join("services/PoolService.sol");
    fs::write(
        &service,
        "contract PoolService is Service {\n\
         function stake() external restricted() {}\n\
         function unstake() external {}\n\
         }\n",
    )
    .unwrap();
    fs::write(dir.path().join("Clean.sol"), "contract Clean {}").unwrap();

    let output =
        solcst(&["check", path_str(dir.path()), "--check", "missing-restricted", "-j", "2"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        format!(
            "=============== Contract {}\n\
             Function 'functionunstake' |external| without restricted modifier\n\n",
            service.display()
        )
    );
}

#[test]
fn check_requires_a_kind() {
    let dir = tempfile::tempdir().unwrap();
    let output = solcst(&["check", path_str(dir.path())]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--check"));
}
