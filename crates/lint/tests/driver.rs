use solcst_lint::{CheckKind, check_dir, new_listener};
use solcst_parse::parse_source_with;
use std::{fs, num::NonZeroUsize, path::Path};

const SERVICE: &str = r#"
pragma solidity ^0.8.20;

contract BundleService is Service {
    function create(uint256 id) external restricted() returns (uint256) {
        return id;
    }

    function lock(uint256 id) external virtual {
        emit Locked(id);
    }

    function get(uint256 id) external view returns (uint256) {
        return id;
    }
}
"#;

const BROKEN: &str = r#"
contract Pool is Component {
    function stake(uint256 amount) public {
        total = total + ;
    }
}
"#;

const PLAIN: &str = "library L { function f() internal pure returns (uint) { return 1; } }";

fn write_tree(root: &Path) {
    fs::create_dir_all(root.join("services/nested")).unwrap();
    fs::create_dir_all(root.join("pools")).unwrap();
    fs::write(root.join("services/nested/BundleService.sol"), SERVICE).unwrap();
    fs::write(root.join("pools/Pool.sol"), BROKEN).unwrap();
    fs::write(root.join("Lib.sol"), PLAIN).unwrap();
    fs::write(root.join("notes.txt"), "function f() external {}").unwrap();
}

#[test]
fn batch() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path());

    let threads = NonZeroUsize::new(4).unwrap();
    let reports = check_dir(dir.path(), CheckKind::MissingRestricted, threads).unwrap();
    let names: Vec<_> =
        reports.iter().map(|r| r.path.strip_prefix(dir.path()).unwrap().to_owned()).collect();
    assert_eq!(
        names,
        [
            Path::new("Lib.sol"),
            Path::new("pools/Pool.sol"),
            Path::new("services/nested/BundleService.sol")
        ]
    );

    assert!(!reports[0].has_findings());
    assert!(reports[0].errors.is_empty());

    assert_eq!(reports[1].errors.len(), 1);
    assert_eq!(reports[1].errors[0].line, 4);
    assert_eq!(reports[1].findings, "Function 'functionstake' |public| without restricted modifier\n");

    assert!(reports[2].errors.is_empty(), "{:?}", reports[2].errors);
    assert_eq!(reports[2].findings, "Function 'functionlock' |externalvirtual| without restricted modifier\n");
}

#[test]
fn thread_count_does_not_change_results() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path());
    let render = |threads: usize| {
        check_dir(dir.path(), CheckKind::MissingVirtual, NonZeroUsize::new(threads).unwrap())
            .unwrap()
            .into_iter()
            .map(|r| format!("{}\n{}", r.path.display(), r.findings))
            .collect::<String>()
    };
    let single = render(1);
    assert!(single.contains("Function 'functioncreate' |externalrestricted()| missing virtual"));
    assert_eq!(single, render(3));
}

#[test]
fn findings_are_idempotent() {
    let kinds = [CheckKind::MissingVirtual, CheckKind::MissingRestricted, CheckKind::Unrestricted];
    for kind in kinds {
        let mut first = new_listener(kind, "a.sol");
        parse_source_with(SERVICE, &mut *first);
        let first = first.take_findings();
        assert!(!first.is_empty(), "{kind}");

        // Unrelated parses in between must not leak into the next one.
        let mut other = new_listener(kind, "b.sol");
        parse_source_with(BROKEN, &mut *other);

        let mut second = new_listener(kind, "a.sol");
        parse_source_with(SERVICE, &mut *second);
        assert_eq!(first, second.take_findings(), "{kind}");
    }
}

#[test]
fn missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let err = check_dir(&dir.path().join("missing"), CheckKind::Unrestricted, NonZeroUsize::MIN)
        .unwrap_err();
    assert!(err.to_string().contains("missing"), "{err}");
}
