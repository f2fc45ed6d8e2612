use assert_cmd::assert::OutputAssertExt;
use similar_asserts::assert_eq;
use std::{
    env::remove_var,
    io::Write,
    process::Stdio,
};
use verdi_shim::{EXIT_CANNOT_EXECUTE, EXIT_NOT_FOUND, TARGET};

use util::{Report, SearchDir};

#[ctor::ctor]
fn initialize() {
    unsafe {
        remove_var("RUST_LOG");
    }
}

#[test]
fn arguments_are_not_split() {
    let search_dir = SearchDir::with_runner();
    let args = ["run", "script.py", "--flag", "value with spaces"];
    let assert = search_dir.command().args(args).assert().success();
    let report = Report::from_stdout(&assert.get_output().stdout);
    assert_eq!(args.to_vec(), report.args_utf8());
}

#[test]
fn zero_arguments() {
    let search_dir = SearchDir::with_runner();
    let assert = search_dir.command().assert().success();
    let report = Report::from_stdout(&assert.get_output().stdout);
    assert!(report.args.is_empty(), "{report:?}");
}

#[test]
fn special_characters_are_preserved() {
    let args = [
        "",
        " ",
        "single'quote",
        "double\"quote",
        "back\\slash",
        "$HOME",
        "*.py",
        "`uname`",
        "semi;colon && pipe |",
        "tab\tand\nnewline",
        "--",
        "--help",
        "ünïcödé",
    ];
    let search_dir = SearchDir::with_runner();
    let assert = search_dir.command().args(args).assert().success();
    let report = Report::from_stdout(&assert.get_output().stdout);
    assert_eq!(args.to_vec(), report.args_utf8());
}

#[cfg(unix)]
#[test]
fn non_utf8_arguments_are_preserved() {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

    let bytes: [&[u8]; 3] = [b"\xff\xfe", b"latin-1 caf\xe9", b"ok"];
    let search_dir = SearchDir::with_runner();
    let assert = search_dir
        .command()
        .args(bytes.map(OsStr::from_bytes))
        .assert()
        .success();
    let report = Report::from_stdout(&assert.get_output().stdout);
    assert_eq!(
        bytes.iter().map(|arg| arg.to_vec()).collect::<Vec<_>>(),
        report.args
    );
}

#[cfg(unix)]
#[test]
fn target_sees_its_own_name() {
    let search_dir = SearchDir::with_runner();
    let assert = search_dir.command().assert().success();
    let report = Report::from_stdout(&assert.get_output().stdout);
    assert_eq!(TARGET, report.argv0);
}

#[test]
fn exit_status_is_mirrored() {
    let search_dir = SearchDir::with_runner();
    for code in 0..=255 {
        let output = search_dir
            .command()
            .env("RUNNER_EXIT_CODE", code.to_string())
            .output()
            .unwrap();
        assert_eq!(Some(code), output.status.code());
        assert!(output.stderr.is_empty(), "{output:?}");
    }
}

#[test]
fn environment_is_inherited() {
    let search_dir = SearchDir::with_runner();
    let assert = search_dir
        .command()
        .env("VERDI_SHIM_TEST_MARKER", "value with spaces")
        .assert()
        .success();
    let report = Report::from_stdout(&assert.get_output().stdout);
    assert_eq!(
        Some("value with spaces"),
        report.env.get("VERDI_SHIM_TEST_MARKER").map(String::as_str)
    );
    assert_eq!(
        Some(search_dir.path().to_str().unwrap()),
        report.env.get("PATH").map(String::as_str)
    );
}

#[test]
fn stdin_is_inherited() {
    let search_dir = SearchDir::with_runner();
    let mut child = search_dir
        .command()
        .env("RUNNER_READ_STDIN", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    // Dropping the handle closes the pipe so that `runner` sees end of file.
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"print('hello')\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success(), "{output:?}");
    let report = Report::from_stdout(&output.stdout);
    assert_eq!(Some("print('hello')\n"), report.stdin.as_deref());
}

#[test]
fn not_found() {
    let search_dir = SearchDir::empty();
    let assert = search_dir
        .command()
        .args(["run", "script.py"])
        .assert()
        .code(EXIT_NOT_FOUND);
    let output = assert.get_output();
    assert!(output.stdout.is_empty());
    let stderr = std::str::from_utf8(&output.stderr).unwrap();
    assert_eq!(1, stderr.lines().count(), "{stderr:?}");
    assert!(stderr.contains(&format!("`{TARGET}`")), "{stderr:?}");
}

#[cfg(unix)]
#[test]
fn permission_denied() {
    use std::{
        fs::{Permissions, set_permissions, write},
        os::unix::fs::PermissionsExt,
    };

    let search_dir = SearchDir::empty();
    let path = search_dir.target_path();
    write(&path, "#!/bin/sh\n").unwrap();
    set_permissions(&path, Permissions::from_mode(0o644)).unwrap();
    let assert = search_dir.command().assert().code(EXIT_CANNOT_EXECUTE);
    let stderr = std::str::from_utf8(&assert.get_output().stderr).unwrap();
    assert_eq!(1, stderr.lines().count(), "{stderr:?}");
    assert!(stderr.contains("permission denied"), "{stderr:?}");
}

#[cfg(unix)]
#[test]
fn control_characters_in_path_stay_on_one_line() {
    use std::{
        fs::{Permissions, create_dir, set_permissions, write},
        os::unix::fs::PermissionsExt,
    };

    let search_dir = SearchDir::empty();
    let dir = search_dir.path().join("line\nbreak");
    create_dir(&dir).unwrap();
    let path = dir.join(TARGET);
    write(&path, "#!/bin/sh\n").unwrap();
    set_permissions(&path, Permissions::from_mode(0o644)).unwrap();
    let assert = search_dir
        .command()
        .env("PATH", &dir)
        .assert()
        .code(EXIT_CANNOT_EXECUTE);
    let stderr = std::str::from_utf8(&assert.get_output().stderr).unwrap();
    assert_eq!(1, stderr.lines().count(), "{stderr:?}");
    assert!(stderr.contains("line\\nbreak"), "{stderr:?}");
}

#[cfg(unix)]
#[test]
fn target_without_interpreter_line_runs_with_shell() {
    use std::{
        fs::{Permissions, set_permissions, write},
        os::unix::fs::PermissionsExt,
    };

    let search_dir = SearchDir::empty();
    let path = search_dir.target_path();
    write(&path, "[ \"$2\" = \"value with spaces\" ] && exit $(($# + 40))\n").unwrap();
    set_permissions(&path, Permissions::from_mode(0o755)).unwrap();
    let output = search_dir
        .command()
        .args(["run", "value with spaces"])
        .output()
        .unwrap();
    assert_eq!(Some(42), output.status.code(), "{output:?}");
    assert!(output.stderr.is_empty(), "{output:?}");
}

#[test]
fn installed_as_target_does_not_loop() {
    use assert_cmd::cargo::cargo_bin;
    use std::fs::copy;

    let search_dir = SearchDir::empty();
    copy(cargo_bin("verdi-shim"), search_dir.target_path()).unwrap();
    let assert = search_dir.command().assert().code(EXIT_CANNOT_EXECUTE);
    let stderr = std::str::from_utf8(&assert.get_output().stderr).unwrap();
    assert!(stderr.contains("refusing to forward to itself"), "{stderr:?}");
}
