use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures/registries")
        .join(name)
}

/// A typenav command isolated from the user's home directory and log settings.
fn typenav(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("typenav").expect("cargo bin typenav");
    cmd.env("HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

fn net(home: &TempDir) -> Command {
    let mut cmd = typenav(home);
    cmd.arg("--separator")
        .arg(".")
        .arg("--registry")
        .arg(fixture("Sys.Net.json"));
    cmd
}

#[test]
fn ls_root_lists_first_segments() {
    let home = TempDir::new().unwrap();

    net(&home)
        .arg("ls")
        .assert()
        .success()
        .stdout("namespace Sys\n");
}

#[test]
fn ls_lists_containers_before_leaves() {
    let home = TempDir::new().unwrap();

    net(&home)
        .args(["ls", "Sys.Net"])
        .assert()
        .success()
        .stdout("namespace Sys.Net.Http\ntype      Sys.Net.Socket\n");
}

#[test]
fn ls_recursive_names() {
    let home = TempDir::new().unwrap();

    net(&home)
        .args(["ls", "Sys", "-r", "--names"])
        .assert()
        .success()
        .stdout("IO\nNet\nFile\nHttp\nSocket\nClient\nMethod\n");
}

#[test]
fn ls_uses_default_backslash_separator() {
    let home = TempDir::new().unwrap();

    typenav(&home)
        .arg("--registry")
        .arg(fixture("Sys.Net.json"))
        .args(["ls", "Sys\\Net"])
        .assert()
        .success()
        .stdout(predicate::str::contains("namespace Sys\\Net\\Http"));
}

#[test]
fn ls_missing_path_fails() {
    let home = TempDir::new().unwrap();

    net(&home)
        .args(["ls", "Sys.Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found: Sys.Nope"));
}

#[test]
fn ls_force_includes_hidden_types() {
    let home = TempDir::new().unwrap();
    let mut cmd = typenav(&home);
    cmd.arg("--separator")
        .arg(".")
        .arg("--registry")
        .arg(fixture("System.Runtime.json"));

    cmd.args(["ls", "System.Internal", "--force", "--names"])
        .assert()
        .success()
        .stdout("Handle\nMarshal\n");
}

#[test]
fn props_formats_members_with_aliases() {
    let home = TempDir::new().unwrap();

    net(&home)
        .args(["props", "Sys.Net.Socket"])
        .assert()
        .success()
        .stdout(predicate::str::contains("int Send(System.Byte[] data)"))
        .stdout(predicate::str::contains("new(string host,int port)"))
        .stdout(predicate::str::contains("void Close()"))
        .stdout(predicate::str::contains("event System.EventHandler Disconnected()"));
}

#[test]
fn props_pick_list_filters_members() {
    let home = TempDir::new().unwrap();

    net(&home)
        .args(["props", "Sys.Net.Socket", "--pick", "C*"])
        .assert()
        .success()
        .stdout("Close     : void Close()\nConnected : bool Connected\n");
}

#[test]
fn props_enum_values_and_interfaces() {
    let home = TempDir::new().unwrap();

    net(&home)
        .args(["props", "Sys.Net.Http.Method", "--enum-values", "--no-members"])
        .assert()
        .success()
        .stdout("Get  : Get = 0\nPost : Post = 1\n");

    net(&home)
        .args(["props", "Sys.Net.Socket", "--interfaces", "--no-members"])
        .assert()
        .success()
        .stdout("[Interfaces] : System.IDisposable\n");
}

#[test]
fn props_of_namespace_is_empty() {
    let home = TempDir::new().unwrap();

    net(&home)
        .args(["props", "Sys.Net"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn exists_sets_exit_status() {
    let home = TempDir::new().unwrap();

    net(&home)
        .args(["exists", "Sys.Net.Http"])
        .assert()
        .success()
        .stdout("true\n");

    net(&home)
        .args(["exists", "Sys.Net.Http.Client"])
        .assert()
        .success();

    net(&home)
        .args(["exists", "Sys.Nope"])
        .assert()
        .failure()
        .stdout("false\n");
}

#[test]
fn item_json_output() {
    let home = TempDir::new().unwrap();

    let output = net(&home)
        .args(["item", "Sys.Net", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let item: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(item["item_type"], "namespace");
    assert_eq!(item["full_name"], "Sys.Net");
    assert_eq!(item["sources"], serde_json::json!(["Sys.Net"]));
}

#[test]
fn broken_registry_is_reported_and_skipped() {
    let home = TempDir::new().unwrap();

    net(&home)
        .arg("--registry")
        .arg(fixture("Broken.json"))
        .args(["ls", "--names"])
        .assert()
        .success()
        .stdout("Sys\n")
        .stderr(predicate::str::contains("Failed to enumerate source Broken"));
}

#[test]
fn config_file_sets_separator_and_aliases() {
    let home = TempDir::new().unwrap();
    let config_path = home.path().join("typenav.toml");
    std::fs::write(
        &config_path,
        format!(
            "separator = \"/\"\nregistries = [{:?}]\n\n[aliases]\nsocket = \"Sys.Net.Socket\"\n",
            fixture("Sys.Net.json").display().to_string()
        ),
    )
    .unwrap();

    typenav(&home)
        .arg("--config")
        .arg(&config_path)
        .args(["ls", "Sys/Net"])
        .assert()
        .success()
        .stdout(predicate::str::contains("type      Sys/Net/Socket"));
}

#[test]
fn default_config_is_read_from_home() {
    let home = TempDir::new().unwrap();
    let typenav_dir = home.path().join(".typenav");
    std::fs::create_dir_all(&typenav_dir).unwrap();
    std::fs::write(
        typenav_dir.join("config.toml"),
        format!(
            "separator = \".\"\nregistries = [{:?}]\n",
            fixture("Sys.Net.json").display().to_string()
        ),
    )
    .unwrap();

    typenav(&home)
        .args(["ls", "Sys", "--names"])
        .assert()
        .success()
        .stdout("IO\nNet\n");
}

#[test]
fn shell_navigates_and_loads_registries() {
    let home = TempDir::new().unwrap();
    let script = format!(
        "cd Sys\nls --names\ncd Net\npwd\nexists Socket\nload {}\nexists /System.Int32\nsources\nexit\n",
        fixture("System.Runtime.json").display()
    );

    net(&home)
        .arg("shell")
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("IO\nNet\nSys.Net\ntrue\n"))
        .stdout(predicate::str::contains("Loaded System.Runtime:"))
        .stdout(predicate::str::ends_with("true\nSys.Net\nSystem.Runtime\n"));
}
