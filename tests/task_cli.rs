mod support;

use predicates::prelude::*;
use predicates::str::contains;

use support::TestEnv;

#[test]
fn add_then_list_shows_newest_first() {
    let env = TestEnv::new();
    env.add("buy milk");
    env.add("walk dog");

    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("Tasks (all)"))
        .stdout(contains("2 items left | showing all | 2 of 2"))
        .stdout(contains("[ ]").count(2));

    let envelope = env.json(&["list"]);
    let rows = envelope["data"]["rows"].as_array().expect("rows");
    let titles: Vec<&str> = rows.iter().map(|row| row["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["walk dog", "buy milk"]);
}

#[test]
fn add_joins_words_and_trims() {
    let env = TestEnv::new();
    env.cmd()
        .args(["add", "  call", "the", "bank  "])
        .assert()
        .success()
        .stdout(contains("call the bank"));

    let slot = env.read_slot();
    assert_eq!(slot[0]["title"], "call the bank");
    assert_eq!(slot[0]["completed"], false);
    assert!(slot[0]["createdAt"].as_i64().unwrap() > 0);
}

#[test]
fn blank_add_writes_nothing() {
    let env = TestEnv::new();
    let envelope = env.json(&["add", "   "]);
    assert_eq!(envelope["status"], "success");
    assert_eq!(envelope["data"]["outcome"]["changed"], false);
    assert!(!env.slot_path().exists());
}

#[test]
fn toggle_done_undone_and_filters() {
    let env = TestEnv::new();
    let first = env.add("first");
    let second = env.add("second");

    env.cmd().args(["toggle", &first]).assert().success();
    let active = env.json(&["list", "--filter", "active"]);
    let rows = active["data"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], second.as_str());
    assert_eq!(active["data"]["remaining_label"], "1 item left");

    env.cmd().args(["done", &second]).assert().success();
    let completed = env.json(&["list", "-f", "completed"]);
    assert_eq!(completed["data"]["rows"].as_array().unwrap().len(), 2);
    assert_eq!(completed["data"]["remaining_label"], "0 items left");

    env.cmd().args(["undone", &first]).assert().success();
    env.cmd().args(["toggle", &second, "--undone"]).assert().success();
    let slot = env.read_slot();
    assert!(slot
        .as_array()
        .unwrap()
        .iter()
        .all(|task| task["completed"] == false));
}

#[test]
fn edit_renames_and_blank_edit_deletes() {
    let env = TestEnv::new();
    let id = env.add("draft");

    env.cmd()
        .args(["edit", &id, "final", "copy"])
        .assert()
        .success()
        .stdout(contains(format!("renamed {id}")))
        .stdout(contains("final copy"));

    env.cmd()
        .args(["edit", &id, " "])
        .assert()
        .success()
        .stdout(contains("blank title"));

    assert_eq!(env.read_slot(), serde_json::json!([]));
}

#[test]
fn rm_and_clear_completed() {
    let env = TestEnv::new();
    let keep = env.add("keep");
    let done_a = env.add("done a");
    let done_b = env.add("done b");
    let gone = env.add("gone");

    env.cmd().args(["rm", &gone]).assert().success();
    env.cmd().args(["done", &done_a]).assert().success();
    env.cmd().args(["done", &done_b]).assert().success();

    env.cmd()
        .arg("clear-completed")
        .assert()
        .success()
        .stdout(contains("cleared 2 completed"));

    let slot = env.read_slot();
    let ids: Vec<&str> = slot
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![keep.as_str()]);
}

#[test]
fn id_prefix_resolves_when_unique() {
    let env = TestEnv::new();
    let id = env.add("prefix me");
    let prefix = &id[..id.len() - 2];

    env.cmd().args(["done", prefix]).assert().success();
    assert_eq!(env.read_slot()[0]["completed"], true);
}

#[test]
fn ambiguous_prefix_is_user_error() {
    let env = TestEnv::new();
    env.write_slot(
        r#"[
  {"id": "abc00001", "title": "one", "completed": false, "createdAt": 1},
  {"id": "abc00002", "title": "two", "completed": false, "createdAt": 2}
]"#,
    );

    env.cmd()
        .args(["rm", "abc"])
        .assert()
        .code(2)
        .stderr(contains("ambiguous"))
        .stderr(contains("hint:"));

    let envelope = env.json(&["rm", "abc"]);
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["command"], "rm");
    assert_eq!(envelope["error"]["code"], 2);
    assert_eq!(envelope["error"]["details"]["matches"].as_array().unwrap().len(), 2);
    assert_eq!(env.read_slot().as_array().unwrap().len(), 2);
}

#[test]
fn unknown_id_is_a_noop() {
    let env = TestEnv::new();
    env.add("stays");
    let before = std::fs::read_to_string(env.slot_path()).unwrap();

    for args in [["rm", "zzzz"], ["done", "zzzz"]] {
        env.cmd()
            .args(args)
            .assert()
            .success()
            .stdout(contains("no task zzzz"));
    }
    env.cmd().args(["edit", "zzzz", "x"]).assert().success();

    assert_eq!(std::fs::read_to_string(env.slot_path()).unwrap(), before);
}

#[test]
fn quiet_suppresses_output() {
    let env = TestEnv::new();
    env.cmd()
        .args(["--quiet", "add", "silent"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert_eq!(env.read_slot()[0]["title"], "silent");
}

#[test]
fn verbose_list_shows_creation_time() {
    let env = TestEnv::new();
    env.write_slot(r#"[{"id": "abc00001", "title": "old", "completed": false, "createdAt": 0}]"#);
    env.cmd()
        .args(["list", "--verbose"])
        .assert()
        .success()
        .stdout(contains("(created 1970-01-01 00:00)"));
}

#[test]
fn dir_can_come_from_env() {
    let env = TestEnv::new();
    let mut cmd = assert_cmd::Command::cargo_bin("todos").unwrap();
    cmd.env("TODOS_DIR", env.data_dir())
        .env("TODOS_CONFIG", env.config_path())
        .args(["add", "from env"])
        .assert()
        .success();
    assert_eq!(env.read_slot()[0]["title"], "from env");
}
