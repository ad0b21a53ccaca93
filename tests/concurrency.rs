mod support;

use std::thread;

use support::TestEnv;

#[test]
fn parallel_writers_leave_a_valid_slot() {
    let env = TestEnv::new();
    env.add("seed");

    thread::scope(|scope| {
        for idx in 0..4 {
            let env = &env;
            scope.spawn(move || {
                env.cmd()
                    .args(["add", &format!("writer {idx}")])
                    .assert()
                    .success();
            });
        }
    });

    let slot = env.read_slot();
    let tasks = slot.as_array().expect("array");
    assert!(!tasks.is_empty() && tasks.len() <= 5);
    assert!(tasks.iter().all(|task| task["title"].is_string()));
}
