//! Fake systemctl for integration tests
//!
//! The fake is a shell script in a unique /tmp directory. It records every
//! invocation in `calls` and takes its behavior from files next to it:
//! `list` is printed for list commands, `is-active` and `control` are shell
//! snippets sourced for the matching verbs (with $1 = verb, $2 = unit).

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use svcpanel::users::{User, UserDirectory};
use svcpanel::Systemctl;

static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

const SCRIPT: &str = r#"dir="$(dirname "$0")"
echo "$*" >> "$dir/calls"
case "$1" in
  is-active) hook="$dir/is-active" ;;
  start|stop|restart) hook="$dir/control" ;;
  *) [ -f "$dir/list" ] && cat "$dir/list"; exit 0 ;;
esac
[ -f "$hook" ] && . "$hook"
exit 0
"#;

pub const USERNAME: &str = "benjamin";
pub const PASSWORD: &str = "correct horse";

fn unique_test_dir() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = PathBuf::from(format!("/tmp/svcpanel-test-{}-{}", std::process::id(), id));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn users() -> UserDirectory {
    [User::with_password(USERNAME, PASSWORD)].into_iter().collect()
}

pub struct FakeSystemctl {
    dir: PathBuf,
}

impl FakeSystemctl {
    pub fn new() -> Self {
        let dir = unique_test_dir();
        fs::write(dir.join("systemctl"), SCRIPT).unwrap();
        Self { dir }
    }

    /// Run through /bin/sh so the script never needs exec permission
    pub fn systemctl(&self) -> Systemctl {
        let cmd = format!("/bin/sh '{}'", self.dir.join("systemctl").display());
        Systemctl::from_command_line(&cmd).unwrap()
    }

    pub fn set_list(&self, output: &str) {
        fs::write(self.dir.join("list"), output).unwrap();
    }

    pub fn on_is_active(&self, snippet: &str) {
        fs::write(self.dir.join("is-active"), snippet).unwrap();
    }

    pub fn on_control(&self, snippet: &str) {
        fs::write(self.dir.join("control"), snippet).unwrap();
    }

    /// Recorded invocations, one argument string per call
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.join("calls"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn calls_with(&self, verb: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.split_whitespace().next() == Some(verb))
            .collect()
    }
}

impl Drop for FakeSystemctl {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}
