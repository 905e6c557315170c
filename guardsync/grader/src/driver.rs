//! Test driver.
//!
//! Every test case is a plain `fn()` registered by reference in `main`. A case
//! runs on its own named thread and fails if that thread panics.

use std::collections::BTreeSet;
use std::io::Write;
use std::thread;

#[doc(hidden)]
pub trait TestCase
where
    Self: Sync + Send,
{
    fn name(&'static self) -> &'static str;
    fn run(&'static self) -> bool;
}

/// Strips the crate name from a path such as `guardsync_grader::sync::semaphore::sema_0`.
fn module_relative(path: &'static str) -> &'static str {
    path.split_once("::").map_or(path, |(_, rest)| rest)
}

impl<T> TestCase for T
where
    T: Fn() + Send + Sync + 'static,
{
    fn name(&'static self) -> &'static str {
        module_relative(core::any::type_name::<T>())
    }

    fn run(&'static self) -> bool {
        print!("test {} ... ", self.name());
        let _ = std::io::stdout().flush();
        let handle = match thread::Builder::new()
            .name(self.name().to_owned())
            .spawn(self)
        {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(test = self.name(), error = %e, "failed to spawn test thread");
                println!("FAILED");
                return false;
            }
        };
        if handle.join().is_ok() {
            println!("ok");
            true
        } else {
            println!("FAILED");
            false
        }
    }
}

/// A driver for running tests.
pub struct TestDriver {
    filter: BTreeSet<String>,
}

impl TestDriver {
    /// Creates a driver running the tests named in `filter`, or every test
    /// when `filter` is empty.
    pub fn new(filter: impl IntoIterator<Item = String>) -> Self {
        Self {
            filter: filter.into_iter().collect(),
        }
    }

    fn select(&self, tests: &[&'static dyn TestCase]) -> Vec<&'static dyn TestCase> {
        tests
            .iter()
            .copied()
            .filter(|test| self.filter.is_empty() || self.filter.contains(test.name()))
            .collect()
    }

    /// Prints the names of the selected tests.
    pub fn list(&self, tests: &[&'static dyn TestCase]) {
        for test in self.select(tests) {
            println!("{}", test.name());
        }
    }

    /// Runs the selected tests and returns `true` if all of them passed.
    pub fn start(&self, tests: &[&'static dyn TestCase]) -> bool {
        let tests = self.select(tests);
        if tests.is_empty() {
            tracing::warn!(filter = ?self.filter, "no test case matches the filter");
        }
        let (total, mut succ) = (tests.len(), 0);
        println!(
            "Running {} test{}",
            total,
            if total == 1 { "" } else { "s" }
        );

        for test in tests {
            if test.run() {
                succ += 1;
            }
        }
        println!(
            "test result: {}. {} passed; {} failed",
            if total == succ { "ok" } else { "FAILED" },
            succ,
            total - succ
        );
        total == succ
    }
}
