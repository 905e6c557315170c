// Scenario runner for the guardsync primitives.
//
//   $ cargo run -p guardsync-grader -- sync::semaphore::sema_0 queue::bounded::backpressure
//
// runs exactly the listed test cases; without arguments every case runs.

mod driver;
mod queue;
mod sync;

use clap::Parser;
use driver::TestDriver;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "guardsync-grader", about = "Run guardsync test scenarios")]
struct Args {
    /// Print the names of the selected test cases instead of running them.
    #[arg(long)]
    list: bool,

    /// Only report warnings and errors.
    #[arg(short, long)]
    quiet: bool,

    /// Test cases to run, e.g. `sync::semaphore::sema_0`. Runs all when empty.
    tests: Vec<String>,
}

fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.quiet);

    let driver = TestDriver::new(args.tests);
    let tests: &[&'static dyn driver::TestCase] = &[
        // Guarded value.
        &sync::guarded::smoke,
        &sync::guarded::bounded_buffer,
        &sync::guarded::flag_broadcast,
        // Monitor.
        &sync::monitor::smoke,
        &sync::monitor::parking,
        &sync::monitor::unwinding,
        // Semaphore.
        &sync::semaphore::sema_0,
        &sync::semaphore::sema_1,
        &sync::semaphore::sema_2,
        &sync::semaphore::exec_order,
        &sync::semaphore::n_permits,
        &sync::semaphore::shared_handles,
        &sync::semaphore::exclusive_handle,
        // Unbounded queue.
        &queue::unbounded::fifo,
        &queue::unbounded::empty_pop,
        &queue::unbounded::producers,
        // Bounded queue.
        &queue::bounded::fifo,
        &queue::bounded::zero_capacity,
        &queue::bounded::try_pop_empty,
        &queue::bounded::backpressure,
        &queue::bounded::try_pop_accounting,
        &queue::bounded::capacity_invariant,
        // Channel.
        &queue::channel::spsc_capacity_1,
        &queue::channel::spsc_any_capacity,
        &queue::channel::try_receive,
    ];

    if args.list {
        driver.list(tests);
        return ExitCode::SUCCESS;
    }

    tracing::info!("guardsync: running scenarios");
    if driver.start(tests) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
