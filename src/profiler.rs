//! Simple profiling of simulation calls using thread-local storage
//!
//! Timing is off by default. Enable it with `profiling.enabled` in Search.toml or
//! the environment variable TAS_SEARCH_PROFILE=1. Workers accumulate into
//! thread-local counters and merge them into global totals when they finish.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

/// Simulation call being timed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Apply,
    Heuristic,
    LegalActions,
    GoalCheck,
}

impl Category {
    const COUNT: usize = 4;

    const ALL: [Category; Category::COUNT] = [
        Category::Apply,
        Category::Heuristic,
        Category::LegalActions,
        Category::GoalCheck,
    ];

    fn index(self) -> usize {
        match self {
            Category::Apply => 0,
            Category::Heuristic => 1,
            Category::LegalActions => 2,
            Category::GoalCheck => 3,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Category::Apply => "Apply",
            Category::Heuristic => "Heuristic",
            Category::LegalActions => "Legal Actions",
            Category::GoalCheck => "Goal Check",
        }
    }
}

#[derive(Default, Clone, Copy)]
struct Counter {
    time_ns: u64,
    calls: u64,
}

thread_local! {
    static LOCAL: RefCell<[Counter; Category::COUNT]> = RefCell::new([Counter::default(); Category::COUNT]);
}

static ENABLED: AtomicBool = AtomicBool::new(false);

// Global aggregators
static GLOBAL_TIME_NS: [AtomicU64; Category::COUNT] = [
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
];
static GLOBAL_CALLS: [AtomicU64; Category::COUNT] = [
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
];

/// Turns profiling on if requested by config or by TAS_SEARCH_PROFILE
pub fn configure(enabled: bool) {
    let from_env = std::env::var("TAS_SEARCH_PROFILE").is_ok();
    ENABLED.store(enabled || from_env, Ordering::Relaxed);
}

#[inline]
pub fn is_profiling_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

pub struct ProfileGuard {
    start: Instant,
    category: Category,
}

impl ProfileGuard {
    pub fn new(category: Category) -> Option<Self> {
        if is_profiling_enabled() {
            Some(ProfileGuard {
                start: Instant::now(),
                category,
            })
        } else {
            None
        }
    }
}

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        let elapsed_ns = self.start.elapsed().as_nanos() as u64;
        let idx = self.category.index();
        LOCAL.with(|local| {
            let mut local = local.borrow_mut();
            local[idx].time_ns += elapsed_ns;
            local[idx].calls += 1;
        });
    }
}

/// Moves this thread's counters into the global totals
pub fn merge_thread_local() {
    if !is_profiling_enabled() {
        return;
    }

    LOCAL.with(|local| {
        let mut local = local.borrow_mut();
        for category in Category::ALL {
            let idx = category.index();
            GLOBAL_TIME_NS[idx].fetch_add(local[idx].time_ns, Ordering::Relaxed);
            GLOBAL_CALLS[idx].fetch_add(local[idx].calls, Ordering::Relaxed);
            local[idx] = Counter::default();
        }
    });
}

/// Global (time_ns, calls) for a category
pub fn totals(category: Category) -> (u64, u64) {
    let idx = category.index();
    (
        GLOBAL_TIME_NS[idx].load(Ordering::Relaxed),
        GLOBAL_CALLS[idx].load(Ordering::Relaxed),
    )
}

pub fn print_report(total_time_ms: u64) {
    if !is_profiling_enabled() {
        return;
    }

    let total_ns = total_time_ms * 1_000_000;

    eprintln!("\n═══════════════════════════════════════════════════════════");
    eprintln!("                 PERFORMANCE PROFILE");
    eprintln!("═══════════════════════════════════════════════════════════");
    eprintln!("Total Time: {}ms\n", total_time_ms);

    for category in Category::ALL {
        let (time_ns, calls) = totals(category);
        let ms = time_ns as f64 / 1_000_000.0;
        let pct = if total_ns > 0 { 100.0 * time_ns as f64 / total_ns as f64 } else { 0.0 };
        let avg_us = if calls > 0 { time_ns as f64 / (calls * 1000) as f64 } else { 0.0 };

        eprintln!("{}:", category.name());
        eprintln!("  Time:     {:.2}ms ({:.1}%)", ms, pct);
        eprintln!("  Calls:    {}", calls);
        eprintln!("  Avg:      {:.2}µs/call\n", avg_us);
    }

    eprintln!("═══════════════════════════════════════════════════════════\n");
}

pub fn reset() {
    for idx in 0..Category::COUNT {
        GLOBAL_TIME_NS[idx].store(0, Ordering::Relaxed);
        GLOBAL_CALLS[idx].store(0, Ordering::Relaxed);
    }
}

#[macro_export]
macro_rules! profile {
    ($category:expr, $code:expr) => {{
        let _guard = $crate::profiler::ProfileGuard::new($category);
        $code
    }};
}
