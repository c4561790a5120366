//! Recognition of compiler-generated try-with-resources code.
//!
//! javac and ecj both expand `try (R r = ...) { ... }` into null checks,
//! `close()` calls and suppressed-exception bookkeeping on the normal and the
//! exceptional path. None of it corresponds to source the user wrote, so
//! [`TryWithResourcesFilter`] reports it to an [`IgnoreSink`] for exclusion
//! from coverage. Handlers that match no template are left alone.

pub mod ecj;
pub mod filter;
pub mod javac;
pub mod matcher;
pub mod output;

pub use filter::{Filter, FilterOptions, Pattern, TryWithResourcesFilter};
pub use javac::JavacPattern;
pub use matcher::{Matcher, Ranges};
pub use output::{IgnoreSink, IgnoredRange};

/// Run the default filter over `method` and collect the ignored ranges.
pub fn ignored_ranges(method: &twr_ir::MethodNode) -> Vec<IgnoredRange> {
    let mut ranges = Vec::new();
    TryWithResourcesFilter::new().filter(method, &mut ranges);
    ranges
}
