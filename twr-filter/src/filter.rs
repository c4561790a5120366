use std::fmt;

use serde::Deserialize;
use twr_ir::{InsnId, MethodNode, THROWABLE, TryCatchBlock};

use crate::javac::JavacPattern;
use crate::matcher::{Matcher, Ranges};
use crate::output::IgnoreSink;

/// A pass that marks instruction ranges of a method as ignored.
pub trait Filter {
    fn filter(&self, method: &MethodNode, output: &mut dyn IgnoreSink);
}

/// Which compiler families to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    /// Match `catch (Throwable)` handlers against the javac templates.
    pub javac: bool,
    /// Match catch-any handlers against the ecj templates.
    pub ecj: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            javac: true,
            ecj: true,
        }
    }
}

/// Template that recognized a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    Javac(JavacPattern),
    Ecj,
    EcjNoFlowOut,
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Javac(p) => write!(f, "javac {p}"),
            Pattern::Ecj => f.write_str("ecj"),
            Pattern::EcjNoFlowOut => f.write_str("ecj no-flow-out"),
        }
    }
}

/// Filters code that is generated for the try-with-resources statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct TryWithResourcesFilter {
    options: FilterOptions,
}

impl TryWithResourcesFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FilterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> FilterOptions {
        self.options
    }

    /// Try the candidate templates for one exception table entry.
    fn match_block(
        &self,
        matcher: &mut Matcher<'_>,
        block: &TryCatchBlock,
        handler: InsnId,
    ) -> Option<(Pattern, Ranges)> {
        match block.catch_type.as_deref() {
            None if self.options.ecj => {
                matcher.start(handler);
                if let Some(ranges) = matcher.match_ecj() {
                    return Some((Pattern::Ecj, ranges));
                }
                matcher.start(handler);
                matcher
                    .match_ecj_no_flow_out()
                    .map(|ranges| (Pattern::EcjNoFlowOut, ranges))
            }
            Some(THROWABLE) if self.options.javac => JavacPattern::ALL.iter().find_map(|&p| {
                matcher.start(handler);
                let ranges = matcher.match_javac(p);
                if ranges.is_none() {
                    log::trace!("{p} does not match handler at {handler}");
                }
                ranges.map(|ranges| (Pattern::Javac(p), ranges))
            }),
            _ => None,
        }
    }
}

impl Filter for TryWithResourcesFilter {
    fn filter(&self, method: &MethodNode, output: &mut dyn IgnoreSink) {
        if method.try_catch_blocks.is_empty() {
            return;
        }
        let mut matcher = Matcher::new(&method.insns);
        for block in &method.try_catch_blocks {
            let Some(handler) = method.handler_entry(block) else {
                log::warn!(
                    "{}{}: handler label {} is not defined",
                    method.name,
                    method.desc,
                    block.handler
                );
                continue;
            };
            let Some((pattern, ranges)) = self.match_block(&mut matcher, block, handler) else {
                continue;
            };
            log::debug!(
                "{}{}: {pattern} at {handler}, ignoring {}..={} and {}..={}",
                method.name,
                method.desc,
                ranges.normal.first,
                ranges.normal.last,
                ranges.handler.first,
                ranges.handler.last
            );
            output.ignore(ranges.normal.first, ranges.normal.last);
            output.ignore(ranges.handler.first, ranges.handler.last);
        }
    }
}
