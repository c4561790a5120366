//! Templates for code emitted by javac.
//!
//! javac wraps the statement in a `catch (Throwable t)` that records the
//! primary exception and rethrows it, plus a catch-any handler that closes
//! the resource and rethrows. The close logic itself comes in four shapes
//! depending on compiler version and what javac knows about the resource.

use std::fmt;

use twr_ir::Opcode;

use crate::matcher::{Matcher, Ranges};
use crate::output::IgnoredRange;

const CLOSE_RESOURCE: &str = "$closeResource";
const CLOSE_RESOURCE_DESC: &str = "(Ljava/lang/Throwable;Ljava/lang/AutoCloseable;)V";

/// Close-sequence shapes, in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JavacPattern {
    /// `$closeResource(primaryExc, r)` without a null check.
    Optimal,
    /// Inline null checks, `close()` and `addSuppressed`.
    Full,
    /// [`Full`](Self::Full) without the null check on the resource.
    OmittedNullCheck,
    /// `if (r != null) $closeResource(primaryExc, r)`.
    Method,
}

impl JavacPattern {
    pub const ALL: [JavacPattern; 4] = [
        JavacPattern::Optimal,
        JavacPattern::Full,
        JavacPattern::OmittedNullCheck,
        JavacPattern::Method,
    ];

    pub fn name(self) -> &'static str {
        match self {
            JavacPattern::Optimal => "OPTIMAL",
            JavacPattern::Full => "FULL",
            JavacPattern::OmittedNullCheck => "OMITTED_NULL_CHECK",
            JavacPattern::Method => "METHOD",
        }
    }
}

impl fmt::Display for JavacPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Matcher<'_> {
    /// Match pattern `p` at the `catch (Throwable)` handler given to
    /// [`start`](Matcher::start).
    pub fn match_javac(&mut self, p: JavacPattern) -> Option<Ranges> {
        let matched =
            // "catch (Throwable t)"
            self.next_is_var(Opcode::Astore, "t1")
            // "primaryExc = t"
            && self.next_is_var(Opcode::Aload, "t1")
            && self.next_is_var(Opcode::Astore, "primaryExc")
            // "throw t"
            && self.next_is_var(Opcode::Aload, "t1")
            && self.next_is(Opcode::Athrow)
            // "catch (any t)"
            && self.next_is_var(Opcode::Astore, "t2")
            && self.next_is_javac_close(p, "e")
            // "throw t"
            && self.next_is_var(Opcode::Aload, "t2")
            && self.next_is(Opcode::Athrow);
        if !matched {
            return None;
        }
        let end = self.cursor?;

        let c = self.find_backward(|m| m.next_is_javac_close(p, "n"))?;
        let close_end = self.cursor;
        self.next();
        if !self.cursor_is_unconditional_jump() {
            self.cursor = close_end;
        }

        Some(Ranges {
            normal: IgnoredRange::new(self.after(c)?, self.cursor?),
            handler: IgnoredRange::new(self.after(self.start)?, end),
        })
    }

    /// The first match binds `r` and `primaryExc`; later matches check them.
    /// `ctx` keeps the suppressed-exception local of each path apart.
    fn next_is_javac_close(&mut self, p: JavacPattern, ctx: &str) -> bool {
        if matches!(p, JavacPattern::Method | JavacPattern::Full) {
            // "if (r != null)"
            if !(self.next_is_var(Opcode::Aload, "r") && self.next_is(Opcode::Ifnull)) {
                return false;
            }
        }
        match p {
            JavacPattern::Method | JavacPattern::Optimal => {
                self.next_is_var(Opcode::Aload, "primaryExc")
                    && self.next_is_var(Opcode::Aload, "r")
                    && self.next_is(Opcode::Invokestatic)
                    && self.insn().and_then(|insn| insn.method()).is_some_and(|m| {
                        m.name == CLOSE_RESOURCE && m.desc == CLOSE_RESOURCE_DESC
                    })
            }
            JavacPattern::Full | JavacPattern::OmittedNullCheck => {
                let t = format!("{ctx}t");
                self.next_is_var(Opcode::Aload, "primaryExc")
                    // "if (primaryExc != null)"
                    && self.next_is(Opcode::Ifnull)
                    // "r.close()"
                    && self.next_is_close("r")
                    && self.next_is(Opcode::Goto)
                    // "catch (Throwable t)"
                    && self.next_is_var(Opcode::Astore, &t)
                    // "primaryExc.addSuppressed(t)"
                    && self.next_is_add_suppressed_of(&t)
                    && self.next_is(Opcode::Goto)
                    // "r.close()"
                    && self.next_is_close("r")
            }
        }
    }
}
