//! Templates for code emitted by the Eclipse compiler.
//!
//! ecj inlines the close logic of every resource into catch-any handlers.
//! Resources are named `r0`, `r1`, ... in the order their close code appears
//! in the handler; how many there are is discovered while matching.

use twr_ir::Opcode;

use crate::matcher::{Matcher, Ranges};
use crate::output::IgnoredRange;

impl Matcher<'_> {
    /// Match a statement whose body can complete normally, at the catch-any
    /// handler given to [`start`](Matcher::start).
    pub fn match_ecj(&mut self) -> Option<Ranges> {
        // "catch (any primaryExc)"
        if !(self.next_is_var(Opcode::Astore, "primaryExc")
            && self.next_is_ecj_close_and_throw("r0"))
        {
            return None;
        }

        let mut resources = 1;
        loop {
            let r = format!("r{resources}");
            if !self.attempt(|m| m.next_is_ecj_close(&r)) {
                break;
            }
            let matched = self.next_is_jump(Opcode::Goto, &format!("{r}.end"))
                && self.next_is_ecj_suppress(&r)
                && self.next_is_ecj_close_and_throw(&r);
            if !matched {
                return None;
            }
            resources += 1;
        }

        let matched = self.next_is_ecj_suppress("last")
            // "throw primaryExc"
            && self.next_is_var(Opcode::Aload, "primaryExc")
            && self.next_is(Opcode::Athrow);
        if !matched {
            return None;
        }
        let end = self.cursor?;

        let c = self.find_backward(|m| m.next_is_ecj_close("r0"))?;
        self.next();
        if !self.cursor_is_unconditional_jump() {
            return None;
        }

        Some(Ranges {
            normal: IgnoredRange::new(self.after(c)?, self.cursor?),
            handler: IgnoredRange::new(self.after(self.start)?, end),
        })
    }

    /// Match a statement whose body never completes normally, so no jump
    /// follows the close code on the normal path.
    pub fn match_ecj_no_flow_out(&mut self) -> Option<Ranges> {
        // "catch (any primaryExc)"
        if !self.next_is_var(Opcode::Astore, "primaryExc") {
            return None;
        }

        let mut resources = 0;
        loop {
            let r = format!("r{resources}");
            if !self.attempt(|m| m.next_is_ecj_close_and_throw(&r) && m.next_is_ecj_suppress(&r)) {
                break;
            }
            resources += 1;
        }

        // "throw primaryExc"
        if !(self.next_is_var(Opcode::Aload, "primaryExc") && self.next_is(Opcode::Athrow)) {
            return None;
        }
        let end = self.cursor?;

        let c = self.find_backward(|m| m.next_is_ecj_close("r0"))?;
        for i in 1..resources {
            if !self.next_is_ecj_close(&format!("r{i}")) {
                return None;
            }
        }

        Some(Ranges {
            normal: IgnoredRange::new(self.after(c)?, self.cursor?),
            handler: IgnoredRange::new(self.start, end),
        })
    }

    /// `if (r != null) r.close()` on the normal path.
    fn next_is_ecj_close(&mut self, name: &str) -> bool {
        let end = format!("{name}.end");
        self.next_is_var(Opcode::Aload, name)
            // "if (r != null)"
            && self.next_is_jump(Opcode::Ifnull, &end)
            // "r.close()"
            && self.next_is_close(name)
    }

    /// `if (r != null) r.close(); throw primaryExc;`
    fn next_is_ecj_close_and_throw(&mut self, name: &str) -> bool {
        self.next_is_var(Opcode::Aload, name)
            // "if (r != null)"
            && self.next_is_jump(Opcode::Ifnull, name)
            // "r.close()"
            && self.next_is_close(name)
            && self.next_is_label(name)
            && self.next_is_var(Opcode::Aload, "primaryExc")
            && self.next_is(Opcode::Athrow)
    }

    /// Merge a caught exception into `primaryExc`.
    fn next_is_ecj_suppress(&mut self, name: &str) -> bool {
        let suppressed = format!("{name}.t");
        let start = format!("{name}.suppressStart");
        let end = format!("{name}.suppressEnd");
        self.next_is_var(Opcode::Astore, &suppressed)
            // "if (primaryExc == null)"
            && self.next_is_var(Opcode::Aload, "primaryExc")
            && self.next_is_jump(Opcode::Ifnonnull, &start)
            // "primaryExc = suppressedExc"
            && self.next_is_var(Opcode::Aload, &suppressed)
            && self.next_is_var(Opcode::Astore, "primaryExc")
            && self.next_is_jump(Opcode::Goto, &end)
            // "else if (primaryExc != suppressedExc)"
            && self.next_is_label(&start)
            && self.next_is_var(Opcode::Aload, "primaryExc")
            && self.next_is_var(Opcode::Aload, &suppressed)
            && self.next_is_jump(Opcode::IfAcmpeq, &end)
            // "primaryExc.addSuppressed(suppressedExc)"
            && self.next_is_add_suppressed_of(&suppressed)
            && self.next_is_label(&end)
    }
}
