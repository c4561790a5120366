#![allow(dead_code)]

//! Methods shaped like javac and ecj output for try-with-resources.

use twr_filter::{IgnoredRange, JavacPattern};
use twr_ir::{InsnId, MethodBuilder, MethodNode, Opcode, THROWABLE};

pub const READER: &str = "java/io/Reader";
pub const STREAM: &str = "java/io/InputStream";

/// Slot of the single javac resource.
const R: u16 = 1;
const PRIMARY: u16 = 2;
const T1: u16 = 3;
const T2: u16 = 4;
const SUPPRESSED: u16 = 5;

/// A method together with the ranges the filter must report for it.
pub struct Fixture {
    pub method: MethodNode,
    pub normal: IgnoredRange,
    pub handler: IgnoredRange,
}

impl Fixture {
    pub fn expected(&self) -> Vec<IgnoredRange> {
        vec![self.normal, self.handler]
    }

    /// Handler entry of the `index`th exception table entry.
    pub fn handler_entry(&self, index: usize) -> InsnId {
        self.method
            .handler_entry(&self.method.try_catch_blocks[index])
            .unwrap()
    }

    /// Handler entry of the entry whose handler label is called `name`.
    pub fn handler_named(&self, name: &str) -> InsnId {
        let block = self
            .method
            .try_catch_blocks
            .iter()
            .find(|b| self.method.label_name(b.handler) == name)
            .unwrap();
        self.method.handler_entry(block).unwrap()
    }

    /// Entry of the `catch (Throwable)` handler javac wraps the statement in.
    pub fn outer_handler(&self) -> InsnId {
        self.handler_named("h1")
    }
}

fn resource(i: usize) -> u16 {
    10 + i as u16
}

fn open(b: &mut MethodBuilder, slot: u16) {
    b.line(10)
        .invoke(Opcode::Invokestatic, "Fixture", "open", "()Ljava/io/Reader;")
        .var(Opcode::Astore, slot);
}

fn body(b: &mut MethodBuilder, slot: u16) {
    b.place("try_start")
        .line(11)
        .var(Opcode::Aload, slot)
        .invoke(Opcode::Invokestatic, "Fixture", "consume", "(Ljava/io/Reader;)V")
        .place("try_end");
}

fn close(b: &mut MethodBuilder, slot: u16, owner: &str) {
    b.var(Opcode::Aload, slot)
        .invoke(Opcode::Invokevirtual, owner, "close", "()V");
}

fn add_suppressed(b: &mut MethodBuilder, slot: u16) {
    b.var(Opcode::Aload, PRIMARY).var(Opcode::Aload, slot).invoke(
        Opcode::Invokevirtual,
        THROWABLE,
        "addSuppressed",
        "(Ljava/lang/Throwable;)V",
    );
}

/// The close sequence of pattern `p`; `ctx` keeps label names unique.
fn javac_close(b: &mut MethodBuilder, p: JavacPattern, ctx: &str, owner: &str) {
    let done = format!("{ctx}_done");
    if matches!(p, JavacPattern::Full | JavacPattern::Method) {
        b.var(Opcode::Aload, R).jump(Opcode::Ifnull, &done);
    }
    match p {
        JavacPattern::Optimal | JavacPattern::Method => {
            b.var(Opcode::Aload, PRIMARY).var(Opcode::Aload, R).invoke(
                Opcode::Invokestatic,
                "Fixture",
                "$closeResource",
                "(Ljava/lang/Throwable;Ljava/lang/AutoCloseable;)V",
            );
        }
        JavacPattern::Full | JavacPattern::OmittedNullCheck => {
            let plain = format!("{ctx}_plain");
            let start = format!("{ctx}_close_start");
            let end = format!("{ctx}_close_end");
            let suppress = format!("{ctx}_suppress");
            b.var(Opcode::Aload, PRIMARY)
                .jump(Opcode::Ifnull, &plain)
                .place(&start);
            close(b, R, owner);
            b.place(&end)
                .jump(Opcode::Goto, &done)
                .place(&suppress)
                .frame()
                .var(Opcode::Astore, SUPPRESSED);
            add_suppressed(b, SUPPRESSED);
            b.jump(Opcode::Goto, &done).place(&plain).frame();
            close(b, R, owner);
            b.try_catch(&start, &end, &suppress, Some(THROWABLE));
        }
    }
    b.place(&done).frame();
}

pub fn javac(p: JavacPattern) -> Fixture {
    javac_with_owners(p, READER, READER)
}

/// javac output closing the resource through `normal_owner` on the normal
/// path and `handler_owner` in the handler.
pub fn javac_with_owners(p: JavacPattern, normal_owner: &str, handler_owner: &str) -> Fixture {
    let mut b = MethodBuilder::new("read", "()V");
    open(&mut b, R);
    b.insn(Opcode::AconstNull).var(Opcode::Astore, PRIMARY);
    body(&mut b, R);

    let normal_first = b.next_id();
    javac_close(&mut b, p, "n", normal_owner);
    b.jump(Opcode::Goto, "exit");
    let normal_last = b.last_id();

    b.place("h1");
    let handler_first = b.next_id();
    b.frame()
        .var(Opcode::Astore, T1)
        .var(Opcode::Aload, T1)
        .var(Opcode::Astore, PRIMARY)
        .var(Opcode::Aload, T1)
        .insn(Opcode::Athrow)
        .place("h2")
        .frame()
        .var(Opcode::Astore, T2);
    javac_close(&mut b, p, "e", handler_owner);
    b.var(Opcode::Aload, T2).insn(Opcode::Athrow);
    let handler_last = b.last_id();

    b.place("exit").frame().line(13).insn(Opcode::Return);
    b.try_catch("try_start", "try_end", "h1", Some(THROWABLE))
        .try_catch("try_start", "h2", "h2", None);

    Fixture {
        method: b.build().unwrap(),
        normal: IgnoredRange::new(normal_first, normal_last),
        handler: IgnoredRange::new(handler_first, handler_last),
    }
}

/// `if (r != null) r.close(); throw primaryExc;` with the null check jumping
/// to `label`.
fn close_and_throw(b: &mut MethodBuilder, slot: u16, label: &str, owner: &str) {
    b.var(Opcode::Aload, slot).jump(Opcode::Ifnull, label);
    close(b, slot, owner);
    b.place(label)
        .frame()
        .var(Opcode::Aload, PRIMARY)
        .insn(Opcode::Athrow);
}

/// Merge the exception caught into `slot` into the primary exception.
fn suppress(b: &mut MethodBuilder, prefix: &str, slot: u16) {
    let start = format!("{prefix}_start");
    let end = format!("{prefix}_end");
    b.frame()
        .var(Opcode::Astore, slot)
        .var(Opcode::Aload, PRIMARY)
        .jump(Opcode::Ifnonnull, &start)
        .var(Opcode::Aload, slot)
        .var(Opcode::Astore, PRIMARY)
        .jump(Opcode::Goto, &end)
        .place(&start)
        .frame()
        .var(Opcode::Aload, PRIMARY)
        .var(Opcode::Aload, slot)
        .jump(Opcode::IfAcmpeq, &end);
    add_suppressed(b, slot);
    b.place(&end).frame();
}

pub fn ecj(resources: usize) -> Fixture {
    ecj_with_owners(resources, READER, READER)
}

/// ecj output for a statement that can complete normally, declaring
/// `resources` resources (at least one).
pub fn ecj_with_owners(resources: usize, normal_owner: &str, handler_owner: &str) -> Fixture {
    assert!(resources >= 1);
    let mut b = MethodBuilder::new("copy", "()V");
    for i in 0..resources {
        open(&mut b, resource(i));
    }
    body(&mut b, resource(0));

    let normal_first = b.next_id();
    b.var(Opcode::Aload, resource(0)).jump(Opcode::Ifnull, "n_end");
    close(&mut b, resource(0), normal_owner);
    b.place("n_end").jump(Opcode::Goto, "exit");
    let normal_last = b.last_id();

    b.place("h0");
    let handler_first = b.next_id();
    b.frame().var(Opcode::Astore, PRIMARY);
    close_and_throw(&mut b, resource(0), "x0", handler_owner);
    for i in 1..resources {
        b.var(Opcode::Aload, resource(i)).jump(Opcode::Ifnull, "exit");
        close(&mut b, resource(i), READER);
        b.jump(Opcode::Goto, "exit").place(&format!("h{i}"));
        suppress(&mut b, &format!("s{i}"), 20 + i as u16);
        close_and_throw(&mut b, resource(i), &format!("x{i}"), READER);
    }
    b.place("h_last");
    suppress(&mut b, "s_last", 30);
    b.var(Opcode::Aload, PRIMARY).insn(Opcode::Athrow);
    let handler_last = b.last_id();

    b.place("exit").frame().insn(Opcode::Return);
    b.try_catch("try_start", "try_end", "h0", None);
    for i in 1..resources {
        let handler = format!("h{i}");
        b.try_catch("try_start", &handler, &handler, None);
    }
    b.try_catch("try_start", "h_last", "h_last", None);

    Fixture {
        method: b.build().unwrap(),
        normal: IgnoredRange::new(normal_first, normal_last),
        handler: IgnoredRange::new(handler_first, handler_last),
    }
}

/// ecj output for a statement whose body always returns, declaring
/// `resources` resources (at least one).
pub fn ecj_no_flow_out(resources: usize) -> Fixture {
    assert!(resources >= 1);
    let mut b = MethodBuilder::new("first", "()Ljava/lang/Object;");
    for i in 0..resources {
        open(&mut b, resource(i));
    }
    body(&mut b, resource(0));
    b.insn(Opcode::AconstNull).var(Opcode::Astore, 3);

    let normal_first = b.next_id();
    for i in 0..resources {
        let end = format!("n{i}_end");
        b.var(Opcode::Aload, resource(i)).jump(Opcode::Ifnull, &end);
        close(&mut b, resource(i), READER);
        b.place(&end);
    }
    // the label closing the last null check is not part of the block
    let normal_last = InsnId(b.last_id().0 - 1);
    b.frame().var(Opcode::Aload, 3).insn(Opcode::Areturn);

    let handler_first = b.next_id();
    b.place("h0").frame().var(Opcode::Astore, PRIMARY);
    for i in 0..resources {
        close_and_throw(&mut b, resource(i), &format!("x{i}"), READER);
        b.place(&format!("h{}", i + 1));
        suppress(&mut b, &format!("s{i}"), 20 + i as u16);
    }
    b.var(Opcode::Aload, PRIMARY).insn(Opcode::Athrow);
    let handler_last = b.last_id();

    b.try_catch("try_start", "try_end", "h0", None);
    for i in 1..=resources {
        let handler = format!("h{i}");
        b.try_catch("try_start", &handler, &handler, None);
    }

    Fixture {
        method: b.build().unwrap(),
        normal: IgnoredRange::new(normal_first, normal_last),
        handler: IgnoredRange::new(handler_first, handler_last),
    }
}

/// A plain `try { ... } catch (Throwable t) { log(t); }` with no resources.
pub fn plain_catch(catch_type: Option<&str>) -> MethodNode {
    let mut b = MethodBuilder::new("guarded", "()V");
    b.place("try_start")
        .invoke(Opcode::Invokestatic, "Fixture", "work", "()V")
        .place("try_end")
        .jump(Opcode::Goto, "exit")
        .place("handler")
        .frame()
        .var(Opcode::Astore, 1)
        .var(Opcode::Aload, 1)
        .invoke(Opcode::Invokestatic, "Fixture", "log", "(Ljava/lang/Throwable;)V")
        .place("exit")
        .frame()
        .insn(Opcode::Return)
        .try_catch("try_start", "try_end", "handler", catch_type);
    b.build().unwrap()
}
