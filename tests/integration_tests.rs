//! End-to-end tests exercising the public API across modules.

use std::{sync::Arc, thread};

use errkit::{
    prelude::*, ensure, error, fields::MISSING_VALUE, Builder, FrameFormat,
    MAX_WRAP_DEPTH_EXCEEDED,
};

#[derive(Debug, thiserror::Error)]
#[error("record {id} missing")]
struct MissingRecord {
    id: u32,
}

#[derive(Debug, thiserror::Error)]
#[error("storage engine fault")]
struct StorageFault {
    #[source]
    source: MissingRecord,
}

#[test]
fn construction_round_trips_every_value() {
    let err = Builder::new("payment declined")
        .class(Class::Validation)
        .category(Category::EXTERNAL)
        .severity(Severity::Warning)
        .id("pay-409")
        .retryable(false)
        .fields(["provider", "acme", "amount_cents", "1299"])
        .build();

    assert_eq!(err.message(), "payment declined");
    assert_eq!(err.class(), Class::Validation);
    assert_eq!(err.category(), &Category::EXTERNAL);
    assert_eq!(err.severity(), Severity::Warning);
    assert_eq!(err.id(), Some("pay-409"));
    assert!(!err.retryable());

    let rendered: Vec<String> = err.fields().iter().map(|f| f.to_string()).collect();
    assert_eq!(rendered, ["provider=acme", "amount_cents=1299"]);

    // Accessors read through wraps unchanged.
    let wrapped = err.wrap("charging order 81");
    assert_eq!(wrapped.class(), Class::Validation);
    assert_eq!(wrapped.id(), Some("pay-409"));
    assert_eq!(wrapped.created_at(), err.created_at());
}

#[test]
fn odd_field_lists_never_drop_the_key() {
    let err = Error::with_context("boom", ["a", "1", "b"]);
    let fields = err.fields();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[1].key(), "b");
    assert_eq!(fields[1].value(), MISSING_VALUE);
}

#[test]
fn wrap_chain_assembles_exactly() {
    let err = Error::new("root error").wrap("layer 1").wrap("layer 2");
    assert_eq!(err.to_string(), "layer 2: layer 1: root error");
}

#[test]
fn stack_length_is_wrap_points_plus_root_frames() {
    let root = Builder::new("deep failure").capture_stack().build();
    let chain = root.wrap("step one").wrap_silent().wrap("step two");

    let root_frames = root.stack().len();
    assert!(root_frames > 0, "expected a resolvable captured stack");

    let wrap_points = chain.iter().filter(|e| e.wrap_point().is_some()).count();
    assert_eq!(chain.stack().len(), wrap_points + root_frames);

    // Resolving twice from the same raw stack is idempotent.
    assert_eq!(chain.stack(), chain.stack());
    let raw = root.raw_stack().expect("stack was captured");
    assert_eq!(raw.resolve(), raw.resolve());
}

#[test]
fn wrapping_a_root_without_stack_stays_stackless() {
    let err = Error::new("plain").wrap("outer");
    assert!(!err.has_stack());
    // The chain stack is exactly the resolvable wrap points.
    let wrap_points = err.iter().filter(|e| e.wrap_point().is_some()).count();
    assert_eq!(err.stack().len(), wrap_points);
}

#[test]
fn wrap_depth_ceiling_substitutes_the_sentinel() {
    let mut err = Error::new("root");
    for depth in 0..200 {
        err = err.wrap(format!("layer {depth}"));
    }
    // The loop crossed the ceiling several times without overflowing or
    // hanging; the chain is still well-formed and bounded.
    assert!(err.depth() <= errkit::limits::MAX_WRAP_DEPTH);
    assert!(err
        .iter()
        .last()
        .map(|root| root.message() == MAX_WRAP_DEPTH_EXCEEDED || root.message() == "root")
        .unwrap_or(false));

    let mut exact = Error::new("root");
    for depth in 0..errkit::limits::MAX_WRAP_DEPTH {
        exact = exact.wrap(format!("layer {depth}"));
    }
    let overflowed = exact.wrap("one too many");
    assert_eq!(overflowed.message(), MAX_WRAP_DEPTH_EXCEEDED);
}

#[test]
fn set_never_stores_two_entries_per_key() {
    let mut set = ErrorSet::new();
    for round in 0..7 {
        set.add(Error::new("flaky upstream"));
        let _ = round;
    }
    assert_eq!(set.len(), 1);
    assert_eq!(set.get(0).unwrap().count(), 7);
}

#[test]
fn list_and_set_error_tri_state() {
    let empty = ErrorList::new();
    assert!(empty.error().is_none());
    assert!(ErrorSet::new().error().is_none());

    let mut single = ErrorList::new();
    single.push(Error::new("alone"));
    assert_eq!(single.error().unwrap().to_string(), "alone");

    let mut many = ErrorSet::new();
    many.add(Error::new("first failure"));
    many.add(Error::new("second failure"));
    many.add(Error::new("second failure"));
    let combined = many.error().unwrap().to_string();
    assert!(combined.contains("first failure"));
    assert!(combined.contains("second failure"));
    assert!(combined.contains("(x2)"));
}

#[test]
fn concurrent_adds_converge_exactly() {
    const THREADS: usize = 10;
    const ADDS_PER_THREAD: usize = 100;
    const DISTINCT_KEYS: usize = 100;

    let set = Arc::new(SyncErrorSet::new());
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                for i in 0..ADDS_PER_THREAD {
                    let key = (t * ADDS_PER_THREAD + i) % DISTINCT_KEYS;
                    set.add(Error::new(format!("failure {key}")));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(set.len(), DISTINCT_KEYS);
    let snapshot = set.snapshot();
    let total: usize = snapshot.iter().map(|entry| entry.count()).sum();
    assert_eq!(total, THREADS * ADDS_PER_THREAD);
}

#[test]
fn immutable_chains_are_shared_across_threads() {
    let root = Builder::new("shared root").capture_stack().build();
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let root = root.clone();
            thread::spawn(move || {
                let wrapped = root.wrap(format!("worker {worker}"));
                (wrapped.to_string(), wrapped.stack().len())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (text, _) in &results {
        assert!(text.ends_with(": shared root"));
    }
    // Wrapping elsewhere never mutated the original chain.
    assert_eq!(root.to_string(), "shared root");
    assert_eq!(root.depth(), 0);
}

#[test]
fn foreign_cause_chain_is_reachable_and_matchable() {
    let fault = StorageFault {
        source: MissingRecord { id: 77 },
    };
    let err = Builder::new("lookup failed")
        .class(Class::NotFound)
        .cause(fault)
        .build();

    assert_eq!(err.to_string(), "lookup failed: storage engine fault");
    assert_eq!(err.cause().unwrap().to_string(), "storage engine fault");

    // is() delegates through the absorbed cause's source chain.
    assert!(err.is(&Error::new("storage engine fault")));
    assert!(err.is(&Error::new("record 77 missing")));
    assert!(!err.is(&Error::new("record 78 missing")));
}

#[test]
fn result_ext_and_macros_compose() {
    fn inner() -> errkit::Result<()> {
        ensure!(1 + 1 == 3, "arithmetic is broken: {}", 1 + 1);
        Ok(())
    }

    fn outer() -> errkit::Result<()> {
        inner().context("running self-check")
    }

    let err = outer().unwrap_err();
    assert_eq!(err.to_string(), "running self-check: arithmetic is broken: 2");

    let manual = error!("port {} unreachable", 8080);
    assert_eq!(manual.to_string(), "port 8080 unreachable");
}

#[test]
fn strict_format_redacts_paths() {
    let err = Builder::new("sensitive")
        .capture_stack()
        .frame_format(FrameFormat::strict())
        .build();

    let rendered = err.render_stack();
    for line in rendered.lines() {
        if line.starts_with("note:") {
            continue;
        }
        assert!(
            !line.contains(".rs"),
            "strict rendering leaked a path: {line}"
        );
    }
}
