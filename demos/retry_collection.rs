//! Collecting failures across retries without unbounded growth.
//!
//! Run with: `cargo run --example retry_collection`

use errkit::prelude::*;

fn flaky_fetch(attempt: u32) -> Result<&'static str> {
    match attempt % 3 {
        0 => Err(Error::new("connection reset").with_class(Class::Unavailable)),
        1 => Err(Error::new("connection reset").with_class(Class::Unavailable)),
        _ => Err(Error::new("upstream returned 503").with_class(Class::Unavailable)),
    }
}

fn main() {
    let mut failures = ErrorSet::new();

    for attempt in 0..6 {
        match flaky_fetch(attempt) {
            Ok(body) => {
                println!("succeeded: {body}");
                return;
            }
            Err(err) => failures.add(err),
        }
    }

    // Six attempts, two distinct failure modes.
    for entry in failures.iter() {
        println!("{} (seen {} times)", entry.error(), entry.count());
    }

    if let Some(combined) = failures.error() {
        println!("combined: {combined}");
    }
}
