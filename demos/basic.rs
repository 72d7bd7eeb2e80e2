//! A hands-on introduction: classify a failure, wrap it on the way up, and
//! inspect the result.
//!
//! Run with: `cargo run --example basic`

use errkit::prelude::*;

fn load_profile(user: &str) -> Result<String> {
    let err = Builder::new("row not found")
        .class(Class::NotFound)
        .category(Category::DATABASE)
        .id("profile-missing")
        .field("user", user)
        .capture_stack()
        .build();
    Err(err.wrap("loading profile"))
}

fn main() {
    let Err(err) = load_profile("alice") else {
        return;
    };

    println!("display : {err}");
    println!("class   : {}", err.class());
    println!("category: {}", err.category());
    println!("id      : {}", err.id().unwrap_or("<none>"));

    for field in err.fields() {
        println!("field   : {field}");
    }

    println!("--- stack ---");
    print!("{}", err.render_stack());

    if let Some(top) = err.top_user_frame() {
        println!("--- top user frame ---");
        println!("{top}");
    }
}
