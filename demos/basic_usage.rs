use serde_json::json;
use taxon_errors::{define_root, error_codes, ErrorType, Result};

fn http_errors() -> Result<(ErrorType, ErrorType)> {
    let app = define_root("AppError", error_codes! {
        Timeout => "The operation timed out!",
    })?;
    let http = app.subclass("HttpError", error_codes! {
        NotFound => "Resource not found!",
        Unexpected => "The server hit an unexpected condition!",
    })?;
    Ok((app, http))
}

fn fetch(http: &ErrorType, app: &ErrorType, path: &str) -> Result<taxon_errors::ErrorInstance> {
    // A low-level failure, wrapped by the HTTP layer as its cause
    let timeout = app.new_error("Timeout", json!({ "after_ms": 3000 }))?;
    http.new_error("NotFound", (json!({ "path": path }), timeout))
}

fn main() -> Result<()> {
    println!("--- Basic Usage Example ---\n");

    let (app, http) = http_errors()?;

    println!("1. [TAXONOMY] HttpError knows:");
    for capability in http.capabilities() {
        println!("   {:<12} {:<14} {}", capability.code(), capability.predicate_name(), capability.message());
    }

    let err = fetch(&http, &app, "/users/42")?;

    println!("\n2. [INSTANCE]");
    println!("   Display:   {err}");
    println!("   isNotFound: {}", err.is("NotFound"));
    println!("   isTimeout:  {}", err.is("Timeout"));
    println!("   Kind of AppError: {}", err.is_kind_of(&app));

    println!("\n3. [CAUSAL CHAIN]");
    for (depth, link) in err.chain().enumerate() {
        println!("   {depth}: {link}");
    }

    println!("\n4. [LOG LINE]");
    println!("   {}", err.log());

    println!("\n5. [SERIALIZED]");
    match serde_json::to_string(&err.to_json()) {
        Ok(line) => println!("   {line}"),
        Err(e) => println!("   serialization failed: {e}"),
    }

    println!("\n6. [OVERRIDES STAY LOCAL]");
    println!("   AppError:  {}", app.new_error("Unexpected", ())?.message());
    println!("   HttpError: {}", http.new_error("Unexpected", ())?.message());

    println!("\n7. [MISUSE]");
    if let Err(e) = http.new_error("Teapot", ()) {
        println!("   {e} ({:?})", e.kind());
    }

    Ok(())
}
