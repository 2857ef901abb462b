//! Convenience macros for declaring code tables.
//!
//! # Usage
//!
//! ```rust
//! use taxon_errors::{define_root, error_codes};
//!
//! let root = define_root("RootError", error_codes! {
//!     Unexpected => "Unexpected!",
//!     BadArguments => "Bad args!",
//! })?;
//!
//! let http = root.subclass("HttpError", error_codes! {
//!     NotFound => "Not found!",
//!     "TooManyRequests" => "Slow down!",
//! })?;
//!
//! assert!(http.codes().contains("NotFound"));
//! # Ok::<(), taxon_errors::ConfigurationError>(())
//! ```
//!
//! Bare identifiers are stringified; string literals are taken verbatim,
//! for code names that are not Rust identifiers. Validation still happens
//! when the table is handed to [`define_root`](crate::define_root) or
//! [`ErrorType::subclass`](crate::ErrorType::subclass).

/// Build a [`CodeTable`](crate::CodeTable) from `code => message` pairs.
#[macro_export]
macro_rules! error_codes {
    (@name $code:ident) => {
        stringify!($code)
    };
    (@name $code:literal) => {
        $code
    };
    () => {
        $crate::CodeTable::new()
    };
    ($($code:tt => $message:expr),+ $(,)?) => {{
        let mut table = $crate::CodeTable::new();
        $(
            table.insert($crate::error_codes!(@name $code), $message);
        )+
        table
    }};
}
