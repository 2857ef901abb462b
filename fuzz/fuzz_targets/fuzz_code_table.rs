#![no_main]

use libfuzzer_sys::fuzz_target;
use taxon_errors::{define_root, CodeTable};

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let Ok(table) = CodeTable::from_json(&value) else {
        return;
    };

    // Whatever parsed must also survive building a type and every factory.
    let Ok(root) = define_root("FuzzError", table) else {
        return;
    };
    let codes: Vec<String> = root.codes().codes().map(str::to_owned).collect();
    for code in &codes {
        let err = root.new_error(code, ()).expect("merged code is constructible");
        assert!(err.is(code));
        let _ = err.log().to_string();
    }
});
