// Copyright (c) 2026 Peerpool
// Licensed under the Apache-2.0 License.

#![no_main]
#![forbid(unsafe_code)]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parser robustness only; value ranges are covered by tests.
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = peerpool::config::NodeConfig::from_toml_str(s);
    }
});
