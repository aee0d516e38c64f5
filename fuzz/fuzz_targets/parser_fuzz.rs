#![no_main]
use std::path::Path;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let args: Vec<String> = text
        .split_whitespace()
        .take(32)
        .map(str::to_string)
        .collect();
    dvpl::cli::fuzz_try_parse_args(&args);

    // Output naming must invert cleanly for any bare file name.
    for name in &args {
        let path = Path::new(name);
        if path.file_name() != Some(path.as_os_str()) {
            continue;
        }
        let packed = dvpl::io::packed_path(path);
        assert_eq!(dvpl::io::unpacked_path(&packed).as_deref(), Some(path));
    }
});
