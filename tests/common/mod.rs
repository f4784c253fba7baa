#![allow(dead_code, unused_imports)]

use std::path::{Path, PathBuf};

pub use taskbridge_test_utils::{find_python, init_tracing, settings_for, with_timeout};

/// Files currently inside `dir`.
pub fn entries(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .expect("reading exchange dir")
        .map(|e| e.expect("dir entry").path())
        .collect()
}
