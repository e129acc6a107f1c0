use std::fs::create_dir_all;
use std::path::{absolute, PathBuf};
use std::str::FromStr as _;

use tempfile::TempDir;
use tracing::debug;
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

/// Installs the tracing subscriber and error report hooks for a test
/// process. Safe to call from every test; only the first call wins.
pub fn initialize_tracing() {
    let _ = color_eyre::install();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(ErrorLayer::default())
        .try_init();
}

pub fn setup_tracing_and_temp_dir(name: Option<&str>, keep: bool) -> TempDir {
    initialize_tracing();
    temporary_directory(name, keep)
}

/// Creates a temporary directory under the workspace `.tmp` dir.
/// The directory is removed on drop unless `keep` is set.
pub fn temporary_directory(name: Option<&str>, keep: bool) -> TempDir {
    let abs_tmp_path = absolute(PathBuf::from_str("../../.tmp").unwrap()).unwrap();
    create_dir_all(&abs_tmp_path).unwrap();

    let builder = tempfile::Builder::new()
        .prefix(name.unwrap_or("pox-test-"))
        .rand_bytes(8)
        .keep(keep)
        .tempdir_in(abs_tmp_path);

    let temp_dir = builder.expect("Not able to create a temporary directory.");
    debug!("using random path: {:?} ", &temp_dir);
    temp_dir
}
