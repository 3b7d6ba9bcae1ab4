/*! Integration tests for sitecms.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - content: path addressing, deep merge and image indirection
 * - store: ContentStore lifecycle, edits and background persistence
 * - backend: the Backend trait against InMemory and SQL implementations
 * - history: content history and audit log recorders
 * - auth: access policy and operator credentials
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("sitecms=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod auth;
mod backend;
mod helpers;
mod history;
