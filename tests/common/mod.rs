// Common test utilities and fixtures

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items
// Note: not every test module uses every helper
#[allow(unused_imports)]
pub use fixtures::{portfolio_maps, HelpTree, TestCourse};
#[allow(unused_imports)]
pub use helpers::{create_test_services, document_keys, run_full_index};
