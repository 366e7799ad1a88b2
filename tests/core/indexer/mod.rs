//! Indexer layer tests
//!
//! Full index runs over real directories, help trees and portfolio files,
//! single-threaded and on the worker pool.

mod test_full_run;
mod test_worker_pool;
