//! Storage layer tests

mod test_index_store;
