//! Integration tests for cascade
//!
//! Each test builds a throwaway family on disk and drives either the
//! `cascade` binary or the library's `LocalQueue` against it.

mod helpers;
mod test_duplicate;
mod test_init;
mod test_plan;
mod test_queue;
mod test_release;
mod test_status;
