//! Property-based tests for patch application and diffing
