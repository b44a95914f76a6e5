//! Tests for the interpreter
//!
//! Organized by instruction family

mod exec_loop_tests;
mod helpers;
mod split_tests;
