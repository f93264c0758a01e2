#![allow(dead_code)]
//! Shared test support: a virtual terminal harness and on-disk repositories

pub mod git_test_helper;
pub mod harness;
