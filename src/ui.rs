//! Prefixed messages for the person at the terminal.

use std::fmt::Display;

const PREFIX_INFO: &str = "[tforge]";
const PREFIX_WARN: &str = "[tforge:warn]";
const PREFIX_ERROR: &str = "[tforge:error]";

pub fn info(msg: impl Display) {
    println!("{PREFIX_INFO} {msg}");
}

pub fn warn(msg: impl Display) {
    println!("{PREFIX_WARN} {msg}");
}

pub fn error(msg: impl Display) {
    eprintln!("{PREFIX_ERROR} {msg}");
}
