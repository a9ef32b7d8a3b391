// ABOUTME: SSH config scanning and terminal launching for the host launcher
// ABOUTME: Scanner feeds the host set; launcher spawns rendered command lines in a terminal

pub mod launcher;
pub mod scanner;

pub use launcher::{CommandRunner, TerminalLauncher};
pub use scanner::{ConfigScanner, HostSet};
