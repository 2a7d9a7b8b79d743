//! ANSI 24-bit colour escapes used by the status line.

pub const RESET: &str = "\x1b[0m";
pub const GOLD: &str = "\x1b[38;2;195;158;83m";
pub const CYAN: &str = "\x1b[38;2;118;170;185m";
pub const PINK: &str = "\x1b[38;2;255;182;193m";
pub const GREEN: &str = "\x1b[38;2;152;195;121m";
pub const GRAY: &str = "\x1b[38;2;64;64;64m";

// Context bar
pub const CTX_GREEN: &str = "\x1b[38;2;108;167;108m";
pub const CTX_GOLD: &str = "\x1b[38;2;188;155;83m";
pub const CTX_RED: &str = "\x1b[38;2;185;102;82m";
