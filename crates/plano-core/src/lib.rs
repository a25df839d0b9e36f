pub mod config;
pub mod error;
pub mod time;
pub mod types;

/// Log with HH:MM:SS timestamp.
#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {{
        let secs = $crate::types::now_unix();
        let h = (secs % 86400) / 3600;
        let m = (secs % 3600) / 60;
        let s = secs % 60;
        eprintln!("{h:02}:{m:02}:{s:02} plano: {}", format_args!($($arg)*));
    }};
}
