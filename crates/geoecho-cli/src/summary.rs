/// Project narrative, compiled in from `assets/summary.txt`.
pub const SUMMARY: &str = include_str!("../assets/summary.txt");
