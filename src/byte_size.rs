use std::fmt;

/// A byte count that renders with binary-prefix units.
///
/// `Display` picks the largest unit not exceeding the value and formats with
/// two decimal places; values below 1 KB print as a plain integer with a `B`
/// suffix. Used for human-readable diagnostics such as size-limit messages.
///
/// # Examples
///
/// ```
/// use flightcache::ByteSize;
///
/// assert_eq!(ByteSize(512).to_string(), "512B");
/// assert_eq!(ByteSize(1024).to_string(), "1.00KB");
/// assert_eq!(ByteSize(3 * 1024 * 1024 / 2).to_string(), "1.50MB");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteSize(pub i64);

impl ByteSize {
    pub const KB: i64 = 1 << 10;
    pub const MB: i64 = 1 << 20;
    pub const GB: i64 = 1 << 30;
    pub const TB: i64 = 1 << 40;
    pub const PB: i64 = 1 << 50;
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        if b >= Self::PB {
            write!(f, "{:.2}PB", b as f64 / Self::PB as f64)
        } else if b >= Self::TB {
            write!(f, "{:.2}TB", b as f64 / Self::TB as f64)
        } else if b >= Self::GB {
            write!(f, "{:.2}GB", b as f64 / Self::GB as f64)
        } else if b >= Self::MB {
            write!(f, "{:.2}MB", b as f64 / Self::MB as f64)
        } else if b >= Self::KB {
            write!(f, "{:.2}KB", b as f64 / Self::KB as f64)
        } else {
            write!(f, "{b}B")
        }
    }
}

impl From<i64> for ByteSize {
    fn from(bytes: i64) -> Self {
        ByteSize(bytes)
    }
}
