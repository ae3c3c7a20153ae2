//! Backup file naming.
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// Expand `%date%`, `%datetime%` and `%seconds%` in a backup extension and
/// make sure it starts with `.`.
#[must_use]
pub fn expand_extension(extension: &str, now: DateTime<Local>) -> String {
    let mut ext = extension.to_string();
    if ext.contains('%') {
        ext = ext
            .replace("%datetime%", &now.format("%Y.%m.%d-%H_%M_%S").to_string())
            .replace("%date%", &now.format("%Y.%m.%d").to_string())
            .replace("%seconds%", &now.timestamp().to_string());
    }
    if !ext.starts_with('.') {
        ext.insert(0, '.');
    }
    ext
}

/// Where `path` is moved before it is overwritten: the same directory,
/// the file stem plus the expanded extension.
///
/// ```
/// use std::path::Path;
/// use sysedit_cli::text::backup_path;
///
/// let now = chrono::Local::now();
/// assert_eq!(
///     backup_path(Path::new("/etc/fstab.conf"), "bak", now),
///     Path::new("/etc/fstab.bak")
/// );
/// ```
#[must_use]
pub fn backup_path(path: &Path, extension: &str, now: DateTime<Local>) -> PathBuf {
    let stem = path
        .file_stem()
        .map_or_else(String::new, |s| s.to_string_lossy().into_owned());
    path.with_file_name(format!("{stem}{}", expand_extension(extension, now)))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 12, 5, 7).unwrap()
    }

    #[test]
    fn adds_leading_dot() {
        assert_eq!(expand_extension("bak", noon()), ".bak");
        assert_eq!(expand_extension(".orig", noon()), ".orig");
    }

    #[test]
    fn expands_date_placeholders() {
        assert_eq!(expand_extension("%date%", noon()), ".2024.03.09");
        assert_eq!(expand_extension(".%datetime%", noon()), ".2024.03.09-12_05_07");
        assert_eq!(
            expand_extension("%seconds%", noon()),
            format!(".{}", noon().timestamp())
        );
    }

    #[test]
    fn backup_stays_in_directory() {
        let path = backup_path(Path::new("conf/app.ini"), "%date%", noon());
        assert_eq!(path, Path::new("conf/app.2024.03.09"));
        let path = backup_path(Path::new("hosts"), ".bak", noon());
        assert_eq!(path, Path::new("hosts.bak"));
    }
}
