//! Ordered Writer and destination lifecycle (spec.md §3, §4.5).

mod writer;

pub use writer::OrderedWriter;

use std::path::{Path, PathBuf};

/// Where the assembled object goes (spec.md §3's `Destination`).
#[derive(Debug, Clone)]
pub enum Destination {
    File(PathBuf),
    Stdout,
}

impl Destination {
    /// `-` means stdout; anything else is a file path (spec.md §6). A
    /// missing destination argument defaults to `-` at the CLI layer, not
    /// here.
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            Destination::Stdout
        } else {
            Destination::File(PathBuf::from(arg))
        }
    }
}

/// Staging path for a file destination: the final path with `.download`
/// appended (spec.md §3, §6: the only file this program ever persists).
pub fn staging_path(final_path: &Path) -> PathBuf {
    let mut os = final_path.as_os_str().to_owned();
    os.push(".download");
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_parses_as_stdout() {
        assert!(matches!(Destination::parse("-"), Destination::Stdout));
    }

    #[test]
    fn anything_else_parses_as_a_file() {
        match Destination::parse("output.bin") {
            Destination::File(p) => assert_eq!(p, PathBuf::from("output.bin")),
            Destination::Stdout => panic!("expected a file destination"),
        }
    }

    #[test]
    fn staging_path_appends_suffix() {
        let p = staging_path(Path::new("/tmp/archive.iso"));
        assert_eq!(p, PathBuf::from("/tmp/archive.iso.download"));
    }
}
