use std::{
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::ExportError;

// ── Seams ─────────────────────────────────────────────────────────────────────

pub trait Clipboard {
    fn copy_text(&mut self, text: &str) -> Result<(), ExportError>;
}

pub trait Downloads {
    /// Saves `contents` under `file_name` and returns where it landed.
    fn save(&mut self, file_name: &str, contents: &str) -> Result<PathBuf, ExportError>;
}

// ── System clipboard ──────────────────────────────────────────────────────────

/// Keep this alive for the whole session: on X11 the selection is lost
/// as soon as the owning handle is dropped.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, ExportError> {
        Ok(Self {
            inner: arboard::Clipboard::new()?,
        })
    }
}

impl Clipboard for SystemClipboard {
    fn copy_text(&mut self, text: &str) -> Result<(), ExportError> {
        self.inner.set_text(text)?;
        debug!(bytes = text.len(), "copied to clipboard");
        Ok(())
    }
}

/// Opens a clipboard on first use and holds it for the session. A failed
/// open is reported and retried on the next copy.
pub struct SessionClipboard<C = SystemClipboard, F = fn() -> Result<C, ExportError>> {
    inner: Option<C>,
    open: F,
}

impl Default for SessionClipboard {
    fn default() -> Self {
        Self::with_opener(SystemClipboard::new)
    }
}

impl<C, F> SessionClipboard<C, F>
where
    C: Clipboard,
    F: FnMut() -> Result<C, ExportError>,
{
    pub fn with_opener(open: F) -> Self {
        Self { inner: None, open }
    }
}

impl<C, F> Clipboard for SessionClipboard<C, F>
where
    C: Clipboard,
    F: FnMut() -> Result<C, ExportError>,
{
    fn copy_text(&mut self, text: &str) -> Result<(), ExportError> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => (self.open)()?,
        };
        self.inner.insert(clipboard).copy_text(text)
    }
}

// ── Directory downloads ───────────────────────────────────────────────────────

/// Saves into a fixed directory. Without `overwrite`, an existing file is
/// kept and the new one gets a numbered name, as browsers do.
pub struct DirectoryDownloads {
    dir: PathBuf,
    overwrite: bool,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            overwrite: false,
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    fn next_free_path(&self, file_name: &str) -> PathBuf {
        let first = self.dir.join(file_name);
        if self.overwrite || !first.exists() {
            return first;
        }

        let path = Path::new(file_name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        (1..)
            .map(|n| self.dir.join(format!("{stem} ({n}){ext}")))
            .find(|p| !p.exists())
            .unwrap_or(first)
    }
}

impl Downloads for DirectoryDownloads {
    fn save(&mut self, file_name: &str, contents: &str) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.dir)?;

        // Staged next to the target so the final rename stays on one filesystem.
        // Dropping the handle on any error path deletes the staged file.
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(contents.as_bytes())?;
        staged.flush()?;

        let target = self.next_free_path(file_name);
        if self.overwrite {
            staged.persist(&target)?;
        } else {
            staged.persist_noclobber(&target)?;
        }

        info!(path = %target.display(), bytes = contents.len(), "configuration saved");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    type Copies = Rc<RefCell<Vec<String>>>;

    struct MemoryClipboard(Copies);

    impl Clipboard for MemoryClipboard {
        fn copy_text(&mut self, text: &str) -> Result<(), ExportError> {
            self.0.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn session_clipboard_opens_once_and_copies_every_time() {
        let copies = Copies::default();
        let mut opened = 0;
        {
            let sink = Rc::clone(&copies);
            let mut clipboard = SessionClipboard::with_opener(|| {
                opened += 1;
                Ok(MemoryClipboard(Rc::clone(&sink)))
            });

            clipboard.copy_text("first").unwrap();
            clipboard.copy_text("").unwrap();
        }

        assert_eq!(opened, 1);
        assert_eq!(*copies.borrow(), vec!["first".to_string(), String::new()]);
    }

    #[test]
    fn session_clipboard_reports_failed_open_and_retries() {
        let copies = Copies::default();
        let mut attempts = 0;
        {
            let sink = Rc::clone(&copies);
            let mut clipboard = SessionClipboard::with_opener(|| {
                attempts += 1;
                if attempts == 1 {
                    return Err(ExportError::Io(std::io::Error::other("no display")));
                }
                Ok(MemoryClipboard(Rc::clone(&sink)))
            });

            assert!(clipboard.copy_text("lost").is_err());
            clipboard.copy_text("kept").unwrap();
            clipboard.copy_text("again").unwrap();
        }

        assert_eq!(attempts, 2);
        assert_eq!(*copies.borrow(), vec!["kept".to_string(), "again".to_string()]);
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn saves_exact_contents_under_fixed_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut downloads = DirectoryDownloads::new(dir.path());

        let path = downloads.save("setup.conf", "HOSTNAME=box\n").unwrap();

        assert_eq!(path, dir.path().join("setup.conf"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "HOSTNAME=box\n");
        assert_eq!(entries(dir.path()), vec!["setup.conf"]);
    }

    #[test]
    fn repeated_saves_get_numbered_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut downloads = DirectoryDownloads::new(dir.path());

        let first = downloads.save("setup.conf", "one").unwrap();
        let second = downloads.save("setup.conf", "two").unwrap();
        let third = downloads.save("setup.conf", "").unwrap();

        assert_eq!(second, dir.path().join("setup (1).conf"));
        assert_eq!(third, dir.path().join("setup (2).conf"));
        assert_eq!(std::fs::read_to_string(first).unwrap(), "one");
        assert_eq!(std::fs::read_to_string(second).unwrap(), "two");
        assert_eq!(std::fs::read_to_string(third).unwrap(), "");
    }

    #[test]
    fn overwrite_replaces_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut downloads = DirectoryDownloads::new(dir.path()).overwrite(true);

        downloads.save("setup.conf", "old").unwrap();
        let path = downloads.save("setup.conf", "new").unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "new");
        assert_eq!(entries(dir.path()), vec!["setup.conf"]);
    }

    #[test]
    fn creates_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("configs");
        let mut downloads = DirectoryDownloads::new(&nested);

        let path = downloads.save("setup.conf", "x").unwrap();
        assert_eq!(path, nested.join("setup.conf"));
    }
}
