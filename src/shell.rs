//! Desktop integration: file dialogs, printing, opening documents.
//!
//! Everything that leaves the terminal goes through [`ShellBridge`] so the
//! application logic can be driven by a mock in tests. `Ok(None)` from the
//! dialog methods means the user cancelled; errors are real failures.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{debug, warn};

pub trait ShellBridge {
    /// Ask the user where to save a file, then write `contents` there.
    /// Returns the chosen path, or `None` on cancel.
    fn save_file(
        &self,
        suggested_name: &str,
        filter_name: &str,
        extensions: &[&str],
        contents: &[u8],
    ) -> Result<Option<PathBuf>>;

    /// Ask the user to pick a file and return its contents, or `None` on
    /// cancel.
    fn open_file(&self, filter_name: &str, extensions: &[&str]) -> Result<Option<Vec<u8>>>;

    /// Print an HTML document. With a printer name the document is sent
    /// straight to it; otherwise it opens in the system browser for a
    /// preview-and-print flow.
    fn print_html(&self, html: &str, printer: Option<&str>) -> Result<()>;

    fn app_version(&self) -> &'static str;
}

/// Production bridge backed by native dialogs and system commands.
pub struct NativeShell;

impl NativeShell {
    /// Write the document under the system temp directory so external
    /// programs can read it after we return.
    fn write_temp_html(html: &str) -> Result<PathBuf> {
        let path = std::env::temp_dir().join(format!(
            "darzi-slip-{}.html",
            std::process::id()
        ));
        fs::write(&path, html).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

impl ShellBridge for NativeShell {
    fn save_file(
        &self,
        suggested_name: &str,
        filter_name: &str,
        extensions: &[&str],
        contents: &[u8],
    ) -> Result<Option<PathBuf>> {
        let picked = rfd::FileDialog::new()
            .add_filter(filter_name, extensions)
            .set_file_name(suggested_name)
            .save_file();
        let Some(path) = picked else {
            debug!("save dialog cancelled");
            return Ok(None);
        };
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(Some(path))
    }

    fn open_file(&self, filter_name: &str, extensions: &[&str]) -> Result<Option<Vec<u8>>> {
        let picked = rfd::FileDialog::new()
            .add_filter(filter_name, extensions)
            .pick_file();
        let Some(path) = picked else {
            debug!("open dialog cancelled");
            return Ok(None);
        };
        let contents =
            fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        Ok(Some(contents))
    }

    fn print_html(&self, html: &str, printer: Option<&str>) -> Result<()> {
        let path = Self::write_temp_html(html)?;
        match printer {
            Some(name) => {
                let status = Command::new("lp")
                    .arg("-d")
                    .arg(name)
                    .arg(&path)
                    .status()
                    .context("running lp")?;
                if !status.success() {
                    anyhow::bail!("lp exited with {} for printer {}", status, name);
                }
            }
            None => {
                // Preview path: hand the document to the default browser
                let status = Command::new("xdg-open")
                    .arg(&path)
                    .status()
                    .context("running xdg-open")?;
                if !status.success() {
                    warn!("xdg-open exited with {}", status);
                }
            }
        }
        Ok(())
    }

    fn app_version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::cell::RefCell;

    /// Records shell interactions instead of performing them.
    #[derive(Default)]
    pub struct MockShell {
        pub saved: RefCell<Vec<(String, Vec<u8>)>>,
        pub printed: RefCell<Vec<(String, Option<String>)>>,
        pub open_response: RefCell<Option<Vec<u8>>>,
        pub cancel_saves: bool,
    }

    impl ShellBridge for MockShell {
        fn save_file(
            &self,
            suggested_name: &str,
            _filter_name: &str,
            _extensions: &[&str],
            contents: &[u8],
        ) -> Result<Option<PathBuf>> {
            if self.cancel_saves {
                return Ok(None);
            }
            self.saved
                .borrow_mut()
                .push((suggested_name.to_string(), contents.to_vec()));
            Ok(Some(PathBuf::from(suggested_name)))
        }

        fn open_file(&self, _filter_name: &str, _extensions: &[&str]) -> Result<Option<Vec<u8>>> {
            Ok(self.open_response.borrow_mut().take())
        }

        fn print_html(&self, html: &str, printer: Option<&str>) -> Result<()> {
            self.printed
                .borrow_mut()
                .push((html.to_string(), printer.map(str::to_string)));
            Ok(())
        }

        fn app_version(&self) -> &'static str {
            "test"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_temp_html_round_trip() {
        let path = NativeShell::write_temp_html("<html>slip</html>").unwrap();
        let read_back = fs::read_to_string(&path).unwrap();
        assert_eq!(read_back, "<html>slip</html>");
        let _ = fs::remove_file(path);
    }
}
