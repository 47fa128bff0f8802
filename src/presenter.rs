use std::{cell::Cell, path::PathBuf, rc::Rc, time::Duration};

use tokio::task::JoinHandle;

use crate::{
    config::GenerationResult,
    error::ExportError,
    export::{Clipboard, Downloads},
};

pub const COPY_LABEL: &str = "Copy to Clipboard";
pub const COPIED_LABEL: &str = "Copied!";
pub const COPY_REVERT_DELAY: Duration = Duration::from_millis(2000);
pub const DOWNLOAD_FILE_NAME: &str = "setup.conf";

/// Where the output region is drawn.
pub trait ArtifactView {
    fn render_artifact(&mut self, text: &str);
    fn scroll_into_view(&mut self);
}

/// Result of a copy trigger. `revert` resolves once this trigger's
/// label reset has run.
pub struct CopyReceipt {
    pub outcome: Result<(), ExportError>,
    pub revert: JoinHandle<()>,
}

/// Owns the rendered artifact and its export actions.
pub struct ArtifactPresenter<V> {
    view: V,
    result: Option<GenerationResult>,
    text: String,
    visible: bool,
    copy_label: Rc<Cell<&'static str>>,
}

impl<V: ArtifactView> ArtifactPresenter<V> {
    pub fn new(view: V) -> Self {
        Self {
            view,
            result: None,
            text: String::new(),
            visible: false,
            copy_label: Rc::new(Cell::new(COPY_LABEL)),
        }
    }

    /// Replaces whatever is shown with `result` and reveals the output region.
    pub fn display(&mut self, result: GenerationResult) {
        self.text.clone_from(&result.config);
        self.result = Some(result);
        self.visible = true;
        self.view.render_artifact(&self.text);
    }

    pub fn scroll_into_view(&mut self) {
        if self.visible {
            self.view.scroll_into_view();
        }
    }

    /// User edit of the output text. The received result is left as is.
    pub fn edit(&mut self, text: String) {
        self.text = text;
        self.view.render_artifact(&self.text);
    }

    /// Must be called from within a `LocalSet`: the label reset is a local task.
    pub fn copy(&self, clipboard: &mut impl Clipboard) -> CopyReceipt {
        let outcome = clipboard.copy_text(&self.text);

        self.copy_label.set(COPIED_LABEL);
        let label = Rc::clone(&self.copy_label);
        let revert = tokio::task::spawn_local(async move {
            tokio::time::sleep(COPY_REVERT_DELAY).await;
            label.set(COPY_LABEL);
        });

        CopyReceipt { outcome, revert }
    }

    /// Saves the current text, edits included, as `setup.conf`.
    pub fn download(&self, downloads: &mut impl Downloads) -> Result<PathBuf, ExportError> {
        downloads.save(DOWNLOAD_FILE_NAME, &self.text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn copy_label(&self) -> &'static str {
        self.copy_label.get()
    }

    #[cfg(test)]
    pub fn view(&self) -> &V {
        &self.view
    }
}
