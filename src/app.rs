use std::{cell::RefCell, rc::Rc, time::Duration};

use console::style;
use dialoguer::{Editor, Select};

use crate::{
    config::FormSnapshot,
    controller::{SubmissionController, SubmitOutcome},
    error::{AppError, ExportError},
    export::{Clipboard, DirectoryDownloads, SessionClipboard},
    presenter::{ArtifactPresenter, ArtifactView, DOWNLOAD_FILE_NAME},
    service::HttpGenerationService,
    steps,
    ui::{self, TerminalNotifier, TerminalView},
    Cli,
};

type Shared<V> = Rc<RefCell<ArtifactPresenter<V>>>;
type Controller = SubmissionController<HttpGenerationService, TerminalNotifier, TerminalView>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Refresh,
    View,
    Copy,
    Download,
    Edit,
    RevertEdits,
    Resubmit,
    ChangeAnswers,
    Quit,
}

/// Runs the whole session: form, first submission, then the action menu.
/// Must be driven inside a `LocalSet`.
pub async fn run(cli: Cli) -> Result<(), AppError> {
    ui::print_banner();

    let service = HttpGenerationService::new(&cli.server, Duration::from_secs(cli.timeout_secs))
        .map_err(AppError::HttpClient)?;
    ui::print_info(&format!("Generation service: {}", style(service.endpoint()).cyan()));
    ui::print_info(&format!("Downloads go to: {}", cli.output_dir.display()));

    let presenter: Shared<TerminalView> =
        Rc::new(RefCell::new(ArtifactPresenter::new(TerminalView::default())));
    let controller = Rc::new(
        SubmissionController::new(service, TerminalNotifier, Rc::clone(&presenter))
            .with_ordering(cli.ordering()),
    );
    let mut downloads = DirectoryDownloads::new(&cli.output_dir).overwrite(cli.overwrite);
    let mut clipboard = SessionClipboard::default();

    let mut form = prompt_form(FormSnapshot::default()).await?;
    dispatch(&controller, &form);

    loop {
        let menu = menu_items(&presenter.borrow(), controller.in_flight());
        match choose_action(menu, controller.in_flight()).await? {
            Action::Refresh => {}
            Action::View => presenter.borrow_mut().scroll_into_view(),
            Action::Copy => {
                if let Err(e) = copy_and_acknowledge(&presenter, &mut clipboard).await {
                    ui::print_warning(&format!("Copy failed: {}", e));
                }
            }
            Action::Download => match presenter.borrow().download(&mut downloads) {
                Ok(path) => ui::print_success(&format!("Saved {}", path.display())),
                Err(e) => ui::print_warning(&format!("Download failed: {}", e)),
            },
            Action::Edit => edit(&presenter).await?,
            Action::RevertEdits => {
                let received = presenter.borrow().result().map(|r| r.config.clone());
                if let Some(text) = received {
                    presenter.borrow_mut().edit(text);
                    ui::print_success("Edits discarded.");
                }
            }
            Action::Resubmit => dispatch(&controller, &form),
            Action::ChangeAnswers => {
                match keep_previous_on_cancel(prompt_form(form.clone()).await)? {
                    Some(revised) => {
                        form = revised;
                        dispatch(&controller, &form);
                    }
                    None => ui::print_info("Form cancelled; your previous answers are kept."),
                }
            }
            Action::Quit => break,
        }
    }

    println!();
    ui::print_info("Bye.");
    Ok(())
}

// ── Submission ────────────────────────────────────────────────────────────────

/// Fires a submission in the background; the menu comes back at once.
fn dispatch(controller: &Rc<Controller>, form: &FormSnapshot) {
    let pending = controller.spawn_submit(form.clone());
    ui::print_info("Request sent. The menu stays available while it is pending.");

    tokio::task::spawn_local(async move {
        match pending.await {
            Ok(SubmitOutcome::Displayed) => ui::print_success("Configuration generated."),
            Ok(SubmitOutcome::Superseded) => {
                ui::print_info("A newer submission replaced an older response.")
            }
            // The notifier already told the user.
            Ok(SubmitOutcome::Failed(err)) => tracing::debug!(error = ?err, "submission failed"),
            Err(err) => tracing::error!(error = %err, "submission task aborted"),
        }
    });
}

// ── Copy ──────────────────────────────────────────────────────────────────────

/// Copies the current text and keeps the acknowledgment on screen until the
/// label has reverted, so the menu drawn afterwards shows the reset label.
async fn copy_and_acknowledge<V: ArtifactView>(
    presenter: &Shared<V>,
    clipboard: &mut impl Clipboard,
) -> Result<(), ExportError> {
    let receipt = presenter.borrow().copy(clipboard);

    let status = ui::status_line(presenter.borrow().copy_label());
    let reverted = receipt.revert.await;
    status.set_message(presenter.borrow().copy_label());
    status.finish_and_clear();

    if let Err(err) = reverted {
        tracing::warn!(error = %err, "copy label reset did not run");
    }
    receipt.outcome
}

// ── Menu ──────────────────────────────────────────────────────────────────────

fn menu_items<V: ArtifactView>(
    presenter: &ArtifactPresenter<V>,
    in_flight: usize,
) -> Vec<(Action, String)> {
    let mut menu = Vec::new();
    if in_flight > 0 {
        menu.push((Action::Refresh, "Refresh".to_string()));
    }
    if presenter.is_visible() {
        menu.push((Action::View, "View setup.conf".to_string()));
        menu.push((Action::Copy, presenter.copy_label().to_string()));
        menu.push((Action::Download, format!("Download {}", DOWNLOAD_FILE_NAME)));
        menu.push((Action::Edit, "Edit in $EDITOR".to_string()));
        if presenter
            .result()
            .is_some_and(|r| r.config != presenter.text())
        {
            menu.push((Action::RevertEdits, "Discard edits".to_string()));
        }
    }
    menu.push((Action::Resubmit, "Submit again".to_string()));
    menu.push((Action::ChangeAnswers, "Change answers".to_string()));
    menu.push((Action::Quit, "Quit".to_string()));
    menu
}

// ── Prompts ───────────────────────────────────────────────────────────────────
//
// Prompts block on stdin, so they run on the blocking pool. The local task
// set keeps running in the meantime (copy-label resets, in-flight requests).

async fn blocking<T, F>(prompt: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(prompt).await?
}

async fn prompt_form(defaults: FormSnapshot) -> Result<FormSnapshot, AppError> {
    blocking(move || steps::collect(defaults)).await
}

/// Esc while revising answers goes back to the menu instead of ending the
/// session.
fn keep_previous_on_cancel(
    revised: Result<FormSnapshot, AppError>,
) -> Result<Option<FormSnapshot>, AppError> {
    match revised {
        Ok(form) => Ok(Some(form)),
        Err(AppError::Cancelled) => Ok(None),
        Err(e) => Err(e),
    }
}

async fn choose_action(menu: Vec<(Action, String)>, in_flight: usize) -> Result<Action, AppError> {
    let labels: Vec<String> = menu.iter().map(|(_, label)| label.clone()).collect();
    println!();
    if in_flight > 0 {
        ui::print_info(&format!(
            "{} request{} pending; pick Refresh to update this menu.",
            in_flight,
            if in_flight == 1 { "" } else { "s" }
        ));
    }
    let picked = blocking(move || {
        Ok(Select::new()
            .with_prompt("What next?")
            .items(&labels)
            .default(0)
            .interact_opt()?)
    })
    .await?;

    Ok(picked.map_or(Action::Quit, |idx| menu[idx].0))
}

async fn edit(presenter: &Shared<TerminalView>) -> Result<(), AppError> {
    let current = presenter.borrow().text().to_string();
    let edited = blocking(move || {
        Ok(Editor::new()
            .extension(".conf")
            .trim_newlines(false)
            .edit(&current)?)
    })
    .await?;

    match edited {
        Some(text) => {
            presenter.borrow_mut().edit(text);
            ui::print_success("Edits kept. Copy and download now use the edited text.");
        }
        None => ui::print_info("Editor closed without saving; nothing changed."),
    }
    Ok(())
}
