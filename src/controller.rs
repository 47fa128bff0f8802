use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    config::{ConfigurationRequest, FormSnapshot},
    error::GenerateError,
    presenter::{ArtifactPresenter, ArtifactView},
    service::GenerationService,
};

/// Blocking, user-visible error surface.
pub trait Notifier {
    fn alert(&self, message: &str);
}

/// Which response is shown when submissions overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseOrdering {
    /// Every response overwrites the display in arrival order.
    #[default]
    LastResponseWins,
    /// Responses to anything but the latest dispatched submission are dropped.
    LatestSubmissionWins,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Displayed,
    /// A newer submission was dispatched while this one was in flight.
    Superseded,
    Failed(GenerateError),
}

/// Turns a form snapshot into the request sent to the service.
/// Values are forwarded untouched; validation belongs to the service.
pub fn build_request(form: &FormSnapshot) -> ConfigurationRequest {
    ConfigurationRequest {
        username: form.username.clone(),
        hostname: form.hostname.clone(),
        timezone: form.timezone.clone(),
        keymap: form.keymap.clone(),
        desktop_environment: form.desktop_environment.clone(),
        aur_helper: form.aur_helper.clone(),
        install_type: form.install_type.clone(),
        optional_packages: form
            .optional_packages
            .iter()
            .filter(|toggle| toggle.checked)
            .map(|toggle| toggle.value.clone())
            .collect(),
    }
}

pub struct SubmissionController<S, N, V> {
    service: S,
    notifier: N,
    presenter: Rc<RefCell<ArtifactPresenter<V>>>,
    ordering: ResponseOrdering,
    dispatched: Cell<u64>,
    in_flight: Cell<usize>,
}

impl<S, N, V> SubmissionController<S, N, V>
where
    S: GenerationService,
    N: Notifier,
    V: ArtifactView,
{
    pub fn new(service: S, notifier: N, presenter: Rc<RefCell<ArtifactPresenter<V>>>) -> Self {
        Self {
            service,
            notifier,
            presenter,
            ordering: ResponseOrdering::default(),
            dispatched: Cell::new(0),
            in_flight: Cell::new(0),
        }
    }

    pub fn with_ordering(mut self, ordering: ResponseOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Sends one generation request for `form` and routes the outcome.
    ///
    /// Never fails: errors end up in a notification and leave the current
    /// artifact alone. Several calls may be in flight at once; no borrow of
    /// the presenter is held across the await.
    pub async fn submit(&self, form: &FormSnapshot) -> SubmitOutcome {
        let ticket = self.dispatched.get() + 1;
        self.dispatched.set(ticket);
        self.in_flight.set(self.in_flight.get() + 1);

        let result = {
            let request = build_request(form);
            debug!(
                ticket,
                packages = request.optional_packages.len(),
                "dispatching generation request"
            );
            self.service.generate(&request).await
        };
        self.in_flight.set(self.in_flight.get() - 1);

        if self.is_stale(ticket) {
            info!(ticket, latest = self.dispatched.get(), "dropping superseded response");
            return SubmitOutcome::Superseded;
        }

        match result {
            Ok(result) => {
                info!(ticket, bytes = result.config.len(), "configuration received");
                let mut presenter = self.presenter.borrow_mut();
                presenter.display(result);
                presenter.scroll_into_view();
                SubmitOutcome::Displayed
            }
            Err(err) => {
                warn!(ticket, error = %err, "configuration generation failed");
                self.notifier
                    .alert(&format!("Error generating configuration: {err}"));
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Submissions dispatched but not yet answered.
    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }

    fn is_stale(&self, ticket: u64) -> bool {
        self.ordering == ResponseOrdering::LatestSubmissionWins && ticket != self.dispatched.get()
    }
}

impl<S, N, V> SubmissionController<S, N, V>
where
    S: GenerationService + 'static,
    N: Notifier + 'static,
    V: ArtifactView + 'static,
{
    /// Starts a submission as a local task and returns at once, so the caller
    /// can keep taking input (and submit again) while the request is pending.
    /// Must be called from within a `LocalSet`.
    pub fn spawn_submit(self: &Rc<Self>, form: FormSnapshot) -> JoinHandle<SubmitOutcome> {
        let controller = Rc::clone(self);
        tokio::task::spawn_local(async move { controller.submit(&form).await })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, VecDeque};

    use async_trait::async_trait;
    use tokio::{sync::oneshot, task::LocalSet};

    use super::*;
    use crate::{
        config::{GenerationResult, PackageToggle},
        presenter::tests::RecordingView,
    };

    #[derive(Default)]
    struct RecordingNotifier {
        alerts: RefCell<Vec<String>>,
    }

    impl<'a> Notifier for &'a RecordingNotifier {
        fn alert(&self, message: &str) {
            self.alerts.borrow_mut().push(message.to_string());
        }
    }

    impl Notifier for Rc<RecordingNotifier> {
        fn alert(&self, message: &str) {
            self.alerts.borrow_mut().push(message.to_string());
        }
    }

    type Reply = Result<GenerationResult, GenerateError>;

    /// Each call waits on the next pre-registered channel, so the test
    /// decides when (and in which order) responses arrive.
    #[derive(Default)]
    struct ScriptedService {
        replies: RefCell<VecDeque<oneshot::Receiver<Reply>>>,
        requests: RefCell<Vec<ConfigurationRequest>>,
    }

    impl ScriptedService {
        fn expect(&self) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.replies.borrow_mut().push_back(rx);
            tx
        }
    }

    #[async_trait(?Send)]
    impl<'a> GenerationService for &'a ScriptedService {
        async fn generate(&self, request: &ConfigurationRequest) -> Reply {
            self.requests.borrow_mut().push(request.clone());
            let rx = self.replies.borrow_mut().pop_front().expect("unexpected request");
            rx.await.expect("reply dropped")
        }
    }

    #[async_trait(?Send)]
    impl GenerationService for Rc<ScriptedService> {
        async fn generate(&self, request: &ConfigurationRequest) -> Reply {
            (&**self).generate(request).await
        }
    }

    fn ok(config: &str) -> Reply {
        Ok(GenerationResult {
            config: config.to_string(),
        })
    }

    fn decode_failure() -> Reply {
        Err(serde_json::from_str::<GenerationResult>("not json")
            .unwrap_err()
            .into())
    }

    /// Lets every other branch of a `join!` run at least once.
    async fn settle() {
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
    }

    fn form_with(checked: &[&str]) -> FormSnapshot {
        let mut form = FormSnapshot::default();
        for toggle in &mut form.optional_packages {
            toggle.checked = checked.contains(&toggle.value.as_str());
        }
        form
    }

    type Presenter = Rc<RefCell<ArtifactPresenter<RecordingView>>>;

    fn presenter() -> Presenter {
        Rc::new(RefCell::new(ArtifactPresenter::new(RecordingView::default())))
    }

    #[test]
    fn build_request_collects_only_checked_packages() {
        let request = build_request(&form_with(&["vlc", "git", "firefox"]));
        assert_eq!(
            request.optional_packages,
            BTreeSet::from(["firefox".to_string(), "git".to_string(), "vlc".to_string()])
        );
    }

    #[test]
    fn build_request_with_nothing_checked_is_empty() {
        assert!(build_request(&form_with(&[])).optional_packages.is_empty());
    }

    #[test]
    fn build_request_collapses_duplicate_toggles() {
        let mut form = form_with(&[]);
        form.optional_packages = vec![
            PackageToggle { value: "git".into(), checked: true },
            PackageToggle { value: "git".into(), checked: true },
            PackageToggle { value: "htop".into(), checked: false },
        ];

        let request = build_request(&form);
        assert_eq!(request.optional_packages, BTreeSet::from(["git".to_string()]));
    }

    #[test]
    fn build_request_ignores_toggle_order() {
        let mut reversed = form_with(&["gimp", "steam"]);
        reversed.optional_packages.reverse();

        assert_eq!(
            build_request(&form_with(&["gimp", "steam"])),
            build_request(&reversed)
        );
    }

    #[test]
    fn build_request_forwards_values_untouched() {
        let mut form = form_with(&[]);
        form.username = "  Artix ".into();
        form.hostname = String::new();
        form.timezone = "not/a-zone".into();
        form.desktop_environment = "Plasma".into();

        let request = build_request(&form);
        assert_eq!(request.username, "  Artix ");
        assert_eq!(request.hostname, "");
        assert_eq!(request.timezone, "not/a-zone");
        assert_eq!(request.desktop_environment, "Plasma");
        assert_eq!(request.keymap, "us");
    }

    #[tokio::test]
    async fn success_displays_config_verbatim() {
        let service = ScriptedService::default();
        let notifier = RecordingNotifier::default();
        let shared = presenter();
        let controller = SubmissionController::new(&service, &notifier, Rc::clone(&shared));

        service.expect().send(ok("X")).unwrap();
        let outcome = controller.submit(&form_with(&["git"])).await;

        assert!(matches!(outcome, SubmitOutcome::Displayed));
        let presenter = shared.borrow();
        assert!(presenter.is_visible());
        assert_eq!(presenter.text(), "X");
        assert_eq!(presenter.view().scrolls, 1);
        assert!(notifier.alerts.borrow().is_empty());
        assert_eq!(service.requests.borrow().len(), 1);
    }

    #[tokio::test]
    async fn failure_alerts_and_keeps_previous_artifact() {
        let service = ScriptedService::default();
        let notifier = RecordingNotifier::default();
        let shared = presenter();
        let controller = SubmissionController::new(&service, &notifier, Rc::clone(&shared));

        service.expect().send(ok("first")).unwrap();
        controller.submit(&form_with(&[])).await;

        service.expect().send(decode_failure()).unwrap();
        let outcome = controller.submit(&form_with(&[])).await;

        assert!(matches!(outcome, SubmitOutcome::Failed(GenerateError::Decode(_))));
        let alerts = notifier.alerts.borrow();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].starts_with("Error generating configuration: unreadable response"));

        let presenter = shared.borrow();
        assert!(presenter.is_visible());
        assert_eq!(presenter.text(), "first");
        assert_eq!(presenter.view().rendered, vec!["first".to_string()]);
    }

    #[tokio::test]
    async fn failure_before_any_success_stays_hidden() {
        let service = ScriptedService::default();
        let notifier = RecordingNotifier::default();
        let shared = presenter();
        let controller = SubmissionController::new(&service, &notifier, Rc::clone(&shared));

        service
            .expect()
            .send(Err(GenerateError::Status {
                status: 500,
                body: "boom".into(),
            }))
            .unwrap();
        controller.submit(&form_with(&[])).await;

        assert!(!shared.borrow().is_visible());
        assert_eq!(shared.borrow().text(), "");
        assert_eq!(
            notifier.alerts.borrow().as_slice(),
            ["Error generating configuration: service answered HTTP 500: boom"]
        );
    }

    #[tokio::test]
    async fn each_submit_sends_exactly_one_request() {
        let service = ScriptedService::default();
        let notifier = RecordingNotifier::default();
        let controller = SubmissionController::new(&service, &notifier, presenter());

        service.expect().send(ok("a")).unwrap();
        service.expect().send(ok("b")).unwrap();
        controller.submit(&form_with(&["vlc"])).await;
        controller.submit(&form_with(&["gimp"])).await;

        let requests = service.requests.borrow();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].optional_packages.contains("vlc"));
        assert!(requests[1].optional_packages.contains("gimp"));
    }

    #[tokio::test]
    async fn overlapping_submissions_last_response_wins() {
        let service = ScriptedService::default();
        let notifier = RecordingNotifier::default();
        let shared = presenter();
        let controller = SubmissionController::new(&service, &notifier, Rc::clone(&shared));

        let first = service.expect();
        let second = service.expect();
        let form = form_with(&[]);

        let (a, b, ()) = tokio::join!(controller.submit(&form), controller.submit(&form), async {
            settle().await;
            second.send(ok("second")).unwrap();
            settle().await;
            first.send(ok("first")).unwrap();
        });

        assert!(matches!(a, SubmitOutcome::Displayed));
        assert!(matches!(b, SubmitOutcome::Displayed));
        let presenter = shared.borrow();
        assert_eq!(presenter.text(), "first");
        assert_eq!(
            presenter.view().rendered,
            vec!["second".to_string(), "first".to_string()]
        );
    }

    #[tokio::test]
    async fn latest_submission_wins_drops_stale_response() {
        let service = ScriptedService::default();
        let notifier = RecordingNotifier::default();
        let shared = presenter();
        let controller = SubmissionController::new(&service, &notifier, Rc::clone(&shared))
            .with_ordering(ResponseOrdering::LatestSubmissionWins);

        let first = service.expect();
        let second = service.expect();
        let form = form_with(&[]);

        let (a, b, ()) = tokio::join!(controller.submit(&form), controller.submit(&form), async {
            settle().await;
            second.send(ok("second")).unwrap();
            settle().await;
            first.send(decode_failure()).unwrap();
        });

        assert!(matches!(a, SubmitOutcome::Superseded));
        assert!(matches!(b, SubmitOutcome::Displayed));
        assert_eq!(shared.borrow().text(), "second");
        assert!(notifier.alerts.borrow().is_empty());
    }

    #[tokio::test]
    async fn spawned_submissions_overlap_and_last_response_wins() {
        LocalSet::new()
            .run_until(async {
                let service = Rc::new(ScriptedService::default());
                let notifier = Rc::new(RecordingNotifier::default());
                let shared = presenter();
                let controller = Rc::new(SubmissionController::new(
                    Rc::clone(&service),
                    Rc::clone(&notifier),
                    Rc::clone(&shared),
                ));

                let first_reply = service.expect();
                let second_reply = service.expect();

                let first = controller.spawn_submit(form_with(&["vlc"]));
                settle().await;
                assert_eq!(controller.in_flight(), 1);

                // Submitted again while the first request is still pending.
                let second = controller.spawn_submit(form_with(&["gimp"]));
                settle().await;
                assert_eq!(controller.in_flight(), 2);
                assert_eq!(service.requests.borrow().len(), 2);

                second_reply.send(ok("second")).unwrap();
                assert!(matches!(second.await.unwrap(), SubmitOutcome::Displayed));
                assert_eq!(shared.borrow().text(), "second");
                assert_eq!(controller.in_flight(), 1);

                first_reply.send(ok("first")).unwrap();
                assert!(matches!(first.await.unwrap(), SubmitOutcome::Displayed));
                assert_eq!(shared.borrow().text(), "first");
                assert_eq!(controller.in_flight(), 0);
                assert!(notifier.alerts.borrow().is_empty());
            })
            .await;
    }

    #[tokio::test]
    async fn spawned_submissions_with_latest_wins_drop_the_older_one() {
        LocalSet::new()
            .run_until(async {
                let service = Rc::new(ScriptedService::default());
                let notifier = Rc::new(RecordingNotifier::default());
                let shared = presenter();
                let controller = Rc::new(
                    SubmissionController::new(
                        Rc::clone(&service),
                        Rc::clone(&notifier),
                        Rc::clone(&shared),
                    )
                    .with_ordering(ResponseOrdering::LatestSubmissionWins),
                );

                let first_reply = service.expect();
                let second_reply = service.expect();

                let first = controller.spawn_submit(form_with(&[]));
                settle().await;
                let second = controller.spawn_submit(form_with(&[]));
                settle().await;

                second_reply.send(ok("second")).unwrap();
                assert!(matches!(second.await.unwrap(), SubmitOutcome::Displayed));

                first_reply.send(ok("first")).unwrap();
                assert!(matches!(first.await.unwrap(), SubmitOutcome::Superseded));
                assert_eq!(shared.borrow().text(), "second");
                assert_eq!(shared.borrow().view().rendered, vec!["second".to_string()]);
            })
            .await;
    }
}
