//! Transition phases, status reporting, and the caller-facing handle.

use super::scene::SceneId;
use crate::error::TransitionError;
use crate::hierarchy::Hierarchy;
use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::Shared;
use hecs::Entity;
use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

type Outcome = Result<(), TransitionError>;

/// Step of an in-flight transition.
///
/// Loading lasts until the scene's root node shows up in the hierarchy. The
/// remaining phases run back to back within the frame that finds it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionPhase {
    /// Waiting for the additive load to produce the scene's root node.
    Loading,
    /// Moving the root node under the controller and dropping any wrapper.
    Attaching,
    /// Handing the request parameter to the scene's initializers.
    Initializing,
    /// Destroying the previous scene's root node.
    Evicting,
}

/// Observable state of a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum TransitionStatus {
    Pending(TransitionPhase),
    Completed,
    Failed(TransitionError),
}

/// Notifications delivered to listeners registered with
/// [`SceneTransitionController::on_event`](super::SceneTransitionController::on_event).
#[derive(Clone, Debug, PartialEq)]
pub enum TransitionEvent {
    /// A load was requested and the controller is now busy.
    Started { scene: SceneId },
    /// The transition moved to a new phase.
    PhaseChanged {
        scene: SceneId,
        phase: TransitionPhase,
    },
    /// The scene is attached and initialized; the previous scene is scheduled for removal.
    Completed { scene: SceneId, initialized: usize },
    /// The transition stopped without attaching the scene.
    Failed {
        scene: SceneId,
        error: TransitionError,
    },
}

#[derive(Debug)]
struct HandleState {
    scene: Option<SceneId>,
    status: TransitionStatus,
    cancel_requested: bool,
    /// Resolves every clone's `done` future; taken when the transition finishes.
    finished: Option<oneshot::Sender<Outcome>>,
}

/// Handle to a requested transition.
///
/// Clones share the same state. The handle can be polled with
/// [`status`](Self::status) from frame logic, or awaited: it resolves once
/// the transition completes or fails.
///
/// # Example
///
/// ```ignore
/// if let Some(handle) = controller.request_change(&mut hierarchy, Some("Level2"), 42) {
///     // later, from frame logic
///     if handle.is_finished() {
///         println!("{:?}", handle.status());
///     }
/// }
/// ```
#[derive(Clone)]
pub struct TransitionHandle {
    state: Rc<RefCell<HandleState>>,
    done: Shared<oneshot::Receiver<Outcome>>,
}

impl fmt::Debug for TransitionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionHandle")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl TransitionHandle {
    fn with_status(scene: Option<SceneId>, status: TransitionStatus) -> Self {
        let (sender, receiver) = oneshot::channel();
        let finished = match &status {
            TransitionStatus::Pending(_) => Some(sender),
            TransitionStatus::Completed => {
                let _ = sender.send(Ok(()));
                None
            }
            TransitionStatus::Failed(error) => {
                let _ = sender.send(Err(error.clone()));
                None
            }
        };

        Self {
            state: Rc::new(RefCell::new(HandleState {
                scene,
                status,
                cancel_requested: false,
                finished,
            })),
            done: receiver.shared(),
        }
    }

    pub(crate) fn pending(scene: SceneId) -> Self {
        Self::with_status(Some(scene), TransitionStatus::Pending(TransitionPhase::Loading))
    }

    /// A handle that is already complete (used for empty transitions).
    pub(crate) fn completed(scene: Option<SceneId>) -> Self {
        Self::with_status(scene, TransitionStatus::Completed)
    }

    pub(crate) fn failed(scene: SceneId, error: TransitionError) -> Self {
        Self::with_status(Some(scene), TransitionStatus::Failed(error))
    }

    /// The target scene, or `None` for an empty transition.
    pub fn scene(&self) -> Option<SceneId> {
        self.state.borrow().scene.clone()
    }

    pub fn status(&self) -> TransitionStatus {
        self.state.borrow().status.clone()
    }

    /// The current phase while the transition is pending.
    pub fn phase(&self) -> Option<TransitionPhase> {
        match self.state.borrow().status {
            TransitionStatus::Pending(phase) => Some(phase),
            _ => None,
        }
    }

    /// Returns true once the transition has completed or failed.
    pub fn is_finished(&self) -> bool {
        self.phase().is_none()
    }

    /// Ask the controller to abandon the transition.
    ///
    /// Only a transition that is still loading can be cancelled; the request
    /// is acted on at the controller's next update. Returns false when the
    /// request comes too late to have any effect.
    pub fn cancel(&self) -> bool {
        let mut state = self.state.borrow_mut();
        let loading = state.status == TransitionStatus::Pending(TransitionPhase::Loading);
        if loading {
            state.cancel_requested = true;
        }
        loading
    }

    pub(crate) fn cancel_requested(&self) -> bool {
        self.state.borrow().cancel_requested
    }

    pub(crate) fn set_phase(&self, phase: TransitionPhase) {
        self.state.borrow_mut().status = TransitionStatus::Pending(phase);
    }

    pub(crate) fn finish(&self, result: Outcome) {
        let finished = {
            let mut state = self.state.borrow_mut();
            state.status = match &result {
                Ok(()) => TransitionStatus::Completed,
                Err(error) => TransitionStatus::Failed(error.clone()),
            };
            state.finished.take()
        };

        if let Some(finished) = finished {
            let _ = finished.send(result);
        }
    }
}

impl Future for TransitionHandle {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.done.poll_unpin(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // The controller went away mid-transition
            Poll::Ready(Err(oneshot::Canceled)) => {
                let scene = self.scene().unwrap_or_else(|| SceneId::new(""));
                Poll::Ready(Err(TransitionError::Cancelled(scene)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Runs a scene's initializers for the request's parameter type.
pub(crate) type InitializeFn = Box<dyn FnOnce(&mut Hierarchy, Entity) -> usize>;

/// Internal state of the transition the controller is driving.
pub(crate) struct ActiveTransition {
    pub scene: SceneId,
    pub handle: TransitionHandle,
    /// Root of the outgoing scene, excluded from the wait so reloading the
    /// same scene waits for the fresh copy.
    pub outgoing: Option<Entity>,
    /// Nodes detached from the controller when the transition started.
    pub detached: Vec<Entity>,
    /// Frame time of the first update after the request.
    pub started_at: Option<f32>,
    pub frames_waited: u32,
    pub initialize: Option<InitializeFn>,
}

impl ActiveTransition {
    pub fn new(
        scene: SceneId,
        handle: TransitionHandle,
        outgoing: Option<Entity>,
        detached: Vec<Entity>,
        initialize: InitializeFn,
    ) -> Self {
        Self {
            scene,
            handle,
            outgoing,
            detached,
            started_at: None,
            frames_waited: 0,
            initialize: Some(initialize),
        }
    }

    /// Seconds waited so far, starting the clock on the first call.
    pub fn elapsed(&mut self, time: f32) -> f32 {
        time - *self.started_at.get_or_insert(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_handle_reports_phase() {
        let handle = TransitionHandle::pending(SceneId::new("Level2"));
        assert_eq!(handle.phase(), Some(TransitionPhase::Loading));
        assert!(!handle.is_finished());

        handle.set_phase(TransitionPhase::Evicting);
        assert_eq!(handle.status(), TransitionStatus::Pending(TransitionPhase::Evicting));
    }

    #[test]
    fn cancel_only_while_loading() {
        let handle = TransitionHandle::pending(SceneId::new("Level2"));
        assert!(handle.cancel());
        assert!(handle.cancel_requested());

        let late = TransitionHandle::pending(SceneId::new("Level3"));
        late.set_phase(TransitionPhase::Initializing);
        assert!(!late.cancel());
        assert!(!late.cancel_requested());
    }

    #[test]
    fn handle_resolves_when_finished() {
        let handle = TransitionHandle::pending(SceneId::new("Level2"));
        let observer = handle.clone();
        assert!(observer.clone().now_or_never().is_none());

        handle.finish(Err(TransitionError::Cancelled(SceneId::new("Level2"))));

        assert_eq!(
            observer.now_or_never(),
            Some(Err(TransitionError::Cancelled(SceneId::new("Level2"))))
        );
    }

    #[test]
    fn every_awaiting_clone_is_woken() {
        use futures::task::{self, ArcWake};
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        #[derive(Default)]
        struct WakeCount(AtomicUsize);

        impl ArcWake for WakeCount {
            fn wake_by_ref(arc_self: &Arc<Self>) {
                arc_self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let handle = TransitionHandle::pending(SceneId::new("Level2"));
        let mut first = handle.clone();
        let mut second = handle.clone();

        let first_count = Arc::new(WakeCount::default());
        let second_count = Arc::new(WakeCount::default());
        let first_waker = task::waker(Arc::clone(&first_count));
        let second_waker = task::waker(Arc::clone(&second_count));

        assert!(first.poll_unpin(&mut Context::from_waker(&first_waker)).is_pending());
        assert!(second.poll_unpin(&mut Context::from_waker(&second_waker)).is_pending());

        handle.finish(Ok(()));

        assert!(first_count.0.load(Ordering::SeqCst) > 0);
        assert!(second_count.0.load(Ordering::SeqCst) > 0);
        assert_eq!(first.now_or_never(), Some(Ok(())));
        assert_eq!(second.now_or_never(), Some(Ok(())));
    }

    #[test]
    fn failed_handle_resolves_immediately() {
        let handle = TransitionHandle::failed(
            SceneId::new("Level9"),
            TransitionError::SceneNotFound(SceneId::new("Level9")),
        );
        assert_eq!(
            handle.now_or_never(),
            Some(Err(TransitionError::SceneNotFound(SceneId::new("Level9"))))
        );
    }

    #[test]
    fn empty_handle_is_complete() {
        let handle = TransitionHandle::completed(None);
        assert_eq!(handle.scene(), None);
        assert_eq!(futures::executor::block_on(handle), Ok(()));
    }
}
