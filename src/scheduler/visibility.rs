use crate::scheduler::poller::SchedulerHandle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Visibility state of the host page, published by the embedding shell
/// through a watch channel. One sender fans out to any number of binders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageVisibility {
    Visible,
    Hidden,
}

/// Binds scheduler pause/resume to the page visibility signal so
/// background tabs stop polling.
pub struct VisibilityBinder;

impl VisibilityBinder {
    pub fn bind(
        scheduler: SchedulerHandle,
        visibility: watch::Receiver<PageVisibility>,
    ) -> VisibilityGuard {
        Self::bind_all(vec![scheduler], visibility)
    }

    /// Bind several schedulers behind one guard; used when active and
    /// archive feeds share one visibility lifecycle.
    pub fn bind_all(
        schedulers: Vec<SchedulerHandle>,
        mut visibility: watch::Receiver<PageVisibility>,
    ) -> VisibilityGuard {
        let task = tokio::spawn(async move {
            // apply the state current at bind time, then follow changes
            let mut current = *visibility.borrow_and_update();
            apply(&schedulers, current);

            loop {
                if visibility.changed().await.is_err() {
                    break;
                }
                let next = *visibility.borrow_and_update();
                if next != current {
                    current = next;
                    apply(&schedulers, current);
                }
            }
        });

        VisibilityGuard { task: Some(task) }
    }
}

fn apply(schedulers: &[SchedulerHandle], visibility: PageVisibility) {
    match visibility {
        PageVisibility::Hidden => {
            tracing::debug!(count = schedulers.len(), "Page hidden, pausing schedulers");
            for scheduler in schedulers {
                scheduler.pause();
            }
        }
        PageVisibility::Visible => {
            tracing::debug!(count = schedulers.len(), "Page visible, resuming schedulers");
            for scheduler in schedulers {
                scheduler.resume();
            }
        }
    }
}

/// Idempotent unbind handle. Dropping the guard unbinds as well.
pub struct VisibilityGuard {
    task: Option<JoinHandle<()>>,
}

impl VisibilityGuard {
    pub fn unbind(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for VisibilityGuard {
    fn drop(&mut self) {
        self.unbind();
    }
}
