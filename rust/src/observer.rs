//! Scheduler event hooks.

use crate::clock::Millis;
use crate::models::TaskId;

/// Receives scheduler events. Every hook defaults to doing nothing.
pub trait SchedulerObserver {
    /// A task entered the scheduler.
    fn on_task_created(&mut self, _id: TaskId, _period: Millis, _length: Millis) {}

    /// All tasks as `(id, period)` in the order admission walks them.
    fn on_period_order(&mut self, _order: &[(TaskId, Millis)]) {}

    /// A task was admitted to the critical set.
    fn on_admitted(&mut self, _id: TaskId) {}

    fn on_admission_complete(&mut self, _total_utilization: f64) {}

    /// A task's period ended at `now`; `missed` if it was never dispatched.
    fn on_transition(&mut self, _now: Millis, _id: TaskId, _missed: bool) {}

    fn on_dispatch(&mut self, _now: Millis, _id: TaskId) {}
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl SchedulerObserver for NullObserver {}

#[derive(Clone, Debug, PartialEq)]
pub enum SchedulerEvent {
    TaskCreated {
        id: TaskId,
        period: Millis,
        length: Millis,
    },
    PeriodOrder(Vec<(TaskId, Millis)>),
    Admitted(TaskId),
    AdmissionComplete(f64),
    Transition {
        now: Millis,
        id: TaskId,
        missed: bool,
    },
    Dispatch {
        now: Millis,
        id: TaskId,
    },
}

/// Records every event in order.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<SchedulerEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SchedulerEvent] {
        &self.events
    }

    /// Take the recorded events, leaving the log empty.
    pub fn drain(&mut self) -> Vec<SchedulerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ids of tasks that missed a deadline, in the order the misses occurred.
    pub fn misses(&self) -> Vec<TaskId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SchedulerEvent::Transition {
                    id, missed: true, ..
                } => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Ids of dispatched tasks, in dispatch order.
    pub fn dispatches(&self) -> Vec<TaskId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SchedulerEvent::Dispatch { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }
}

impl SchedulerObserver for EventLog {
    fn on_task_created(&mut self, id: TaskId, period: Millis, length: Millis) {
        self.events
            .push(SchedulerEvent::TaskCreated { id, period, length });
    }

    fn on_period_order(&mut self, order: &[(TaskId, Millis)]) {
        self.events.push(SchedulerEvent::PeriodOrder(order.to_vec()));
    }

    fn on_admitted(&mut self, id: TaskId) {
        self.events.push(SchedulerEvent::Admitted(id));
    }

    fn on_admission_complete(&mut self, total_utilization: f64) {
        self.events
            .push(SchedulerEvent::AdmissionComplete(total_utilization));
    }

    fn on_transition(&mut self, now: Millis, id: TaskId, missed: bool) {
        self.events
            .push(SchedulerEvent::Transition { now, id, missed });
    }

    fn on_dispatch(&mut self, now: Millis, id: TaskId) {
        self.events.push(SchedulerEvent::Dispatch { now, id });
    }
}

/// Forward through a mutable reference so callers can keep ownership.
impl<O: SchedulerObserver + ?Sized> SchedulerObserver for &mut O {
    fn on_task_created(&mut self, id: TaskId, period: Millis, length: Millis) {
        (**self).on_task_created(id, period, length);
    }

    fn on_period_order(&mut self, order: &[(TaskId, Millis)]) {
        (**self).on_period_order(order);
    }

    fn on_admitted(&mut self, id: TaskId) {
        (**self).on_admitted(id);
    }

    fn on_admission_complete(&mut self, total_utilization: f64) {
        (**self).on_admission_complete(total_utilization);
    }

    fn on_transition(&mut self, now: Millis, id: TaskId, missed: bool) {
        (**self).on_transition(now, id, missed);
    }

    fn on_dispatch(&mut self, now: Millis, id: TaskId) {
        (**self).on_dispatch(now, id);
    }
}
