//! Plain-text console report of a scheduler run.

use std::io::Write;

use crate::clock::Millis;
use crate::models::{Task, TaskId};
use crate::observer::SchedulerObserver;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    None,
    Generating,
    Sorting,
    Admission,
    Executing,
}

/// Writes the run report as events arrive.
///
/// Each phase gets a heading the first time one of its events is seen. Write
/// errors are ignored; reporting never interrupts scheduling.
pub struct TextReporter<W: Write> {
    out: W,
    section: Section,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            section: Section::None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn enter(&mut self, section: Section) {
        if self.section == section {
            return;
        }
        self.section = section;
        let heading = match section {
            Section::None => return,
            Section::Generating => "GENERATING RANDOM TASKS...",
            Section::Sorting => "SORTING TASKS BY PERIOD...",
            Section::Admission => "FINDING CRITICAL SET OF TASKS...",
            Section::Executing => "ENTERING EXECUTION LOOP...",
        };
        let _ = writeln!(self.out, "{}", heading);
    }
}

/// Write one task block. `verbose` adds the dynamic state.
pub fn write_task_summary<W: Write>(
    out: &mut W,
    task: &Task,
    verbose: bool,
) -> std::io::Result<()> {
    writeln!(out, "### Task {} ###", task.id)?;
    writeln!(out, "Period: \t{:4}", task.period)?;
    writeln!(out, "Length: \t{:4}", task.length)?;
    if verbose {
        writeln!(out, "Deadline: \t{:12}", task.deadline)?;
        writeln!(out, "Laxity:   \t{:12}", task.laxity)?;
        writeln!(out, "Is critical: \t{:>5}", task.is_critical)?;
        writeln!(out, "Is ready:    \t{:>5}", task.is_ready)?;
    }
    writeln!(out)
}

impl<W: Write> SchedulerObserver for TextReporter<W> {
    fn on_task_created(&mut self, id: TaskId, period: Millis, length: Millis) {
        self.enter(Section::Generating);
        let _ = write_task_summary(&mut self.out, &Task::new(id, period, length), false);
    }

    fn on_period_order(&mut self, order: &[(TaskId, Millis)]) {
        self.enter(Section::Sorting);
        for (id, period) in order {
            let _ = writeln!(self.out, "Task {}: {}", id, period);
        }
        let _ = writeln!(self.out);
    }

    fn on_admitted(&mut self, id: TaskId) {
        self.enter(Section::Admission);
        let _ = writeln!(self.out, "Task {} is critical", id);
    }

    fn on_admission_complete(&mut self, total_utilization: f64) {
        self.enter(Section::Admission);
        let _ = writeln!(
            self.out,
            "Total critical utilization is {:.6}\n",
            total_utilization
        );
    }

    fn on_transition(&mut self, _now: Millis, id: TaskId, missed: bool) {
        self.enter(Section::Executing);
        if missed {
            let _ = writeln!(
                self.out,
                "Task {} deadline missed. Increasing deadline by one period.",
                id
            );
        }
    }

    fn on_dispatch(&mut self, _now: Millis, id: TaskId) {
        self.enter(Section::Executing);
        let _ = writeln!(self.out, "Executing task {}...", id);
    }
}
