//! Progress reporting for workflow runs

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};
use warroom_application::{ProgressNotifier, WorkflowEvent};

/// Reports progress with one progress bar per phase
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn line(&self, text: String) {
        if self.multi.println(&text).is_err() {
            eprintln!("{}", text);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_event(&self, event: &WorkflowEvent) {
        match event {
            WorkflowEvent::WorkflowStarted { phases, max_iterations, .. } => {
                self.line(format!(
                    "{} {} phases, up to {} iteration(s)",
                    "->".cyan(),
                    phases.len(),
                    max_iterations
                ));
            }
            WorkflowEvent::IterationStarted { iteration, .. } => {
                self.line(format!("{} Iteration {}", "->".cyan(), iteration).bold().to_string());
            }
            WorkflowEvent::PhaseStarted { phase, agent_count } => {
                let pb = self.multi.add(ProgressBar::new(*agent_count as u64));
                pb.set_style(Self::phase_style());
                pb.set_prefix(phase.clone());
                pb.set_message("Starting...");
                *self.phase_bar.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
            }
            WorkflowEvent::AgentProcessing { agent_name, .. } => {
                if let Some(pb) = self.phase_bar.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
                    pb.set_message(format!("{}...", agent_name));
                }
            }
            WorkflowEvent::AgentResponse { agent_name, succeeded, cached, .. } => {
                if let Some(pb) = self.phase_bar.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
                    let status = match (succeeded, cached) {
                        (true, true) => format!("{} {} (cached)", "v".green(), agent_name),
                        (true, false) => format!("{} {}", "v".green(), agent_name),
                        (false, _) => format!("{} {} (fallback)", "x".red(), agent_name),
                    };
                    pb.set_message(status);
                    pb.inc(1);
                }
            }
            WorkflowEvent::PhaseCompleted { phase, confidence, degraded, .. } => {
                if let Some(pb) = self.phase_bar.lock().unwrap_or_else(PoisonError::into_inner).take() {
                    let percent = (confidence * 100.0).round();
                    let message = if *degraded {
                        format!("{} degraded ({}%)", phase, percent).yellow().to_string()
                    } else {
                        format!("{} complete ({}%)", phase, percent).green().to_string()
                    };
                    pb.finish_with_message(message);
                }
            }
            WorkflowEvent::ConsensusComputed { consensus_level, clusters } => {
                self.line(format!(
                    "{} Consensus {:.0}% across {} cluster(s)",
                    "->".cyan(),
                    consensus_level * 100.0,
                    clusters
                ));
            }
            WorkflowEvent::SynthesisReady { .. } => {}
            WorkflowEvent::WorkflowCompleted { iteration, duration_ms, .. } => {
                self.line(format!(
                    "{} Completed after {} iteration(s) in {:.1}s",
                    "v".green(),
                    iteration,
                    *duration_ms as f64 / 1000.0
                ));
            }
            WorkflowEvent::WorkflowCancelled { iteration, .. } => {
                if let Some(pb) = self.phase_bar.lock().unwrap_or_else(PoisonError::into_inner).take() {
                    pb.abandon_with_message("cancelled".red().to_string());
                }
                self.line(format!("{} Cancelled during iteration {}", "x".red(), iteration));
            }
            WorkflowEvent::WorkflowError { message, .. } => {
                if let Some(pb) = self.phase_bar.lock().unwrap_or_else(PoisonError::into_inner).take() {
                    pb.abandon();
                }
                self.line(format!("{} {}", "x".red(), message));
            }
        }
    }
}

/// Plain line-per-event progress (no progress bars), written to stderr
pub struct SimpleProgress;

impl SimpleProgress {
    /// The line printed for an event, if any.
    pub fn describe(event: &WorkflowEvent) -> Option<String> {
        match event {
            WorkflowEvent::PhaseStarted { phase, agent_count } => {
                Some(format!("-> {} ({} agents)", phase, agent_count))
            }
            WorkflowEvent::AgentResponse { agent_name, succeeded, .. } => Some(if *succeeded {
                format!("  v {}", agent_name)
            } else {
                format!("  x {} (fallback)", agent_name)
            }),
            WorkflowEvent::PhaseCompleted { phase, confidence, degraded, .. } => Some(format!(
                "   {} {:.0}%{}",
                phase,
                confidence * 100.0,
                if *degraded { " [degraded]" } else { "" }
            )),
            WorkflowEvent::IterationStarted { iteration, .. } => Some(format!("== Iteration {} ==", iteration)),
            WorkflowEvent::WorkflowCancelled { .. } => Some("Cancelled".to_string()),
            WorkflowEvent::WorkflowError { message, .. } => Some(format!("Error: {}", message)),
            _ => None,
        }
    }
}

impl ProgressNotifier for SimpleProgress {
    fn on_event(&self, event: &WorkflowEvent) {
        if let Some(line) = Self::describe(event) {
            eprintln!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_progress_lines() {
        let started = WorkflowEvent::PhaseStarted {
            phase: "security".to_string(),
            agent_count: 3,
        };
        assert_eq!(SimpleProgress::describe(&started).unwrap(), "-> security (3 agents)");

        let completed = WorkflowEvent::PhaseCompleted {
            phase: "security".to_string(),
            confidence: 0.5,
            degraded: true,
            successful: 0,
            failed: 3,
        };
        assert_eq!(SimpleProgress::describe(&completed).unwrap(), "   security 50% [degraded]");

        let consensus = WorkflowEvent::ConsensusComputed {
            consensus_level: 0.8,
            clusters: 2,
        };
        assert!(SimpleProgress::describe(&consensus).is_none());
    }

    #[test]
    fn test_reporter_handles_full_phase_sequence() {
        let reporter = ProgressReporter::new();
        reporter.on_event(&WorkflowEvent::PhaseStarted {
            phase: "ux".to_string(),
            agent_count: 1,
        });
        reporter.on_event(&WorkflowEvent::AgentResponse {
            phase: "ux".to_string(),
            agent_id: "ux-researcher".into(),
            agent_name: "Lena".to_string(),
            content: "text".to_string(),
            confidence: 0.7,
            succeeded: true,
            provider: "offline".to_string(),
            cached: false,
        });
        reporter.on_event(&WorkflowEvent::PhaseCompleted {
            phase: "ux".to_string(),
            confidence: 0.7,
            degraded: false,
            successful: 1,
            failed: 0,
        });
        assert!(reporter.phase_bar.lock().unwrap().is_none());
    }
}
