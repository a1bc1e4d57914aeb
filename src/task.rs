//! Extraction task orchestration
//!
//! Concurrency and lifecycle control around one extraction per surface:
//! admission control enforces at most one non-terminal task, the blocking
//! recognition call runs on a dedicated worker thread, and the outcome is
//! marshaled back to the interactive thread through a completion channel.
//! The worker never touches UI-visible state.

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use thiserror::Error;
use tracing::info;

use crate::engine::Engine;
use crate::extract::{extract, ExtractError};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("an extraction is already in progress")]
    Busy,
}

/// Lifecycle of one extraction attempt. Strictly forward:
/// `Pending -> Running -> Succeeded | Failed`.
#[derive(Debug)]
pub enum TaskStatus {
    Pending,
    Running,
    Succeeded(String),
    Failed(ExtractError),
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Succeeded(_) | TaskStatus::Failed(_))
    }
}

/// One in-flight or completed extraction attempt. A task that reaches a
/// terminal status is discarded, never reused.
#[derive(Debug)]
pub struct ExtractionTask {
    source_label: String,
    status: TaskStatus,
}

impl ExtractionTask {
    fn new(source_label: String) -> Self {
        Self {
            source_label,
            status: TaskStatus::Pending,
        }
    }

    fn start(&mut self) {
        debug_assert!(matches!(self.status, TaskStatus::Pending));
        self.status = TaskStatus::Running;
    }

    fn complete(&mut self, result: Result<String, ExtractError>) {
        debug_assert!(matches!(self.status, TaskStatus::Running));
        self.status = match result {
            Ok(text) => TaskStatus::Succeeded(text),
            Err(e) => TaskStatus::Failed(e),
        };
    }

    fn into_outcome(self) -> TaskOutcome {
        let result = match self.status {
            TaskStatus::Succeeded(text) => Ok(text),
            TaskStatus::Failed(e) => Err(e),
            TaskStatus::Pending | TaskStatus::Running => {
                unreachable!("outcome taken from a non-terminal task")
            }
        };
        TaskOutcome {
            source_label: self.source_label,
            result,
        }
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    pub fn status(&self) -> &TaskStatus {
        &self.status
    }
}

/// Terminal result of a task, delivered once on the interactive thread.
#[derive(Debug)]
pub struct TaskOutcome {
    pub source_label: String,
    pub result: Result<String, ExtractError>,
}

struct InFlight {
    task: ExtractionTask,
    done_rx: Receiver<Result<String, ExtractError>>,
    handle: Option<JoinHandle<()>>,
}

/// Schedules extractions for one surface and enforces single-flight.
pub struct TaskOrchestrator {
    engine: Arc<Engine>,
    in_flight: Option<InFlight>,
}

impl TaskOrchestrator {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            in_flight: None,
        }
    }

    /// Whether a non-terminal task exists for this surface.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn current(&self) -> Option<&ExtractionTask> {
        self.in_flight.as_ref().map(|f| &f.task)
    }

    /// Admit one extraction. Rejected outright while a task is in flight;
    /// there is no queuing and no replacement.
    pub fn submit(&mut self, source_label: String, raw_image: Vec<u8>) -> Result<(), SubmitError> {
        if self.in_flight.is_some() {
            return Err(SubmitError::Busy);
        }

        let mut task = ExtractionTask::new(source_label.clone());
        task.start();

        let (done_tx, done_rx) = bounded(1);
        let engine = self.engine.clone();

        info!("extraction started for {source_label}");
        let handle = std::thread::spawn(move || {
            let result = extract(&engine, &source_label, &raw_image);
            // The receiver may be gone if the surface was torn down.
            let _ = done_tx.send(result);
        });

        self.in_flight = Some(InFlight {
            task,
            done_rx,
            handle: Some(handle),
        });
        Ok(())
    }

    /// Drain the completion channel. Must be called from the interactive
    /// thread; the outcome of a task is yielded exactly once, after which
    /// the surface is idle and accepts a new submission.
    pub fn poll(&mut self) -> Option<TaskOutcome> {
        let flight = self.in_flight.as_ref()?;

        let result = match flight.done_rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(ExtractError::Recognition {
                source_label: flight.task.source_label.clone(),
                source: "extraction worker terminated without reporting".into(),
            }),
        };

        let mut flight = self.in_flight.take()?;
        if let Some(handle) = flight.handle.take() {
            let _ = handle.join();
        }
        debug_assert!(!flight.task.status().is_terminal());
        flight.task.complete(result);
        info!("extraction finished for {}", flight.task.source_label());
        Some(flight.task.into_outcome())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{FailingBackend, GatedBackend, MockBackend};
    use std::time::{Duration, Instant};

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 0]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }

    fn wait_for_outcome(orch: &mut TaskOrchestrator) -> TaskOutcome {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = orch.poll() {
                return outcome;
            }
            assert!(
                Instant::now() < deadline,
                "timed out waiting for task completion"
            );
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn status_transitions_are_strictly_forward() {
        let mut task = ExtractionTask::new("a.png".to_string());
        assert!(matches!(task.status(), TaskStatus::Pending));
        assert!(!task.status().is_terminal());

        task.start();
        assert!(matches!(task.status(), TaskStatus::Running));
        assert!(!task.status().is_terminal());

        task.complete(Ok("text".to_string()));
        assert!(matches!(task.status(), TaskStatus::Succeeded(_)));
        assert!(task.status().is_terminal());

        let outcome = task.into_outcome();
        assert_eq!(outcome.source_label, "a.png");
        assert_eq!(outcome.result.unwrap(), "text");
    }

    #[test]
    fn second_submission_is_rejected_while_in_flight() {
        let (release, gate) = bounded(0);
        let engine = Arc::new(Engine::with_backend(Box::new(GatedBackend {
            gate,
            text: "recognized".to_string(),
        })));
        let mut orch = TaskOrchestrator::new(engine);

        orch.submit("first.png".to_string(), tiny_png()).unwrap();
        assert!(orch.is_busy());
        assert!(matches!(
            orch.current().unwrap().status(),
            TaskStatus::Running
        ));

        // Rapid second submission: rejected outright, no queuing.
        let err = orch.submit("second.png".to_string(), tiny_png());
        assert!(matches!(err, Err(SubmitError::Busy)));

        // Still running until the gate opens.
        assert!(orch.poll().is_none());
        release.send(()).unwrap();

        let outcome = wait_for_outcome(&mut orch);
        assert_eq!(outcome.source_label, "first.png");
        assert_eq!(outcome.result.unwrap(), "recognized");

        // Exactly one outcome per submission window.
        assert!(orch.poll().is_none());
        assert!(!orch.is_busy());

        // The surface is idle and retryable.
        orch.submit("third.png".to_string(), tiny_png()).unwrap();
        drop(release);
        let outcome = wait_for_outcome(&mut orch);
        assert_eq!(outcome.source_label, "third.png");
        assert!(outcome.result.is_err());
    }

    #[test]
    fn successful_extraction_reaches_the_interactive_thread() {
        let engine = Arc::new(Engine::with_backend(Box::new(MockBackend::new(
            "the quick brown fox",
        ))));
        let mut orch = TaskOrchestrator::new(engine);

        orch.submit("photo.png".to_string(), tiny_png()).unwrap();
        let outcome = wait_for_outcome(&mut orch);
        assert_eq!(outcome.result.unwrap(), "the quick brown fox");
        assert!(!orch.is_busy());
    }

    #[test]
    fn failed_extraction_is_terminal_and_typed() {
        let engine = Arc::new(Engine::with_backend(Box::new(FailingBackend {
            message: "corrupt page".to_string(),
        })));
        let mut orch = TaskOrchestrator::new(engine);

        orch.submit("bad.png".to_string(), tiny_png()).unwrap();
        let outcome = wait_for_outcome(&mut orch);
        let err = outcome.result.unwrap_err();
        assert_eq!(err.kind(), "RecognitionError");
        assert!(!orch.is_busy());
    }

    #[test]
    fn undecodable_submission_fails_with_decode_error() {
        let engine = Arc::new(Engine::with_backend(Box::new(MockBackend::new("unused"))));
        let mut orch = TaskOrchestrator::new(engine);

        orch.submit("junk.png".to_string(), b"junk".to_vec())
            .unwrap();
        let outcome = wait_for_outcome(&mut orch);
        assert_eq!(outcome.result.unwrap_err().kind(), "DecodeError");
    }
}
