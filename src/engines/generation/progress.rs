use super::evolution_engine::{GenerationReport, ProgressCallback};
use std::sync::mpsc::Sender;

/// Reports progress through the `log` facade
pub struct LoggingProgressCallback;

impl ProgressCallback for LoggingProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        log::info!("Generation {} starting...", generation + 1);
    }

    fn on_generation_complete(&mut self, report: &GenerationReport) {
        log::info!(
            "Generation {} best: {}",
            report.generation + 1,
            report.best_formula
        );
    }

    fn on_program_evaluated(&mut self, current: usize, total: usize) {
        if current % 100 == 0 || current == total {
            log::debug!("  Evaluated {}/{} programs", current, total);
        }
    }
}

// For driving a monitor on another thread
pub struct ChannelProgressCallback {
    sender: Sender<ProgressMessage>,
}

#[derive(Debug, Clone)]
pub enum ProgressMessage {
    GenerationStart(usize),
    GenerationComplete(GenerationReport),
    ProgramEvaluated { current: usize, total: usize },
}

impl ChannelProgressCallback {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_generation_complete(&mut self, report: &GenerationReport) {
        let _ = self
            .sender
            .send(ProgressMessage::GenerationComplete(report.clone()));
    }

    fn on_program_evaluated(&mut self, current: usize, total: usize) {
        let _ = self
            .sender
            .send(ProgressMessage::ProgramEvaluated { current, total });
    }
}
