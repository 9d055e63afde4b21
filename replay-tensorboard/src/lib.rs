use replay_core::stats::{span_points, EpisodeStats};
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Writes span-averaged reward curves to TFRecord.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
        }
    }

    /// Writes the reward curve of `stats` under `tag`, averaged over
    /// consecutive groups of `span` episodes.
    ///
    /// Each complete span produces one scalar at step = cumulative
    /// simulation steps through that span; a trailing partial span is not
    /// written. Writing several accumulators under distinct tags overlays
    /// their curves in one chart.
    pub fn write_span_rewards(&mut self, tag: &str, stats: &EpisodeStats, span: usize) {
        for point in span_points(stats, span) {
            self.writer
                .add_scalar(tag, point.mean_reward, point.cumulative_steps);
        }
    }

    /// Writes one tagged curve per accumulator with a shared span size.
    pub fn write_all(&mut self, curves: &[(&str, &EpisodeStats)], span: usize) {
        for (tag, stats) in curves {
            self.write_span_rewards(tag, stats, span);
        }
    }

    /// Flushes pending events to disk.
    pub fn flush(&mut self) {
        self.writer.flush();
    }
}
