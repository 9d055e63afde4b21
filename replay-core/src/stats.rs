//! Episode statistics of training runs.
//!
//! [EpisodeStats] accumulates per-step rewards of the episode in progress
//! and finalizes them when a terminal step is recorded. The aggregated
//! views over the finalized history feed reporting, e.g. the span-averaged
//! reward curves written by the tensorboard recorder crate.

/// Accumulates per-episode rewards.
///
/// The history grows without bound; one entry per finalized episode. The
/// only invariant is that the in-progress rewards are cleared exactly when
/// an episode finalizes or is explicitly discarded.
#[derive(Debug, Clone, Default)]
pub struct EpisodeStats {
    episodes: Vec<Vec<f32>>,
    current: Vec<f32>,
}

impl EpisodeStats {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the reward of one step.
    ///
    /// A terminal step finalizes the episode: its rewards move into the
    /// history and the next recorded step starts a fresh episode.
    pub fn record(&mut self, reward: f32, is_terminal: bool) {
        self.current.push(reward);
        if is_terminal {
            self.episodes.push(std::mem::take(&mut self.current));
        }
    }

    /// Drops the in-progress episode without recording it.
    pub fn discard_current_episode(&mut self) {
        self.current.clear();
    }

    /// Number of finalized episodes.
    pub fn episode_count(&self) -> usize {
        self.episodes.len()
    }

    /// Total reward of the last finalized episode, 0.0 if there is none.
    pub fn last_episode_total_reward(&self) -> f32 {
        self.episodes
            .last()
            .map(|rewards| rewards.iter().sum())
            .unwrap_or(0.0)
    }

    /// Per-episode total rewards, in finalization order.
    pub fn episode_total_rewards(&self) -> Vec<f32> {
        self.episodes
            .iter()
            .map(|rewards| rewards.iter().sum())
            .collect()
    }

    /// Mean of the per-episode total rewards.
    ///
    /// NaN while no episode has finalized, like the mean of an empty set.
    pub fn mean_episode_total_reward(&self) -> f32 {
        let totals = self.episode_total_rewards();
        totals.iter().sum::<f32>() / totals.len() as f32
    }

    /// Number of steps of each finalized episode.
    pub fn steps_per_episode(&self) -> Vec<usize> {
        self.episodes.iter().map(|rewards| rewards.len()).collect()
    }
}

/// One point of a span-averaged reward curve.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanPoint {
    /// Simulation steps accumulated through the end of the span.
    pub cumulative_steps: usize,

    /// Mean of the per-episode total rewards within the span.
    pub mean_reward: f32,
}

/// Averages the episode history over consecutive groups of `span` episodes.
///
/// A trailing group with fewer than `span` episodes is dropped rather than
/// padded into a misleading partial average. The x-coordinate of each point
/// is the cumulative step count through its span, so curves of runs with
/// different episode lengths stay comparable. `span == 0` yields no points.
pub fn span_points(stats: &EpisodeStats, span: usize) -> Vec<SpanPoint> {
    if span == 0 {
        return Vec::new();
    }

    let totals = stats.episode_total_rewards();
    let steps = stats.steps_per_episode();

    let mut points = Vec::with_capacity(totals.len() / span);
    let mut cumulative_steps = 0;
    for (rewards, lens) in totals.chunks_exact(span).zip(steps.chunks_exact(span)) {
        cumulative_steps += lens.iter().sum::<usize>();
        points.push(SpanPoint {
            cumulative_steps,
            mean_reward: rewards.iter().sum::<f32>() / span as f32,
        });
    }
    points
}
