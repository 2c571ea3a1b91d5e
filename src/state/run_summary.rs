//! Aggregate counters for a single crawl run
use std::fmt;

/// How a run ended
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every discovered category was visited; the checkpoint is cleared
    #[default]
    Completed,

    /// The per-run item budget was used up; the checkpoint is kept
    Stopped { after_items: usize },

    /// The site structure could not be read; nothing was crawled
    Aborted { reason: String },
}

/// Counters accumulated while a run progresses
///
/// Returned to the caller, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Items attempted in this run
    pub total_items: usize,

    /// Items persisted to the metadata document
    pub successful_items: usize,

    /// Items not persisted, for any reason (errors and discards)
    pub failed_items: usize,

    /// The part of `failed_items` rejected for missing tags or images
    pub discarded_items: usize,

    /// Images stored for successful items
    pub total_images_downloaded: usize,

    /// `total_images_downloaded / successful_items`, two decimals
    pub average_images_per_item: f64,

    /// Records carried over from an interrupted run
    pub resumed_items: usize,

    pub outcome: RunOutcome,
}

impl RunSummary {
    /// An empty summary for a run that could not start crawling
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self {
            outcome: RunOutcome::Aborted {
                reason: reason.into(),
            },
            ..Self::default()
        }
    }

    pub fn record_success(&mut self, images: usize) {
        self.total_items += 1;
        self.successful_items += 1;
        self.total_images_downloaded += images;
    }

    pub fn record_failure(&mut self) {
        self.total_items += 1;
        self.failed_items += 1;
    }

    pub fn record_discard(&mut self) {
        self.record_failure();
        self.discarded_items += 1;
    }

    /// Computes derived fields once the traversal is over
    pub fn finalize(&mut self) {
        self.average_images_per_item = if self.successful_items > 0 {
            let raw = self.total_images_downloaded as f64 / self.successful_items as f64;
            (raw * 100.0).round() / 100.0
        } else {
            0.0
        };
    }

    pub fn is_completed(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total items:        {}", self.total_items)?;
        writeln!(f, "Successful items:   {}", self.successful_items)?;
        writeln!(
            f,
            "Failed items:       {} ({} discarded)",
            self.failed_items, self.discarded_items
        )?;
        writeln!(f, "Images downloaded:  {}", self.total_images_downloaded)?;
        writeln!(f, "Avg images / item:  {:.2}", self.average_images_per_item)?;
        if self.resumed_items > 0 {
            writeln!(f, "Resumed records:    {}", self.resumed_items)?;
        }
        match &self.outcome {
            RunOutcome::Completed => write!(f, "Outcome:            completed"),
            RunOutcome::Stopped { after_items } => write!(
                f,
                "Outcome:            stopped after {} items (resumable)",
                after_items
            ),
            RunOutcome::Aborted { reason } => write!(f, "Outcome:            aborted ({})", reason),
        }
    }
}
