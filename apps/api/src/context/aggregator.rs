use crate::models::content::{ContentItem, Engagement};
use crate::models::context::{PerformanceSnapshot, Sentiment};

/// Size of the history window handed to the generator.
pub const MAX_HISTORY_ITEMS: usize = 5;

/// Engagement each item is expected to reach for full effectiveness.
const ENGAGEMENT_PER_ITEM_TARGET: f64 = 100.0;

/// Volume bucket for a summed engagement total. All thresholds are strict.
pub fn sentiment_for(total: u64) -> Sentiment {
    if total > 1000 {
        Sentiment::Viral
    } else if total > 500 {
        Sentiment::High
    } else if total > 100 {
        Sentiment::Moderate
    } else {
        Sentiment::Low
    }
}

/// Per-metric engagement totals, effectiveness in [0, 1], and a sentiment bucket.
/// An empty window has effectiveness 0 and sentiment low.
pub fn aggregate(items: &[ContentItem]) -> PerformanceSnapshot {
    let mut engagement = Engagement::new();
    for item in items {
        for (metric, count) in &item.engagement {
            let total = engagement.entry(metric.clone()).or_insert(0);
            *total = total.saturating_add(*count);
        }
    }

    let total = engagement
        .values()
        .fold(0u64, |sum, count| sum.saturating_add(*count));

    let effectiveness = if items.is_empty() {
        0.0
    } else {
        (total as f64 / (items.len() as f64 * ENGAGEMENT_PER_ITEM_TARGET)).clamp(0.0, 1.0)
    };

    PerformanceSnapshot {
        engagement,
        sentiment: sentiment_for(total),
        effectiveness,
    }
}
