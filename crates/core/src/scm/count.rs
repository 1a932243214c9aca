use crate::domain::Provider;

/// Sum of resource states across every group of every provider
pub fn total_count<'a>(providers: impl IntoIterator<Item = &'a Provider>) -> usize {
    providers.into_iter().map(Provider::count).sum()
}

/// Remembers the last published total so unchanged totals are not re-announced
#[derive(Debug, Default)]
pub struct CountAggregator {
    last: usize,
}

impl CountAggregator {
    pub fn current(&self) -> usize {
        self.last
    }

    /// Record `total`; returns it only when it differs from the previous value
    pub fn update(&mut self, total: usize) -> Option<usize> {
        if total == self.last {
            None
        } else {
            self.last = total;
            Some(total)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_reports_only_deltas() {
        let mut aggregator = CountAggregator::default();
        assert_eq!(aggregator.update(0), None);
        assert_eq!(aggregator.update(3), Some(3));
        assert_eq!(aggregator.update(3), None);
        assert_eq!(aggregator.update(1), Some(1));
        assert_eq!(aggregator.current(), 1);
    }

    #[test]
    fn test_total_count_of_no_providers() {
        assert_eq!(total_count(std::iter::empty()), 0);
    }
}
