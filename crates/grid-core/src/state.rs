use std::collections::VecDeque;

use crate::config::SessionConfig;

/// Bounded FIFO of the most recent spot prices.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceWindow {
    prices: VecDeque<f64>,
    capacity: usize,
}

impl PriceWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            prices: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, price: f64) {
        if self.capacity == 0 {
            return;
        }
        while self.prices.len() >= self.capacity {
            self.prices.pop_front();
        }
        self.prices.push_back(price);
    }

    pub fn last(&self) -> Option<f64> {
        self.prices.back().copied()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.prices.is_empty() {
            return None;
        }
        let sum: f64 = self.prices.iter().sum();
        Some(sum / self.prices.len() as f64)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.prices.iter().copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub cash: f64,
    pub inventory_mwh: f64,
    pub price_window: PriceWindow,
    pub state_q: f64,
    pub starting_equity: f64,
}

impl SessionState {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            cash: config.initial_cash,
            inventory_mwh: 0.0,
            price_window: PriceWindow::new(config.price_window_len),
            state_q: config.initial_state_q.clamp(0.0, 1.0),
            starting_equity: config.initial_cash,
        }
    }

    pub fn equity(&self, spot_price: f64) -> f64 {
        self.cash + self.inventory_mwh * spot_price
    }

    pub fn pnl(&self, spot_price: f64) -> f64 {
        self.equity(spot_price) - self.starting_equity
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{PriceWindow, SessionState};
    use crate::SessionConfig;

    #[test]
    fn window_evicts_oldest_beyond_capacity() {
        let mut window = PriceWindow::new(14);
        for price in 1..=20 {
            window.push(price as f64);
        }

        assert_eq!(window.len(), 14);
        let kept: Vec<f64> = window.iter().collect();
        let expected: Vec<f64> = (7..=20).map(|price| price as f64).collect();
        assert_eq!(kept, expected);
        assert_eq!(window.last(), Some(20.0));
    }

    #[test]
    fn window_mean_is_none_when_empty() {
        let window = PriceWindow::new(3);
        assert_eq!(window.mean(), None);
        assert_eq!(window.last(), None);
    }

    #[test]
    fn window_mean_averages_held_prices() {
        let mut window = PriceWindow::new(3);
        window.push(50.0);
        window.push(52.0);
        window.push(48.0);
        window.push(44.0);

        assert_eq!(window.mean(), Some(48.0));
    }

    #[test]
    fn pnl_is_marked_to_spot() {
        let mut state = SessionState::default();
        state.cash -= 52.0;
        state.inventory_mwh = 1.0;

        assert_eq!(state.pnl(48.0), -4.0);
        assert_eq!(state.equity(52.0), 100_000.0);
    }

    #[test]
    fn initial_state_q_is_clipped_into_unit_interval() {
        let state = SessionState::new(SessionConfig {
            initial_state_q: 1.7,
            ..SessionConfig::default()
        });
        assert_eq!(state.state_q, 1.0);
    }
}
