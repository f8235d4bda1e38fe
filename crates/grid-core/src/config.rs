#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub initial_cash: f64,
    pub initial_state_q: f64,
    pub price_window_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_cash: 100_000.0,
            initial_state_q: 0.5,
            price_window_len: 14,
        }
    }
}
