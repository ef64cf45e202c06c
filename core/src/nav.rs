//! Opening a symbol's chart from anywhere in the app.

use crate::session::normalize_symbol;

/// Destination for "open this symbol's chart" commands.
pub trait Navigator {
    fn open_chart(&mut self, symbol: &str);
}

impl<F: FnMut(&str)> Navigator for F {
    fn open_chart(&mut self, symbol: &str) {
        self(symbol)
    }
}

/// Hands normalized symbols to an injected [`Navigator`].
pub struct ChartLauncher<N> {
    navigator: N,
}

impl<N: Navigator> ChartLauncher<N> {
    pub fn new(navigator: N) -> Self {
        Self { navigator }
    }

    /// Trims and upper-cases `symbol`; blank input is ignored. Returns the
    /// symbol that was forwarded.
    pub fn open_chart(&mut self, symbol: &str) -> Option<String> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return None;
        }
        self.navigator.open_chart(&symbol);
        Some(symbol)
    }

    pub fn into_inner(self) -> N {
        self.navigator
    }
}
